/*
 * Forward analyzer
 *
 * From a start domain S:
 * 1. every type_transition entry of S (executable EP, default END) is a
 *    candidate; the matching process transition, execute and entrypoint
 *    entries are attached and marked used
 * 2. every process transition S -> END not consumed by step 1 is followed
 *    through each entrypoint EP of END; if END has no entrypoint at all a
 *    candidate without EP is still reported
 */

use sepolgraph_policy::TypeId;
use tracing::debug;

use crate::errors::{AnalysisError, Result};
use crate::features::domain_trans::domain::candidate::evidence;
use crate::features::domain_trans::domain::{BucketKind, RuleSets, TransitionCandidate, UsedMarks};

use super::table::TransitionTable;

/// Every domain `start` may transition into
pub fn forward_transitions(
    table: &TransitionTable,
    marks: &mut UsedMarks,
    start: TypeId,
) -> Result<Vec<TransitionCandidate>> {
    if table.is_attribute(start) {
        return Err(AnalysisError::attribute_not_allowed(start));
    }
    let strict = table.needs_type_or_setexec();
    let mut out: Vec<TransitionCandidate> = Vec::new();

    let setexec = match table.find_for_partner(BucketKind::Setexec, start, start)? {
        Some(entry) => entry.rules.as_slice(),
        None => &[],
    };

    for tt in table.bucket(BucketKind::TypeChange, start).iter() {
        let ep = tt.partner;
        let Some(end) = tt.default else { continue };
        marks.mark(BucketKind::TypeChange, start, ep);
        if end == start {
            continue;
        }

        let mut rules = RuleSets {
            type_trans: evidence(&tt.rules)?,
            setexec: evidence(setexec)?,
            ..RuleSets::default()
        };
        if let Some(pt) = table.find_for_partner(BucketKind::ProcessTransition, start, end)? {
            marks.mark(BucketKind::ProcessTransition, start, end);
            rules.proc_trans = evidence(&pt.rules)?;
        }
        if let Some(ex) = table.find_for_partner(BucketKind::Execute, ep, start)? {
            marks.mark(BucketKind::Execute, ep, start);
            rules.exec = evidence(&ex.rules)?;
        }
        if let Some(entry) = table.find_for_partner(BucketKind::ExecEntrypoint, ep, end)? {
            marks.mark(BucketKind::ExecEntrypoint, ep, end);
            rules.entrypoint = evidence(&entry.rules)?;
        }

        out.try_reserve(1)?;
        out.push(TransitionCandidate::new(Some(start), Some(ep), end, rules, strict));
    }

    for pt in table.bucket(BucketKind::ProcessTransition, start).iter() {
        let end = pt.partner;
        if end == start || marks.is_used(BucketKind::ProcessTransition, start, end) {
            continue;
        }
        marks.mark(BucketKind::ProcessTransition, start, end);

        let entrypoints = table.bucket(BucketKind::Entrypoint, end);
        for ep_entry in entrypoints.iter() {
            let ep = ep_entry.partner;
            marks.mark(BucketKind::Entrypoint, end, ep);
            // the exec-side twin records whether this (EP, END) pair was reported
            if !marks.mark(BucketKind::ExecEntrypoint, ep, end) {
                continue;
            }

            let mut rules = RuleSets {
                proc_trans: evidence(&pt.rules)?,
                entrypoint: evidence(&ep_entry.rules)?,
                setexec: evidence(setexec)?,
                ..RuleSets::default()
            };
            if let Some(ex) = table.find_for_partner(BucketKind::Execute, ep, start)? {
                rules.exec = evidence(&ex.rules)?;
            }

            out.try_reserve(1)?;
            out.push(TransitionCandidate::new(Some(start), Some(ep), end, rules, strict));
        }

        if entrypoints.is_empty() {
            let rules = RuleSets {
                proc_trans: evidence(&pt.rules)?,
                ..RuleSets::default()
            };
            out.try_reserve(1)?;
            out.push(TransitionCandidate::new(Some(start), None, end, rules, strict));
        }
    }

    debug!(start = %start, candidates = out.len(), "forward analysis");
    Ok(out)
}
