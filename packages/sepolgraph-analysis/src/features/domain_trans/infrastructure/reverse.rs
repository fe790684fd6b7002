/*
 * Reverse analyzer
 *
 * From an end domain E:
 * 1. every entrypoint EP of E is followed to the domains allowed to execute
 *    EP; each executor START != E is a candidate. An entrypoint nobody else
 *    executes is reported without a start domain.
 * 2. sweep: process transition and type_transition rules into E that step 1
 *    did not consume are reported per concrete source domain.
 */

use sepolgraph_policy::TypeId;
use tracing::{debug, trace};

use crate::errors::{AnalysisError, Result};
use crate::features::domain_trans::domain::candidate::evidence;
use crate::features::domain_trans::domain::{
    BucketKind, RuleEntry, RuleSets, TransitionCandidate, UsedMarks,
};
use crate::features::domain_trans::ports::PolicyOracle;

use super::table::{expand_concrete, TransitionTable};

fn setexec_rules(table: &TransitionTable, domain: TypeId) -> Result<Vec<sepolgraph_policy::RuleId>> {
    match table.find_for_partner(BucketKind::Setexec, domain, domain)? {
        Some(entry) => evidence(&entry.rules),
        None => Ok(Vec::new()),
    }
}

/// Every domain that may transition into `end`
pub fn reverse_transitions<P: PolicyOracle + ?Sized>(
    oracle: &P,
    table: &TransitionTable,
    marks: &mut UsedMarks,
    end: TypeId,
) -> Result<Vec<TransitionCandidate>> {
    if table.is_attribute(end) {
        return Err(AnalysisError::attribute_not_allowed(end));
    }
    let strict = table.needs_type_or_setexec();
    let mut out: Vec<TransitionCandidate> = Vec::new();

    for ep_entry in table.bucket(BucketKind::Entrypoint, end).iter() {
        let ep = ep_entry.partner;
        marks.mark(BucketKind::Entrypoint, end, ep);

        let executors = table.bucket(BucketKind::Execute, ep);
        let mut dead = false;
        for ex in executors.iter() {
            let start = ex.partner;
            if start == end {
                // the only executor is the end domain itself
                if executors.len() == 1 {
                    dead = true;
                }
                continue;
            }
            if !marks.mark(BucketKind::Execute, ep, start) {
                continue;
            }

            let mut rules = RuleSets {
                entrypoint: evidence(&ep_entry.rules)?,
                exec: evidence(&ex.rules)?,
                setexec: setexec_rules(table, start)?,
                ..RuleSets::default()
            };
            if let Some(pt) = table.find_for_partner(BucketKind::ProcessTransition, start, end)? {
                rules.proc_trans = evidence(&pt.rules)?;
                marks.mark(BucketKind::ProcessTransition, start, end);
            }
            if let Some(tt) = table.find_for_partner(BucketKind::TypeChange, start, ep)? {
                if tt.default == Some(end) {
                    marks.mark(BucketKind::TypeChange, start, ep);
                    rules.type_trans = evidence(&tt.rules)?;
                }
            }

            out.try_reserve(1)?;
            out.push(TransitionCandidate::new(Some(start), Some(ep), end, rules, strict));
        }

        if executors.is_empty() || dead {
            let rules = RuleSets {
                entrypoint: evidence(&ep_entry.rules)?,
                ..RuleSets::default()
            };
            out.try_reserve(1)?;
            out.push(TransitionCandidate::new(None, Some(ep), end, rules, strict));
        }
    }

    let from_entrypoints = out.len();
    sweep(oracle, table, marks, end, strict, &mut out)?;

    debug!(
        end = %end,
        from_entrypoints,
        from_sweep = out.len() - from_entrypoints,
        "reverse analysis"
    );
    Ok(out)
}

fn unused_proc_trans<'t>(
    table: &'t TransitionTable,
    marks: &UsedMarks,
    owner: TypeId,
    end: TypeId,
) -> Result<Option<&'t RuleEntry>> {
    Ok(table
        .find_for_partner(BucketKind::ProcessTransition, owner, end)?
        .filter(|_| !marks.is_used(BucketKind::ProcessTransition, owner, end)))
}

fn unused_type_trans<'t>(
    table: &'t TransitionTable,
    marks: &UsedMarks,
    owner: TypeId,
    end: TypeId,
) -> Result<Option<&'t RuleEntry>> {
    Ok(table
        .find_for_default(owner, end)?
        .filter(|e| !marks.is_used(BucketKind::TypeChange, owner, e.partner)))
}

/// Transitions into `end` whose rules no entrypoint walk reached
fn sweep<P: PolicyOracle + ?Sized>(
    oracle: &P,
    table: &TransitionTable,
    marks: &mut UsedMarks,
    end: TypeId,
    strict: bool,
    out: &mut Vec<TransitionCandidate>,
) -> Result<()> {
    for index in 0..table.size() {
        let owner = TypeId::from_index(index);
        if owner == end || table.is_attribute(owner) {
            continue;
        }
        let pt = unused_proc_trans(table, marks, owner, end)?;
        let tt = unused_type_trans(table, marks, owner, end)?;

        // the raw rule may be written against an attribute
        let Some(raw) = pt.or(tt).and_then(|e| e.rules.first()) else {
            continue;
        };
        let sources = expand_concrete(oracle, oracle.rule_source(*raw)?);
        trace!(owner = %owner, sources = sources.len(), "sweep hit");

        for start in sources {
            if start == end {
                continue;
            }
            let pt = unused_proc_trans(table, marks, start, end)?;
            let tt = unused_type_trans(table, marks, start, end)?;
            if pt.is_none() && tt.is_none() {
                continue;
            }

            let mut rules = RuleSets {
                setexec: setexec_rules(table, start)?,
                ..RuleSets::default()
            };
            if let Some(pt) = pt {
                rules.proc_trans = evidence(&pt.rules)?;
            }
            let mut ep = None;
            if let Some(tt) = tt {
                rules.type_trans = evidence(&tt.rules)?;
                ep = Some(tt.partner);
                if let Some(ex) = table.find_for_partner(BucketKind::Execute, tt.partner, start)? {
                    rules.exec = evidence(&ex.rules)?;
                    marks.mark(BucketKind::Execute, tt.partner, start);
                }
                if let Some(entry) = table.find_for_partner(BucketKind::Entrypoint, end, tt.partner)? {
                    rules.entrypoint = evidence(&entry.rules)?;
                }
                marks.mark(BucketKind::TypeChange, start, tt.partner);
            }
            if pt.is_some() {
                marks.mark(BucketKind::ProcessTransition, start, end);
            }

            out.try_reserve(1)?;
            out.push(TransitionCandidate::new(Some(start), ep, end, rules, strict));
        }
    }
    Ok(())
}
