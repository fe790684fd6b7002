/*
 * Transition verification
 *
 * Reports which rule categories a single (start, entrypoint, end) triple
 * lacks. With part of the triple unknown it reports the categories that
 * would have to be supplied for the unknown parts instead.
 */

use sepolgraph_policy::TypeId;

use crate::errors::{AnalysisError, Result};
use crate::features::domain_trans::domain::{BucketKind, MissingRules, RuleCategories};

use super::table::TransitionTable;

/// Categories a transition needs when some of its types are unknown
pub fn structural_requirements(
    start_known: bool,
    ep_known: bool,
    end_known: bool,
    needs_type_or_setexec: bool,
) -> MissingRules {
    let mut missing = RuleCategories::TYPE_TRANS;
    if !start_known {
        missing |= RuleCategories::PROC_TRANS | RuleCategories::EXEC;
        if needs_type_or_setexec {
            missing |= RuleCategories::SETEXEC;
        }
    }
    if !ep_known {
        missing |= RuleCategories::EXEC | RuleCategories::ENTRYPOINT;
    }
    if !end_known {
        missing |= RuleCategories::PROC_TRANS | RuleCategories::ENTRYPOINT;
    }
    missing
}

/// Categories missing from the exact triple
pub fn verify_triple(
    table: &TransitionTable,
    start: TypeId,
    ep: TypeId,
    end: TypeId,
) -> Result<MissingRules> {
    for id in [start, ep, end] {
        if table.is_attribute(id) {
            return Err(AnalysisError::attribute_not_allowed(id));
        }
    }

    let mut missing = MissingRules::empty();
    if table
        .find_for_partner(BucketKind::ProcessTransition, start, end)?
        .is_none()
    {
        missing |= RuleCategories::PROC_TRANS;
    }
    if table.find_for_partner(BucketKind::Execute, ep, start)?.is_none() {
        missing |= RuleCategories::EXEC;
    }
    if table.find_for_partner(BucketKind::Entrypoint, end, ep)?.is_none() {
        missing |= RuleCategories::ENTRYPOINT;
    }

    if table.needs_type_or_setexec() {
        let tt = table.find_for_partner(BucketKind::TypeChange, start, ep)?;
        let tt_matches = tt.map_or(false, |e| e.default == Some(end));
        if !tt_matches {
            let has_setexec = table
                .find_for_partner(BucketKind::Setexec, start, start)?
                .is_some();
            if !has_setexec {
                missing |= RuleCategories::SETEXEC;
                // a type_transition with another default is present, not missing
                if tt.is_none() {
                    missing |= RuleCategories::TYPE_TRANS;
                }
            }
        }
    }

    Ok(missing)
}
