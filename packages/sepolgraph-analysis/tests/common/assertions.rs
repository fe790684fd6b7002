//! Custom assertions for test verification
//!
//! This module provides domain-specific assertions for transition results.

use sepolgraph_analysis::features::domain_trans::DomainTransResult;
use sepolgraph_policy::{Policy, TypeId};

/// (start, entrypoint, end) names; missing types print as "-"
pub fn triple(policy: &Policy, result: &DomainTransResult) -> (String, String, String) {
    let name = |id: Option<TypeId>| {
        id.and_then(|id| policy.name_of(id))
            .unwrap_or("-")
            .to_string()
    };
    (
        name(result.start_type()),
        name(result.entrypoint_type()),
        name(Some(result.end_type())),
    )
}

/// Sorted (start, entrypoint, end, valid) tuples
pub fn result_multiset(policy: &Policy, results: &[DomainTransResult]) -> Vec<(String, String, String, bool)> {
    let mut out: Vec<_> = results
        .iter()
        .map(|r| {
            let (s, e, d) = triple(policy, r);
            (s, e, d, r.is_valid())
        })
        .collect();
    out.sort();
    out
}

/// Does the evidence satisfy the validity predicate?
pub fn has_required_evidence(result: &DomainTransResult, needs_type_or_setexec: bool) -> bool {
    !result.proc_trans_rules().is_empty()
        && !result.exec_rules().is_empty()
        && !result.entrypoint_rules().is_empty()
        && (!needs_type_or_setexec
            || !result.type_trans_rules().is_empty()
            || !result.setexec_rules().is_empty())
}

/// Assert exactly one result with the given names
pub fn assert_single_triple(
    policy: &Policy,
    results: &[DomainTransResult],
    expected: (&str, &str, &str),
) {
    assert_eq!(
        results.len(),
        1,
        "Expected one result, got {:?}",
        results.iter().map(|r| triple(policy, r)).collect::<Vec<_>>()
    );
    let (s, e, d) = triple(policy, &results[0]);
    assert_eq!((s.as_str(), e.as_str(), d.as_str()), expected);
}

/// Assert the validity flag agrees with the evidence on every result
pub fn assert_validity_consistent(results: &[DomainTransResult], needs_type_or_setexec: bool) {
    for r in results {
        assert_eq!(
            r.is_valid(),
            has_required_evidence(r, needs_type_or_setexec),
            "Validity flag disagrees with evidence: {:?}",
            r
        );
    }
}

/// Assert no result starts and ends in the same domain
pub fn assert_no_self_transitions(results: &[DomainTransResult]) {
    for r in results {
        assert_ne!(r.start_type(), Some(r.end_type()), "Self transition: {:?}", r);
    }
}
