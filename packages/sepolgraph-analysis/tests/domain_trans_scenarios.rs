//! End-to-end domain transition scenarios
//!
//! Runs the engine against small policies and checks the reported
//! transitions, their evidence and their validity.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use sepolgraph_analysis::features::domain_trans::{
    DomainTransEngine, DomainTransResult, RuleCategories,
};
use sepolgraph_policy::{Policy, PolicyBuilder};

fn run(policy: &Policy, request: RequestBuilder) -> Vec<DomainTransResult> {
    let mut engine = DomainTransEngine::new(policy);
    engine.run(&request.build()).unwrap()
}

// ============================================================================
// init_t -> httpd_t
// ============================================================================

#[test]
fn test_forward_with_type_transition() {
    let policy = fixture_httpd_policy(30, true);
    let results = run(&policy, RequestBuilder::forward(INIT));

    assert_single_triple(&policy, &results, (INIT, HTTPD_EXEC, HTTPD));
    let r = &results[0];
    assert!(r.is_valid());
    assert_eq!(r.proc_trans_rules().len(), 1);
    assert_eq!(r.exec_rules().len(), 1);
    assert_eq!(r.entrypoint_rules().len(), 1);
    assert_eq!(r.type_trans_rules().len(), 1);
    assert!(r.setexec_rules().is_empty());
    assert!(r.access_rules().is_empty());
}

#[test]
fn test_init_without_execute_rule_is_invalid() {
    // httpd_t executes its own entrypoint; nothing lets init_t execute it
    let mut b = fixture_builder(30);
    b.allow(INIT, HTTPD, "process", &["transition"]).unwrap();
    b.allow(HTTPD, HTTPD_EXEC, "file", &["execute", "entrypoint"])
        .unwrap();
    b.type_transition(INIT, HTTPD_EXEC, "process", HTTPD)
        .unwrap();
    let policy = b.build();

    assert!(run(&policy, RequestBuilder::forward(INIT)).is_empty());

    let forward = run(&policy, RequestBuilder::forward(INIT).all());
    assert_single_triple(&policy, &forward, (INIT, HTTPD_EXEC, HTTPD));
    assert!(!forward[0].is_valid());
    assert!(forward[0].exec_rules().is_empty());
    assert_eq!(forward[0].type_trans_rules().len(), 1);

    // the entrypoint walk finds only httpd_t as executor; the sweep picks up init_t
    let reverse = run(&policy, RequestBuilder::reverse(HTTPD).all());
    assert_eq!(
        result_multiset(&policy, &reverse),
        vec![
            ("-".to_string(), HTTPD_EXEC.to_string(), HTTPD.to_string(), false),
            (INIT.to_string(), HTTPD_EXEC.to_string(), HTTPD.to_string(), false),
        ]
    );

    let mut engine = DomainTransEngine::new(&policy);
    let missing = engine
        .verify_transition(Some(INIT), Some(HTTPD_EXEC), Some(HTTPD))
        .unwrap();
    assert_eq!(missing, RuleCategories::EXEC);
}

#[test]
fn test_old_policy_valid_without_type_transition() {
    let policy = fixture_httpd_policy(12, false);
    let results = run(&policy, RequestBuilder::forward(INIT));

    assert_single_triple(&policy, &results, (INIT, HTTPD_EXEC, HTTPD));
    assert!(results[0].is_valid());
    assert!(results[0].type_trans_rules().is_empty());
}

#[test]
fn test_new_policy_invalid_without_type_transition_or_setexec() {
    let policy = fixture_httpd_policy(21, false);

    assert!(run(&policy, RequestBuilder::forward(INIT)).is_empty());

    let results = run(&policy, RequestBuilder::forward(INIT).all());
    assert_single_triple(&policy, &results, (INIT, HTTPD_EXEC, HTTPD));
    assert!(!results[0].is_valid());
}

#[test]
fn test_modular_policy_needs_type_transition_or_setexec() {
    let mut b = PolicyBuilder::new().with_version(12).with_modular(true);
    for name in [INIT, HTTPD, HTTPD_EXEC] {
        b.declare_type(name).unwrap();
    }
    b.allow(INIT, HTTPD, "process", &["transition"]).unwrap();
    b.allow(INIT, HTTPD_EXEC, "file", &["execute"]).unwrap();
    b.allow(HTTPD, HTTPD_EXEC, "file", &["entrypoint"]).unwrap();
    let policy = b.build();

    let results = run(&policy, RequestBuilder::forward(INIT).all());
    assert_eq!(results.len(), 1);
    assert!(!results[0].is_valid());
}

#[test]
fn test_setexec_makes_transition_valid() {
    let mut b = fixture_builder(30);
    b.allow(INIT, HTTPD, "process", &["transition"]).unwrap();
    b.allow(INIT, HTTPD_EXEC, "file", &["execute"]).unwrap();
    b.allow(HTTPD, HTTPD_EXEC, "file", &["entrypoint"]).unwrap();
    b.allow(INIT, "self", "process", &["setexec"]).unwrap();
    let policy = b.build();

    let results = run(&policy, RequestBuilder::forward(INIT));
    assert_single_triple(&policy, &results, (INIT, HTTPD_EXEC, HTTPD));
    assert_eq!(results[0].setexec_rules().len(), 1);
    assert!(results[0].type_trans_rules().is_empty());
}

#[test]
fn test_reverse_matches_forward() {
    let policy = fixture_httpd_policy(30, true);
    let mut engine = DomainTransEngine::new(&policy);

    let forward = engine.run(&RequestBuilder::forward(INIT).build()).unwrap();
    engine.reset_table();
    let reverse = engine.run(&RequestBuilder::reverse(HTTPD).build()).unwrap();

    assert_single_triple(&policy, &reverse, (INIT, HTTPD_EXEC, HTTPD));
    assert_eq!(forward, reverse);
}

#[test]
fn test_reverse_unexecuted_entrypoint_has_no_start() {
    let mut b = fixture_builder(12);
    b.allow(HTTPD, HTTPD_EXEC, "file", &["entrypoint"]).unwrap();
    let policy = b.build();

    let results = run(&policy, RequestBuilder::reverse(HTTPD).all());
    assert_eq!(results.len(), 1);
    assert_eq!(
        triple(&policy, &results[0]),
        ("-".to_string(), HTTPD_EXEC.to_string(), HTTPD.to_string())
    );
    assert!(!results[0].is_valid());
}

// ============================================================================
// Attributes
// ============================================================================

#[test]
fn test_forward_through_attribute_rules() {
    let policy = fixture_daemons_policy(30);
    let results = run(&policy, RequestBuilder::forward(INIT));

    assert_eq!(
        result_multiset(&policy, &results),
        vec![
            (INIT.to_string(), HTTPD_EXEC.to_string(), HTTPD.to_string(), true),
            (INIT.to_string(), "sshd_exec_t".to_string(), "sshd_t".to_string(), true),
        ]
    );
}

#[test]
fn test_reverse_expands_attribute_executors() {
    let policy = fixture_daemons_policy(30);
    let results = run(&policy, RequestBuilder::reverse("sshd_t"));

    assert_eq!(
        result_multiset(&policy, &results),
        vec![
            (INIT.to_string(), "sshd_exec_t".to_string(), "sshd_t".to_string(), true),
            ("initrc_t".to_string(), "sshd_exec_t".to_string(), "sshd_t".to_string(), true),
        ]
    );
}

#[test]
fn test_reverse_sweep_reports_transition_without_entrypoint() {
    let mut b = fixture_builder(12);
    b.allow(INIT, HTTPD, "process", &["transition"]).unwrap();
    let policy = b.build();

    let results = run(&policy, RequestBuilder::reverse(HTTPD).all());
    assert_eq!(
        triple(&policy, &results[0]),
        (INIT.to_string(), "-".to_string(), HTTPD.to_string())
    );
    assert_eq!(results.len(), 1);
    assert!(!results[0].is_valid());
}

#[test]
fn test_self_rule_on_attribute_grants_no_cross_member_transition() {
    let mut b = PolicyBuilder::new().with_version(12);
    b.declare_attribute("domain").unwrap();
    for name in ["a_t", "b_t", "b_exec_t"] {
        b.declare_type(name).unwrap();
    }
    b.assign("a_t", "domain").unwrap();
    b.assign("b_t", "domain").unwrap();
    b.allow("domain", "self", "process", &["transition"]).unwrap();
    b.allow("a_t", "b_exec_t", "file", &["execute"]).unwrap();
    b.allow("b_t", "b_exec_t", "file", &["entrypoint"]).unwrap();
    let policy = b.build();

    assert!(run(&policy, RequestBuilder::forward("a_t").all()).is_empty());

    let reverse = run(&policy, RequestBuilder::reverse("b_t").all());
    assert_single_triple(&policy, &reverse, ("a_t", "b_exec_t", "b_t"));
    assert!(reverse[0].proc_trans_rules().is_empty());
    assert!(!reverse[0].is_valid());
}

#[test]
fn test_setexec_through_attribute_self_rule() {
    let mut b = fixture_builder(30);
    b.declare_attribute("domain").unwrap();
    b.assign(INIT, "domain").unwrap();
    b.assign(HTTPD, "domain").unwrap();
    b.allow(INIT, HTTPD, "process", &["transition"]).unwrap();
    b.allow(INIT, HTTPD_EXEC, "file", &["execute"]).unwrap();
    b.allow(HTTPD, HTTPD_EXEC, "file", &["entrypoint"]).unwrap();
    b.allow("domain", "self", "process", &["setexec"]).unwrap();
    let policy = b.build();

    let results = run(&policy, RequestBuilder::forward(INIT));
    assert_single_triple(&policy, &results, (INIT, HTTPD_EXEC, HTTPD));
    assert_eq!(results[0].setexec_rules().len(), 1);
}

// ============================================================================
// Invariants on fixtures
// ============================================================================

#[test]
fn test_no_self_transitions() {
    let mut b = fixture_builder(30);
    b.allow(INIT, INIT, "process", &["transition"]).unwrap();
    b.allow(INIT, HTTPD_EXEC, "file", &["execute", "entrypoint"])
        .unwrap();
    b.type_transition(INIT, HTTPD_EXEC, "process", INIT).unwrap();
    let policy = b.build();

    let forward = run(&policy, RequestBuilder::forward(INIT).all());
    assert_no_self_transitions(&forward);
    let reverse = run(&policy, RequestBuilder::reverse(INIT).all());
    assert_no_self_transitions(&reverse);
}

#[test]
fn test_validity_flags_follow_evidence() {
    for (version, tt) in [(12, false), (21, false), (30, true)] {
        let policy = fixture_httpd_policy(version, tt);
        let strict = version >= 15;
        assert_validity_consistent(&run(&policy, RequestBuilder::forward(INIT).all()), strict);
        assert_validity_consistent(&run(&policy, RequestBuilder::reverse(HTTPD).all()), strict);
    }
}

// ============================================================================
// Results
// ============================================================================

#[test]
fn test_results_survive_table_rebuild() {
    let policy = fixture_httpd_policy(30, true);
    let mut engine = DomainTransEngine::new(&policy);
    let results = engine.run(&RequestBuilder::forward(INIT).build()).unwrap();
    let copy = results.clone();

    engine.rebuild_table().unwrap();
    engine.invalidate_table();

    assert_eq!(results, copy);
    assert_single_triple(&policy, &results, (INIT, HTTPD_EXEC, HTTPD));
}

#[test]
fn test_results_json_roundtrip() {
    let policy = fixture_httpd_policy(30, true);
    let results = run(&policy, RequestBuilder::forward(INIT));

    let json = serde_json::to_string(&results).unwrap();
    let back: Vec<DomainTransResult> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, results);
}
