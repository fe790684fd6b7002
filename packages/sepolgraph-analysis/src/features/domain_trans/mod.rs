/*
 * Domain Transition Analysis
 *
 * Finds the SELinux domain transitions a policy permits:
 * - Forward: every domain a start domain may enter on exec
 * - Reverse: every domain that may enter a given end domain
 * - Verify: which rule categories one exact transition lacks
 *
 * Architecture:
 * - Domain: request, candidate/result, rule categories, rule buckets
 * - Application: DomainTransEngine (table lifecycle + analysis pipeline)
 * - Infrastructure: transition table, analyzers, filters, policy adapter
 * - Ports: PolicyOracle, AllowRuleQuery
 *
 * Algorithm:
 * - Index process transition, execute, entrypoint, type_transition and
 *   setexec rules per type, with attributes expanded to member types
 * - Walk the index from the start (or end) type, marking consumed entries
 * - Validity: execute + entrypoint + process transition, plus
 *   type_transition or setexec for policy version >= 15 or modular policies
 *
 * Performance Target:
 * - Table build: O(rules × expanded source × expanded target)
 * - Lookups: O(log k) per bucket with k partners
 */

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-export main types
pub use domain::{
    ClassPerm, Direction, DomainTransAnalysis, DomainTransResult, MissingRules, ResultPattern,
    RuleCategories, RuleSets, ValidityMode,
};

pub use application::DomainTransEngine;

// Re-export infrastructure (internal use - prefer application layer)
#[doc(hidden)]
pub use infrastructure::{TransitionTable, TypeMatcher};

pub use ports::{AllowRuleQuery, PolicyOracle};
