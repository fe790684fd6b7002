/*
 * Domain Transition Infrastructure
 *
 * - table: transition index construction and lookups
 * - forward / reverse: traversals over the table
 * - filters: validity, result type and access filters
 * - verify: single-triple verification
 * - policy_adapter: ports implemented for `sepolgraph_policy::Policy`
 */

pub mod filters;
pub mod forward;
pub mod policy_adapter;
pub mod reverse;
pub mod table;
pub mod verify;

#[cfg(test)]
pub(crate) mod test_support;

pub use filters::{filter_access, filter_result_type, filter_validity, TypeMatcher};
pub use forward::forward_transitions;
pub use reverse::reverse_transitions;
pub use table::{expand_concrete, DomainNode, ExecNode, TransitionTable, SETEXEC_POLICY_VERSION};
pub use verify::{structural_requirements, verify_triple};
