/*
 * Transition candidates and results
 *
 * Analyzers produce `TransitionCandidate`s; the filters prune them; the
 * survivors are moved into `DomainTransResult`s handed to the caller.
 */

use sepolgraph_policy::{RuleId, TypeId};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Rule evidence attached to one transition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSets {
    /// `allow start end : process transition`
    pub proc_trans: Vec<RuleId>,
    /// `allow start ep : file execute`
    pub exec: Vec<RuleId>,
    /// `allow end ep : file entrypoint`
    pub entrypoint: Vec<RuleId>,
    /// `type_transition start ep : process end`
    pub type_trans: Vec<RuleId>,
    /// `allow start self : process setexec`
    pub setexec: Vec<RuleId>,
}

impl RuleSets {
    /// Would the kernel permit this transition?
    ///
    /// Execute, entrypoint and process-transition evidence are always
    /// required. `needs_type_or_setexec` (policy version >= 15 or modular)
    /// additionally requires a type_transition or a setexec rule.
    pub fn is_valid(&self, needs_type_or_setexec: bool) -> bool {
        !self.exec.is_empty()
            && !self.entrypoint.is_empty()
            && !self.proc_trans.is_empty()
            && (!needs_type_or_setexec || !self.type_trans.is_empty() || !self.setexec.is_empty())
    }
}

/// Copy an entry's rule list into candidate evidence
pub(crate) fn evidence(rules: &[RuleId]) -> Result<Vec<RuleId>> {
    let mut out = Vec::new();
    out.try_reserve_exact(rules.len())?;
    out.extend_from_slice(rules);
    Ok(out)
}

/// In-flight transition owned by an analyzer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCandidate {
    pub start: Option<TypeId>,
    pub entrypoint: Option<TypeId>,
    pub end: TypeId,
    pub rules: RuleSets,
    pub valid: bool,
    pub access_rules: Vec<RuleId>,
}

impl TransitionCandidate {
    /// Candidate with validity computed from its evidence
    pub fn new(
        start: Option<TypeId>,
        entrypoint: Option<TypeId>,
        end: TypeId,
        rules: RuleSets,
        needs_type_or_setexec: bool,
    ) -> Self {
        let valid = rules.is_valid(needs_type_or_setexec);
        Self {
            start,
            entrypoint,
            end,
            rules,
            valid,
            access_rules: Vec::new(),
        }
    }
}

/// One domain transition found by an analysis
///
/// Owns all of its data; later table resets or rebuilds do not affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainTransResult {
    start: Option<TypeId>,
    entrypoint: Option<TypeId>,
    end: TypeId,
    rules: RuleSets,
    valid: bool,
    access_rules: Vec<RuleId>,
}

impl DomainTransResult {
    /// Source domain. Absent only for reverse results whose entrypoint
    /// has no executing domain.
    pub fn start_type(&self) -> Option<TypeId> {
        self.start
    }

    pub fn entrypoint_type(&self) -> Option<TypeId> {
        self.entrypoint
    }

    pub fn end_type(&self) -> TypeId {
        self.end
    }

    pub fn proc_trans_rules(&self) -> &[RuleId] {
        &self.rules.proc_trans
    }

    pub fn exec_rules(&self) -> &[RuleId] {
        &self.rules.exec
    }

    pub fn entrypoint_rules(&self) -> &[RuleId] {
        &self.rules.entrypoint
    }

    pub fn type_trans_rules(&self) -> &[RuleId] {
        &self.rules.type_trans
    }

    pub fn setexec_rules(&self) -> &[RuleId] {
        &self.rules.setexec
    }

    pub fn rule_sets(&self) -> &RuleSets {
        &self.rules
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Allow rules matched by the access filter (empty when not requested)
    pub fn access_rules(&self) -> &[RuleId] {
        &self.access_rules
    }
}

impl From<TransitionCandidate> for DomainTransResult {
    fn from(c: TransitionCandidate) -> Self {
        Self {
            start: c.start,
            entrypoint: c.entrypoint,
            end: c.end,
            rules: c.rules,
            valid: c.valid,
            access_rules: c.access_rules,
        }
    }
}
