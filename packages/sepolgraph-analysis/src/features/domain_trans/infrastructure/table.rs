/*
 * Transition table
 *
 * Two parallel arrays indexed by type ordinal - 1:
 * - DomainNode: outbound process transition, entrypoint, setexec and
 *   type_transition buckets of a domain
 * - ExecNode: inbound execute and entrypoint buckets of an executable type
 *
 * Built once per policy by scanning the transition-relevant rules. Rule
 * sources and targets are expanded to concrete types first; attributes
 * never own or appear as partners in a bucket.
 */

use sepolgraph_policy::{RuleId, TypeId};
use tracing::{debug, info};

use crate::errors::{AnalysisError, Result};
use crate::features::domain_trans::domain::{BucketKind, RuleBucket, RuleCategories, RuleEntry};
use crate::features::domain_trans::ports::PolicyOracle;

static EMPTY_BUCKET: RuleBucket = RuleBucket::new();

/// Policy versions at and above this need a type_transition or setexec rule
pub const SETEXEC_POLICY_VERSION: u32 = 15;

/// Domain side of one type
#[derive(Debug, Clone, Default)]
pub struct DomainNode {
    pub proc_trans: RuleBucket,
    pub entrypoint: RuleBucket,
    pub setexec: RuleBucket,
    pub type_change: RuleBucket,
}

/// Executable side of one type
#[derive(Debug, Clone, Default)]
pub struct ExecNode {
    pub execute: RuleBucket,
    pub entrypoint: RuleBucket,
}

/// Concrete types denoted by `id`, sorted and unique
pub fn expand_concrete<P: PolicyOracle + ?Sized>(oracle: &P, id: TypeId) -> Vec<TypeId> {
    if !oracle.is_attribute(id) {
        return vec![id];
    }
    let mut types: Vec<TypeId> = oracle
        .expand_type(id)
        .into_iter()
        .filter(|t| !oracle.is_attribute(*t))
        .collect();
    types.sort_unstable();
    types.dedup();
    types
}

/// Transition index for one policy
#[derive(Debug, Clone)]
pub struct TransitionTable {
    domains: Vec<DomainNode>,
    execs: Vec<ExecNode>,
    attributes: Vec<bool>,
    policy_version: u32,
    modular: bool,
}

impl TransitionTable {
    /// Build the table from every relevant rule of the policy
    pub fn build<P: PolicyOracle + ?Sized>(oracle: &P) -> Result<Self> {
        let size = oracle.type_count();
        let policy_version = oracle.policy_version();
        let modular = oracle.is_modular();
        info!(
            size,
            policy_version, modular, "Building domain transition table"
        );

        let mut domains = Vec::new();
        domains.try_reserve_exact(size)?;
        domains.resize_with(size, DomainNode::default);
        let mut execs = Vec::new();
        execs.try_reserve_exact(size)?;
        execs.resize_with(size, ExecNode::default);
        let mut attributes = Vec::new();
        attributes.try_reserve_exact(size)?;
        attributes.extend((0..size).map(|i| oracle.is_attribute(TypeId::from_index(i))));

        let mut table = Self {
            domains,
            execs,
            attributes,
            policy_version,
            modular,
        };

        let mut indexed = 0usize;

        for rule in oracle.allow_rules("process", Some("transition")) {
            table.add_rule(oracle, rule, RuleCategories::PROC_TRANS)?;
            indexed += 1;
        }

        if table.needs_type_or_setexec() {
            for rule in oracle.allow_rules("process", Some("setexec")) {
                table.add_rule(oracle, rule, RuleCategories::SETEXEC)?;
                indexed += 1;
            }
        }

        for rule in oracle.allow_rules("file", None) {
            let mut categories = RuleCategories::empty();
            for perm in oracle.rule_perms(rule)? {
                match perm.as_str() {
                    "execute" => categories |= RuleCategories::EXEC,
                    "entrypoint" => categories |= RuleCategories::ENTRYPOINT,
                    "execute_no_trans" => categories |= RuleCategories::EXEC_NO_TRANS,
                    _ => {}
                }
            }
            if !categories.is_empty() {
                table.add_rule(oracle, rule, categories)?;
                indexed += 1;
            }
        }

        for rule in oracle.type_change_rules("process") {
            table.add_rule(oracle, rule, RuleCategories::TYPE_TRANS)?;
            indexed += 1;
        }

        info!("Indexed {} transition rules over {} types", indexed, size);
        Ok(table)
    }

    fn add_rule<P: PolicyOracle + ?Sized>(
        &mut self,
        oracle: &P,
        rule: RuleId,
        categories: RuleCategories,
    ) -> Result<()> {
        let sources = expand_concrete(oracle, oracle.rule_source(rule)?);
        let pairs: Vec<(TypeId, TypeId)> = if oracle.rule_target_is_self(rule)? {
            sources.iter().map(|&src| (src, src)).collect()
        } else {
            let targets = expand_concrete(oracle, oracle.rule_target(rule)?);
            targets
                .iter()
                .flat_map(|&tgt| sources.iter().map(move |&src| (src, tgt)))
                .collect()
        };
        debug!(
            rule = %rule,
            categories = %categories,
            sources = sources.len(),
            pairs = pairs.len(),
            "indexing rule"
        );

        if categories.contains(RuleCategories::PROC_TRANS) {
            for &(src, tgt) in &pairs {
                self.insert(BucketKind::ProcessTransition, src, tgt, None, rule, false)?;
            }
        }

        if categories.contains(RuleCategories::EXEC) {
            let no_trans = categories.contains(RuleCategories::EXEC_NO_TRANS);
            for &(src, tgt) in &pairs {
                self.insert(BucketKind::Execute, tgt, src, None, rule, no_trans)?;
            }
        }

        if categories.contains(RuleCategories::ENTRYPOINT) {
            for &(src, tgt) in &pairs {
                self.insert(BucketKind::Entrypoint, src, tgt, None, rule, false)?;
                self.insert(BucketKind::ExecEntrypoint, tgt, src, None, rule, false)?;
            }
        }

        if categories.contains(RuleCategories::TYPE_TRANS) {
            let default = oracle.rule_default(rule)?.ok_or_else(|| {
                AnalysisError::invalid_argument(format!("rule {} has no default type", rule))
            })?;
            if oracle.is_attribute(default) {
                return Err(AnalysisError::attribute_not_allowed(
                    oracle.type_name(default).unwrap_or("<unnamed>"),
                ));
            }
            for &(src, tgt) in &pairs {
                self.insert(BucketKind::TypeChange, src, tgt, Some(default), rule, false)?;
            }
        }

        if categories.contains(RuleCategories::SETEXEC) {
            for &(src, tgt) in pairs.iter().filter(|(src, tgt)| src == tgt) {
                self.insert(BucketKind::Setexec, src, tgt, None, rule, false)?;
            }
        }

        Ok(())
    }

    fn insert(
        &mut self,
        kind: BucketKind,
        owner: TypeId,
        partner: TypeId,
        default: Option<TypeId>,
        rule: RuleId,
        has_no_trans: bool,
    ) -> Result<()> {
        self.require_concrete(owner)?;
        self.require_concrete(partner)?;
        self.bucket_mut(kind, owner)?
            .insert(partner, default, rule, has_no_trans)
    }

    fn require_concrete(&self, id: TypeId) -> Result<()> {
        match self.attributes.get(id.index()) {
            Some(false) if id.value() > 0 => Ok(()),
            Some(true) => Err(AnalysisError::attribute_not_allowed(id)),
            _ => Err(AnalysisError::invalid_argument(format!(
                "type {} outside table of size {}",
                id,
                self.size()
            ))),
        }
    }

    fn bucket_mut(&mut self, kind: BucketKind, owner: TypeId) -> Result<&mut RuleBucket> {
        let index = owner.index();
        let bucket = if kind.is_domain_side() {
            self.domains.get_mut(index).map(|d| match kind {
                BucketKind::ProcessTransition => &mut d.proc_trans,
                BucketKind::Entrypoint => &mut d.entrypoint,
                BucketKind::Setexec => &mut d.setexec,
                _ => &mut d.type_change,
            })
        } else {
            self.execs.get_mut(index).map(|e| match kind {
                BucketKind::Execute => &mut e.execute,
                _ => &mut e.entrypoint,
            })
        };
        bucket.ok_or_else(|| AnalysisError::invalid_argument(format!("type {} outside table", owner)))
    }

    /// Number of slots (types plus attributes)
    pub fn size(&self) -> usize {
        self.domains.len()
    }

    pub fn policy_version(&self) -> u32 {
        self.policy_version
    }

    pub fn is_modular(&self) -> bool {
        self.modular
    }

    /// Version >= 15 and modular policies need a type_transition or setexec
    /// rule for a transition to be valid
    pub fn needs_type_or_setexec(&self) -> bool {
        self.policy_version >= SETEXEC_POLICY_VERSION || self.modular
    }

    pub fn is_attribute(&self, id: TypeId) -> bool {
        self.attributes.get(id.index()).copied().unwrap_or(false)
    }

    pub fn domain(&self, id: TypeId) -> Option<&DomainNode> {
        self.domains.get(id.index())
    }

    pub fn exec(&self, id: TypeId) -> Option<&ExecNode> {
        self.execs.get(id.index())
    }

    /// Bucket `kind` of `owner`; empty for ordinals outside the table
    pub fn bucket(&self, kind: BucketKind, owner: TypeId) -> &RuleBucket {
        if kind.is_domain_side() {
            match self.domain(owner) {
                Some(d) => match kind {
                    BucketKind::ProcessTransition => &d.proc_trans,
                    BucketKind::Entrypoint => &d.entrypoint,
                    BucketKind::Setexec => &d.setexec,
                    _ => &d.type_change,
                },
                None => &EMPTY_BUCKET,
            }
        } else {
            match self.exec(owner) {
                Some(e) => match kind {
                    BucketKind::Execute => &e.execute,
                    _ => &e.entrypoint,
                },
                None => &EMPTY_BUCKET,
            }
        }
    }

    /// Entry for `partner` in bucket `kind` of `owner`
    ///
    /// Absence is `Ok(None)`; an attribute partner is `InvalidArgument`.
    pub fn find_for_partner(
        &self,
        kind: BucketKind,
        owner: TypeId,
        partner: TypeId,
    ) -> Result<Option<&RuleEntry>> {
        if self.is_attribute(partner) {
            return Err(AnalysisError::attribute_not_allowed(partner));
        }
        Ok(self.bucket(kind, owner).find_for_partner(partner))
    }

    /// Type-change entry of `owner` whose default type is `default`
    pub fn find_for_default(&self, owner: TypeId, default: TypeId) -> Result<Option<&RuleEntry>> {
        if self.is_attribute(default) {
            return Err(AnalysisError::attribute_not_allowed(default));
        }
        Ok(self
            .bucket(BucketKind::TypeChange, owner)
            .find_for_default(default))
    }

    /// Does `domain` hold `execute_no_trans` on `executable`?
    pub fn can_execute_without_transition(&self, domain: TypeId, executable: TypeId) -> Result<bool> {
        Ok(self
            .find_for_partner(BucketKind::Execute, executable, domain)?
            .map_or(false, |e| e.has_no_trans))
    }
}
