/*
 * Domain Transition Ports
 *
 * Interfaces to the policy object model and the allow-rule query facility.
 * `infrastructure::policy_adapter` implements both for
 * `sepolgraph_policy::Policy`.
 */

use sepolgraph_policy::{RuleId, TypeId};

use crate::errors::Result;

/// Read-only view of a loaded policy
pub trait PolicyOracle {
    fn policy_version(&self) -> u32;

    /// Policy built from modules
    fn is_modular(&self) -> bool;

    /// Number of types plus attributes; ordinals run `1..=type_count()`
    fn type_count(&self) -> usize;

    /// Resolve a type, attribute or alias name (`NotFound` otherwise)
    fn resolve_type(&self, name: &str) -> Result<TypeId>;

    fn is_attribute(&self, id: TypeId) -> bool;

    /// Member types of an attribute; a concrete type expands to itself
    fn expand_type(&self, id: TypeId) -> Vec<TypeId>;

    fn type_name(&self, id: TypeId) -> Option<&str>;

    fn type_aliases(&self, id: TypeId) -> &[String];

    /// `allow` rules on `class`, restricted to those granting `perm` if given
    fn allow_rules(&self, class: &str, perm: Option<&str>) -> Vec<RuleId>;

    /// `type_transition` rules on `class`
    fn type_change_rules(&self, class: &str) -> Vec<RuleId>;

    fn rule_source(&self, rule: RuleId) -> Result<TypeId>;

    fn rule_target(&self, rule: RuleId) -> Result<TypeId>;

    /// Target written as `self`: each source type pairs with itself only
    fn rule_target_is_self(&self, rule: RuleId) -> Result<bool>;

    /// Default type; `None` for access-vector rules
    fn rule_default(&self, rule: RuleId) -> Result<Option<TypeId>>;

    fn rule_perms(&self, rule: RuleId) -> Result<&[String]>;
}

/// Allow-rule query facility used by the access filter
pub trait AllowRuleQuery {
    /// `allow` rules whose source matches `source` and target matches
    /// `target` (directly or through attributes), on `class`, granting any
    /// of `perms` (any permission when empty)
    fn query_allow(
        &self,
        source: TypeId,
        target: TypeId,
        class: &str,
        perms: &[String],
    ) -> Result<Vec<RuleId>>;
}
