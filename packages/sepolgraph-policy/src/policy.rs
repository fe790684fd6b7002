//! In-memory policy and its builder
//!
//! A `Policy` is the already-loaded form the analyses work on: a flat symbol
//! table (types and attributes sharing one ordinal space) plus a flat rule
//! list. Loading binary or source policies is handled elsewhere; this crate
//! only offers a programmatic builder and a JSON snapshot form.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{AvRule, AvRuleKind, Rule, RuleId, TeRule, TeRuleKind, TypeDatum, TypeId};
use crate::error::{PolicyError, Result};

/// Policy version assumed when the builder is not told otherwise
pub const DEFAULT_POLICY_VERSION: u32 = 33;

/// Keyword standing for "the source type" in a rule target
pub const SELF_KEYWORD: &str = "self";

/// Loaded type-enforcement policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    version: u32,
    modular: bool,
    symbols: Vec<TypeDatum>,
    rules: Vec<Rule>,
    /// name/alias -> ordinal; rebuilt after deserialization
    #[serde(skip)]
    names: FxHashMap<String, TypeId>,
}

impl Policy {
    fn empty(version: u32, modular: bool) -> Self {
        Self {
            version,
            modular,
            symbols: Vec::new(),
            rules: Vec::new(),
            names: FxHashMap::default(),
        }
    }

    /// Restore a policy from a JSON snapshot produced by `to_json`
    pub fn from_json(json: &str) -> Result<Self> {
        let mut policy: Policy = serde_json::from_str(json)?;
        policy.reindex();
        Ok(policy)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn reindex(&mut self) {
        self.names.clear();
        for datum in &self.symbols {
            self.names.insert(datum.name.clone(), datum.id);
            for alias in &datum.aliases {
                self.names.insert(alias.clone(), datum.id);
            }
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Built from policy modules rather than a monolithic kernel policy
    pub fn is_modular(&self) -> bool {
        self.modular
    }

    /// Number of types plus attributes
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &TypeDatum> {
        self.symbols.iter()
    }

    pub fn datum(&self, id: TypeId) -> Option<&TypeDatum> {
        if id.value() == 0 {
            return None;
        }
        self.symbols.get(id.index())
    }

    pub fn name_of(&self, id: TypeId) -> Option<&str> {
        self.datum(id).map(|d| d.name.as_str())
    }

    /// Resolve a type, attribute or alias name
    pub fn lookup(&self, name: &str) -> Result<TypeId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| PolicyError::unknown_symbol(name))
    }

    pub fn is_attribute(&self, id: TypeId) -> bool {
        self.datum(id).is_some_and(|d| d.is_attribute)
    }

    /// Concrete types denoted by `id`: the members of an attribute, or the
    /// type itself. Unknown ordinals expand to nothing.
    pub fn expand(&self, id: TypeId) -> Vec<TypeId> {
        match self.datum(id) {
            Some(d) if d.is_attribute => d.related.clone(),
            Some(d) => vec![d.id],
            None => Vec::new(),
        }
    }

    /// Attributes a concrete type belongs to
    pub fn attributes_of(&self, id: TypeId) -> &[TypeId] {
        match self.datum(id) {
            Some(d) if !d.is_attribute => d.related.as_slice(),
            _ => &[],
        }
    }

    pub fn rule(&self, id: RuleId) -> Result<&Rule> {
        self.rules
            .get(id.index())
            .ok_or_else(|| PolicyError::unknown_rule(id.value()))
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, r)| (RuleId::new(i as u32), r))
    }

    /// Access-vector rules of one kind, optionally restricted to a class and
    /// to rules granting a given permission
    pub fn av_rules<'a>(
        &'a self,
        kind: AvRuleKind,
        class: Option<&'a str>,
        perm: Option<&'a str>,
    ) -> impl Iterator<Item = (RuleId, &'a AvRule)> + 'a {
        self.rules().filter_map(move |(id, rule)| match rule {
            Rule::Av(av)
                if av.kind == kind
                    && class.map_or(true, |c| av.class == c)
                    && perm.map_or(true, |p| av.has_perm(p)) =>
            {
                Some((id, av))
            }
            _ => None,
        })
    }

    /// Type-enforcement rules of one kind, optionally restricted to a class
    pub fn te_rules<'a>(
        &'a self,
        kind: TeRuleKind,
        class: Option<&'a str>,
    ) -> impl Iterator<Item = (RuleId, &'a TeRule)> + 'a {
        self.rules().filter_map(move |(id, rule)| match rule {
            Rule::Te(te) if te.kind == kind && class.map_or(true, |c| te.class == c) => {
                Some((id, te))
            }
            _ => None,
        })
    }
}

/// Programmatic policy construction
///
/// # Example
/// ```rust
/// use sepolgraph_policy::PolicyBuilder;
///
/// let mut builder = PolicyBuilder::new().with_version(30);
/// builder.declare_type("init_t").unwrap();
/// builder.declare_type("httpd_t").unwrap();
/// builder.allow("init_t", "httpd_t", "process", &["transition"]).unwrap();
/// let policy = builder.build();
///
/// assert_eq!(policy.symbol_count(), 2);
/// assert_eq!(policy.rule_count(), 1);
/// ```
#[derive(Debug)]
pub struct PolicyBuilder {
    policy: Policy,
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self {
            policy: Policy::empty(DEFAULT_POLICY_VERSION, false),
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.policy.version = version;
        self
    }

    pub fn with_modular(mut self, modular: bool) -> Self {
        self.policy.modular = modular;
        self
    }

    pub fn declare_type(&mut self, name: &str) -> Result<TypeId> {
        self.declare(name, false)
    }

    pub fn declare_attribute(&mut self, name: &str) -> Result<TypeId> {
        self.declare(name, true)
    }

    fn declare(&mut self, name: &str, is_attribute: bool) -> Result<TypeId> {
        if name == SELF_KEYWORD || self.policy.names.contains_key(name) {
            return Err(PolicyError::duplicate_symbol(name));
        }
        let id = TypeId::from_index(self.policy.symbols.len());
        let datum = if is_attribute {
            TypeDatum::new_attribute(id, name)
        } else {
            TypeDatum::new_type(id, name)
        };
        self.policy.symbols.push(datum);
        self.policy.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// `typealias type alias alias;`
    pub fn alias(&mut self, type_name: &str, alias: &str) -> Result<()> {
        let id = self.policy.lookup(type_name)?;
        if self.policy.is_attribute(id) {
            return Err(PolicyError::invalid_rule(format!(
                "cannot alias attribute {}",
                type_name
            )));
        }
        if alias == SELF_KEYWORD || self.policy.names.contains_key(alias) {
            return Err(PolicyError::duplicate_symbol(alias));
        }
        self.policy.symbols[id.index()].aliases.push(alias.to_string());
        self.policy.names.insert(alias.to_string(), id);
        Ok(())
    }

    /// `typeattribute type attr;`
    pub fn assign(&mut self, type_name: &str, attr_name: &str) -> Result<()> {
        let ty = self.policy.lookup(type_name)?;
        let attr = self.policy.lookup(attr_name)?;
        if self.policy.is_attribute(ty) || !self.policy.is_attribute(attr) {
            return Err(PolicyError::invalid_rule(format!(
                "typeattribute needs a type and an attribute, got {} and {}",
                type_name, attr_name
            )));
        }
        self.policy.symbols[ty.index()].relate(attr);
        self.policy.symbols[attr.index()].relate(ty);
        Ok(())
    }

    /// `allow source target : class { perms };`
    pub fn allow(
        &mut self,
        source: &str,
        target: &str,
        class: &str,
        perms: &[&str],
    ) -> Result<RuleId> {
        self.av_rule(AvRuleKind::Allow, source, target, class, perms)
    }

    pub fn av_rule(
        &mut self,
        kind: AvRuleKind,
        source: &str,
        target: &str,
        class: &str,
        perms: &[&str],
    ) -> Result<RuleId> {
        if perms.is_empty() {
            return Err(PolicyError::invalid_rule(format!(
                "{} {} {} : {} has no permissions",
                kind.as_str(),
                source,
                target,
                class
            )));
        }
        let source_id = self.policy.lookup(source)?;
        let target_is_self = target == SELF_KEYWORD;
        let target_id = if target_is_self {
            source_id
        } else {
            self.policy.lookup(target)?
        };
        let mut perms: Vec<String> = perms.iter().map(|p| p.to_string()).collect();
        perms.sort();
        perms.dedup();

        Ok(self.push(Rule::Av(AvRule {
            kind,
            source: source_id,
            target: target_id,
            target_is_self,
            class: class.to_string(),
            perms,
        })))
    }

    /// `type_transition source target : class default;`
    pub fn type_transition(
        &mut self,
        source: &str,
        target: &str,
        class: &str,
        default: &str,
    ) -> Result<RuleId> {
        self.te_rule(TeRuleKind::TypeTransition, source, target, class, default)
    }

    pub fn te_rule(
        &mut self,
        kind: TeRuleKind,
        source: &str,
        target: &str,
        class: &str,
        default: &str,
    ) -> Result<RuleId> {
        let source_id = self.policy.lookup(source)?;
        let target_id = self.policy.lookup(target)?;
        let default_id = self.policy.lookup(default)?;
        if self.policy.is_attribute(default_id) {
            return Err(PolicyError::invalid_rule(format!(
                "{} default {} is an attribute",
                kind.as_str(),
                default
            )));
        }

        Ok(self.push(Rule::Te(TeRule {
            kind,
            source: source_id,
            target: target_id,
            class: class.to_string(),
            default: default_id,
        })))
    }

    fn push(&mut self, rule: Rule) -> RuleId {
        let id = RuleId::new(self.policy.rules.len() as u32);
        self.policy.rules.push(rule);
        id
    }

    pub fn build(self) -> Policy {
        debug!(
            symbols = self.policy.symbols.len(),
            rules = self.policy.rules.len(),
            version = self.policy.version,
            modular = self.policy.modular,
            "policy built"
        );
        self.policy
    }
}
