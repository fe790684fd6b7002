//! Access-vector rule query
//!
//! Criteria are ANDed together; list criteria (classes, permissions) match
//! when any entry matches. Type criteria are names resolved against the
//! policy. With indirect matching a type criterion also accepts rules written
//! against the attributes of a type (or the members of an attribute).

use tracing::debug;

use crate::domain::{AvRuleKind, Rule, RuleId, TypeId};
use crate::error::{PolicyError, Result};
use crate::policy::Policy;

#[derive(Debug, Clone)]
struct TypeCriterion {
    name: String,
    indirect: bool,
}

impl TypeCriterion {
    fn resolve(&self, policy: &Policy) -> Result<ResolvedCriterion> {
        let id = policy.lookup(&self.name)?;
        let mut fields = vec![id];
        if self.indirect {
            match policy.datum(id) {
                Some(d) => fields.extend_from_slice(&d.related),
                None => return Err(PolicyError::unknown_symbol(&self.name)),
            }
        }
        fields.sort_unstable();
        fields.dedup();
        Ok(ResolvedCriterion {
            fields,
            concrete: policy.expand(id),
        })
    }
}

#[derive(Debug)]
struct ResolvedCriterion {
    /// Ordinals a rule field may carry to satisfy the criterion (sorted)
    fields: Vec<TypeId>,
    /// Concrete types the criterion names (sorted)
    concrete: Vec<TypeId>,
}

impl ResolvedCriterion {
    fn accepts(&self, field: TypeId) -> bool {
        self.fields.binary_search(&field).is_ok()
    }

    fn covers(&self, ty: TypeId) -> bool {
        self.concrete.binary_search(&ty).is_ok()
    }
}

/// Query over the access-vector rules of a policy
///
/// # Example
/// ```rust
/// use sepolgraph_policy::{AvRuleQuery, PolicyBuilder};
///
/// let mut b = PolicyBuilder::new();
/// b.declare_type("httpd_t").unwrap();
/// b.declare_type("httpd_log_t").unwrap();
/// b.allow("httpd_t", "httpd_log_t", "file", &["append", "open"]).unwrap();
/// let policy = b.build();
///
/// let hits = AvRuleQuery::new()
///     .source("httpd_t", false)
///     .class("file")
///     .perm("append")
///     .execute(&policy)
///     .unwrap();
/// assert_eq!(hits.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct AvRuleQuery {
    kinds: Vec<AvRuleKind>,
    source: Option<TypeCriterion>,
    target: Option<TypeCriterion>,
    classes: Vec<String>,
    perms: Vec<String>,
}

impl Default for AvRuleQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl AvRuleQuery {
    /// Query matching every `allow` rule
    pub fn new() -> Self {
        Self {
            kinds: vec![AvRuleKind::Allow],
            source: None,
            target: None,
            classes: Vec::new(),
            perms: Vec::new(),
        }
    }

    /// Replace the rule kinds searched
    pub fn kinds(mut self, kinds: &[AvRuleKind]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    pub fn source(mut self, name: impl Into<String>, indirect: bool) -> Self {
        self.source = Some(TypeCriterion {
            name: name.into(),
            indirect,
        });
        self
    }

    pub fn target(mut self, name: impl Into<String>, indirect: bool) -> Self {
        self.target = Some(TypeCriterion {
            name: name.into(),
            indirect,
        });
        self
    }

    /// Add an object class to match
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add a permission to match
    pub fn perm(mut self, perm: impl Into<String>) -> Self {
        self.perms.push(perm.into());
        self
    }

    /// Rules matching every criterion, in policy order
    pub fn execute(&self, policy: &Policy) -> Result<Vec<RuleId>> {
        if self.kinds.is_empty() {
            return Err(PolicyError::invalid_query("no rule kinds selected"));
        }
        let sources = self.source.as_ref().map(|c| c.resolve(policy)).transpose()?;
        let targets = self.target.as_ref().map(|c| c.resolve(policy)).transpose()?;

        let hits: Vec<RuleId> = policy
            .rules()
            .filter_map(|(id, rule)| match rule {
                Rule::Av(av) => Some((id, av)),
                Rule::Te(_) => None,
            })
            .filter(|(_, av)| self.kinds.contains(&av.kind))
            .filter(|(_, av)| sources.as_ref().map_or(true, |c| c.accepts(av.source)))
            .filter(|(_, av)| match &targets {
                None => true,
                Some(c) if !av.target_is_self => c.accepts(av.target),
                // `self` pairs each source member with itself only
                Some(c) => policy.expand(av.source).into_iter().any(|member| {
                    c.accepts(member) && sources.as_ref().map_or(true, |s| s.covers(member))
                }),
            })
            .filter(|(_, av)| self.classes.is_empty() || self.classes.contains(&av.class))
            .filter(|(_, av)| self.perms.is_empty() || self.perms.iter().any(|p| av.has_perm(p)))
            .map(|(id, _)| id)
            .collect();

        debug!(matches = hits.len(), "av rule query executed");
        Ok(hits)
    }
}
