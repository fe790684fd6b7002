//! Domain layer for the policy model
//!
//! # Domain Models
//!
//! - `TypeId`: dense 1-based ordinal shared by types and attributes
//! - `TypeDatum`: a declared type or attribute with its aliases and memberships
//! - `AvRule`: access-vector rule (`allow`, `auditallow`, `dontaudit`, `neverallow`)
//! - `TeRule`: type-enforcement rule (`type_transition`, `type_change`, `type_member`)
//! - `Rule` / `RuleId`: any rule, addressed by its position in the policy
//!
//! # Examples
//!
//! ```rust
//! use sepolgraph_policy::domain::TypeId;
//!
//! let id = TypeId::new(3);
//! assert_eq!(id.value(), 3);
//! assert_eq!(id.index(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Identifiers
// ═══════════════════════════════════════════════════════════════════════════

/// Ordinal of a type or attribute
///
/// Ordinals are assigned in declaration order starting at 1. Types and
/// attributes share one ordinal space, so a table sized by the symbol count
/// can be indexed with `index()` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw 1-based ordinal
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Zero-based array index (`value - 1`)
    pub const fn index(self) -> usize {
        self.0.saturating_sub(1) as usize
    }

    /// Ordinal for a zero-based array index
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Handle of a rule inside one policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleId(u32);

impl RuleId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Symbols
// ═══════════════════════════════════════════════════════════════════════════

/// Declared type or attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDatum {
    pub id: TypeId,
    pub name: String,
    pub is_attribute: bool,
    /// Alternate names (types only)
    pub aliases: Vec<String>,
    /// For attributes: member types. For types: attributes the type belongs to.
    /// Kept sorted by ordinal.
    pub related: Vec<TypeId>,
}

impl TypeDatum {
    pub fn new_type(id: TypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_attribute: false,
            aliases: Vec::new(),
            related: Vec::new(),
        }
    }

    pub fn new_attribute(id: TypeId, name: impl Into<String>) -> Self {
        Self {
            is_attribute: true,
            ..Self::new_type(id, name)
        }
    }

    /// Does `name` refer to this symbol (primary name or alias)?
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    pub(crate) fn relate(&mut self, other: TypeId) {
        if let Err(pos) = self.related.binary_search(&other) {
            self.related.insert(pos, other);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Rules
// ═══════════════════════════════════════════════════════════════════════════

/// Access-vector rule kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvRuleKind {
    Allow,
    AuditAllow,
    DontAudit,
    NeverAllow,
}

impl AvRuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvRuleKind::Allow => "allow",
            AvRuleKind::AuditAllow => "auditallow",
            AvRuleKind::DontAudit => "dontaudit",
            AvRuleKind::NeverAllow => "neverallow",
        }
    }
}

/// Type-enforcement rule kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeRuleKind {
    TypeTransition,
    TypeChange,
    TypeMember,
}

impl TeRuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeRuleKind::TypeTransition => "type_transition",
            TeRuleKind::TypeChange => "type_change",
            TeRuleKind::TypeMember => "type_member",
        }
    }
}

/// `allow source target : class { perms };`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvRule {
    pub kind: AvRuleKind,
    pub source: TypeId,
    pub target: TypeId,
    /// Target written as `self`: each source type paired with itself only.
    /// `target` then repeats `source`.
    #[serde(default)]
    pub target_is_self: bool,
    pub class: String,
    /// Sorted, deduplicated
    pub perms: Vec<String>,
}

impl AvRule {
    pub fn has_perm(&self, perm: &str) -> bool {
        self.perms.binary_search_by(|p| p.as_str().cmp(perm)).is_ok()
    }
}

/// `type_transition source target : class default;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeRule {
    pub kind: TeRuleKind,
    pub source: TypeId,
    pub target: TypeId,
    pub class: String,
    pub default: TypeId,
}

/// Any rule stored in a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum Rule {
    Av(AvRule),
    Te(TeRule),
}

impl Rule {
    pub fn source(&self) -> TypeId {
        match self {
            Rule::Av(r) => r.source,
            Rule::Te(r) => r.source,
        }
    }

    pub fn target(&self) -> TypeId {
        match self {
            Rule::Av(r) => r.target,
            Rule::Te(r) => r.target,
        }
    }

    /// Target is the `self` keyword
    pub fn target_is_self(&self) -> bool {
        match self {
            Rule::Av(r) => r.target_is_self,
            Rule::Te(_) => false,
        }
    }

    /// Default type; only type-enforcement rules carry one
    pub fn default_type(&self) -> Option<TypeId> {
        match self {
            Rule::Av(_) => None,
            Rule::Te(r) => Some(r.default),
        }
    }

    pub fn class(&self) -> &str {
        match self {
            Rule::Av(r) => &r.class,
            Rule::Te(r) => &r.class,
        }
    }

    /// Permissions; empty for type-enforcement rules
    pub fn perms(&self) -> &[String] {
        match self {
            Rule::Av(r) => &r.perms,
            Rule::Te(_) => &[],
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Rule::Av(r) => r.kind.as_str(),
            Rule::Te(r) => r.kind.as_str(),
        }
    }
}
