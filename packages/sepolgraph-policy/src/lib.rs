//! sepolgraph-policy - In-memory type-enforcement policy model
//!
//! ## Core Concepts
//!
//! 1. **Symbols**: types and attributes share one 1-based ordinal space
//! 2. **Rules**: access-vector (`allow` ...) and type-enforcement
//!    (`type_transition` ...) rules, addressed by `RuleId`
//! 3. **Queries**: `AvRuleQuery` searches access-vector rules, optionally
//!    matching through attribute membership
//!
//! ## Usage
//!
//! ```rust
//! use sepolgraph_policy::{AvRuleQuery, PolicyBuilder};
//!
//! let mut builder = PolicyBuilder::new().with_version(30);
//! builder.declare_attribute("domain").unwrap();
//! builder.declare_type("httpd_t").unwrap();
//! builder.assign("httpd_t", "domain").unwrap();
//! builder.allow("domain", "self", "process", &["setexec"]).unwrap();
//! let policy = builder.build();
//!
//! let hits = AvRuleQuery::new()
//!     .source("httpd_t", true)
//!     .perm("setexec")
//!     .execute(&policy)
//!     .unwrap();
//! assert_eq!(hits.len(), 1);
//! ```

pub mod domain;
pub mod error;
pub mod policy;
pub mod query;

pub use error::{ErrorKind, PolicyError, Result};

pub use domain::{AvRule, AvRuleKind, Rule, RuleId, TeRule, TeRuleKind, TypeDatum, TypeId};
pub use policy::{Policy, PolicyBuilder, DEFAULT_POLICY_VERSION};
pub use query::AvRuleQuery;
