/*
 * Domain Transition Domain Models
 */

pub mod candidate;
pub mod categories;
pub mod request;
pub mod rule_bucket;

pub use candidate::{DomainTransResult, RuleSets, TransitionCandidate};
pub use categories::{MissingRules, RuleCategories};
pub use request::{ClassPerm, Direction, DomainTransAnalysis, ResultPattern, ValidityMode};
pub use rule_bucket::{BucketKind, RuleBucket, RuleEntry, UsedMarks};
