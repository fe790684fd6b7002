/*
 * Sepolgraph Analysis - SELinux Domain Transition Analysis
 *
 * Feature-First Hexagonal Architecture:
 * - features/    : Vertical slices (domain_trans)
 * - config/      : Engine settings + versioned YAML schema
 * - errors       : Crate-wide error type
 *
 * The policy object model lives in `sepolgraph-policy`; this crate only
 * reads it through the `PolicyOracle` and `AllowRuleQuery` ports.
 */

// Crate-level lint configuration
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::unnecessary_map_or)] // map_or style for compatibility

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Engine configuration
pub mod config;

/// Error types
pub mod errors;

/// Feature modules
pub mod features;

pub use config::{AnalysisConfig, ConfigError, ConfigResult};
pub use errors::{AnalysisError, Result};
pub use features::domain_trans::{
    AllowRuleQuery, Direction, DomainTransAnalysis, DomainTransEngine, DomainTransResult,
    MissingRules, PolicyOracle, RuleCategories, ValidityMode,
};
