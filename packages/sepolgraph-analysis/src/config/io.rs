//! Configuration I/O (YAML loading)
//!
//! Defines the YAML schema types. Loading and validation live in
//! analysis_config.rs.

use super::analysis_config::AnalysisConfig;
use serde::{Deserialize, Serialize};

/// Current schema version
pub const CONFIG_VERSION: u32 = 1;

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1); absent is reported, not defaulted
    #[serde(default)]
    pub version: Option<u32>,

    /// Analysis settings; omitted fields keep their defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisConfig>,
}
