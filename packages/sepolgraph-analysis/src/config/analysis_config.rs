//! Engine settings

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigExportV1, CONFIG_VERSION};
use crate::features::domain_trans::ValidityMode;

const MAX_ACCESS_TYPES_LIMIT: usize = 4096;
const MIN_REGEX_SIZE_LIMIT: usize = 1024;
const MAX_REGEX_SIZE_LIMIT: usize = 256 * 1024 * 1024;

/// Settings for a `DomainTransEngine`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Validity mode seeded into requests from `create_request`
    pub default_validity: ValidityMode,

    /// Clear used-rule marks before every run
    pub auto_reset: bool,

    /// Most access types a single request may name
    pub max_access_types: usize,

    /// Compiled size bound for result-type regexes, in bytes
    pub regex_size_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_validity: ValidityMode::Valid,
            auto_reset: false,
            max_access_types: 256,
            regex_size_limit: 10 * 1024 * 1024,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_access_types == 0 || self.max_access_types > MAX_ACCESS_TYPES_LIMIT {
            return Err(ConfigError::range_with_hint(
                "max_access_types",
                self.max_access_types,
                1,
                MAX_ACCESS_TYPES_LIMIT,
                "An access filter needs at least one target type",
            ));
        }

        if self.regex_size_limit < MIN_REGEX_SIZE_LIMIT
            || self.regex_size_limit > MAX_REGEX_SIZE_LIMIT
        {
            return Err(ConfigError::range_with_hint(
                "regex_size_limit",
                self.regex_size_limit,
                MIN_REGEX_SIZE_LIMIT,
                MAX_REGEX_SIZE_LIMIT,
                "Regex size limit must be reasonable",
            ));
        }

        Ok(())
    }

    /// Builder: Set default validity mode
    pub fn default_validity(mut self, v: ValidityMode) -> Self {
        self.default_validity = v;
        self
    }

    /// Builder: Set auto reset
    pub fn auto_reset(mut self, v: bool) -> Self {
        self.auto_reset = v;
        self
    }

    /// Builder: Set max access types
    pub fn max_access_types(mut self, v: usize) -> Self {
        self.max_access_types = v;
        self
    }

    /// Builder: Set regex size limit
    pub fn regex_size_limit(mut self, v: usize) -> Self {
        self.regex_size_limit = v;
        self
    }

    /// Load from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        debug!("Loading analysis config from {}", path.as_ref().display());
        Self::from_yaml_str(&content)
    }

    /// Parse a YAML document (schema v1) and validate it
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        // Version check
        match export.version {
            None => return Err(ConfigError::MissingVersion),
            Some(CONFIG_VERSION) => {}
            Some(found) => {
                return Err(ConfigError::UnsupportedVersion {
                    found,
                    supported: vec![CONFIG_VERSION],
                })
            }
        }

        let config = export.analysis.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Export as YAML (schema v1)
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(CONFIG_VERSION),
            analysis: Some(self.clone()),
        };
        serde_yaml::to_string(&export).map_err(ConfigError::Yaml)
    }
}
