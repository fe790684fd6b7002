//! Analysis configuration
//!
//! Engine settings with defaults, range validation and a versioned YAML
//! schema.
//!
//! # Examples
//!
//! ```rust
//! use sepolgraph_analysis::config::AnalysisConfig;
//! use sepolgraph_analysis::features::domain_trans::ValidityMode;
//!
//! let config = AnalysisConfig::default()
//!     .default_validity(ValidityMode::Both)
//!     .auto_reset(true);
//! assert!(config.validate().is_ok());
//!
//! let yaml = config.to_yaml().unwrap();
//! assert!(yaml.contains("version: 1"));
//! ```

pub mod analysis_config;
pub mod error;
pub mod io;

// Re-exports
pub use analysis_config::AnalysisConfig;
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, CONFIG_VERSION};
