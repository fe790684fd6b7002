//! Error types for sepolgraph-analysis
//!
//! Provides unified error handling across the crate.

use std::collections::TryReserveError;

use sepolgraph_policy::{ErrorKind as PolicyErrorKind, PolicyError};
use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for domain transition analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing or contradictory request fields, or an attribute where a
    /// concrete type is required
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Type or attribute name does not resolve
    #[error("Not found: {0}")]
    NotFound(String),

    /// Allocation failure while building the table, candidates or results
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    /// Allow-rule query facility or pattern matcher failed
    #[error("Upstream query failed: {0}")]
    UpstreamQuery(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AnalysisError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AnalysisError::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AnalysisError::NotFound(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        AnalysisError::UpstreamQuery(msg.into())
    }

    /// The "attribute where a type is required" error
    pub fn attribute_not_allowed(name: impl std::fmt::Display) -> Self {
        AnalysisError::InvalidArgument(format!("Attributes are not valid here: {}", name))
    }
}

impl From<PolicyError> for AnalysisError {
    fn from(err: PolicyError) -> Self {
        match err.kind {
            PolicyErrorKind::UnknownSymbol | PolicyErrorKind::UnknownRule => {
                AnalysisError::NotFound(err.message)
            }
            PolicyErrorKind::InvalidRule => AnalysisError::InvalidArgument(err.message),
            _ => AnalysisError::UpstreamQuery(err.to_string()),
        }
    }
}

impl From<regex::Error> for AnalysisError {
    fn from(err: regex::Error) -> Self {
        AnalysisError::UpstreamQuery(format!("invalid result pattern: {}", err))
    }
}

impl From<TryReserveError> for AnalysisError {
    fn from(err: TryReserveError) -> Self {
        AnalysisError::OutOfMemory(err.to_string())
    }
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
