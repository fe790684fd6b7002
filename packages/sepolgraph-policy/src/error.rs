//! Error types for sepolgraph-policy

use std::fmt;
use thiserror::Error;

/// Policy error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Name does not resolve to a type, attribute or alias
    UnknownSymbol,
    /// Name already declared
    DuplicateSymbol,
    /// Rule references something it may not (e.g. attribute as default type)
    InvalidRule,
    /// Rule id out of range
    UnknownRule,
    /// Malformed query
    InvalidQuery,
    /// Serialization/deserialization errors
    Serialization,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnknownSymbol => "unknown_symbol",
            ErrorKind::DuplicateSymbol => "duplicate_symbol",
            ErrorKind::InvalidRule => "invalid_rule",
            ErrorKind::UnknownRule => "unknown_rule",
            ErrorKind::InvalidQuery => "invalid_query",
            ErrorKind::Serialization => "serialization",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Policy error type
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct PolicyError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl PolicyError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn unknown_symbol(name: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::UnknownSymbol,
            format!("Unknown type or attribute: {}", name.into()),
        )
    }

    pub fn duplicate_symbol(name: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::DuplicateSymbol,
            format!("Symbol already declared: {}", name.into()),
        )
    }

    pub fn invalid_rule(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRule, message)
    }

    pub fn unknown_rule(id: u32) -> Self {
        Self::new(ErrorKind::UnknownRule, format!("Rule not found: #{}", id))
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidQuery, message)
    }
}

// JSON error conversions
impl From<serde_json::Error> for PolicyError {
    fn from(err: serde_json::Error) -> Self {
        PolicyError::new(ErrorKind::Serialization, format!("JSON error: {}", err)).with_source(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PolicyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = PolicyError::unknown_symbol("httpd_t");
        let msg = format!("{}", err);
        assert!(msg.contains("unknown_symbol"));
        assert!(msg.contains("httpd_t"));
    }

    #[test]
    fn test_invalid_rule_error() {
        let err = PolicyError::invalid_rule("default type may not be an attribute");
        assert_eq!(err.kind, ErrorKind::InvalidRule);
        assert!(err.source.is_none());
        assert_eq!(
            format!("{}", err),
            "[invalid_rule] default type may not be an attribute"
        );
    }

    #[test]
    fn test_unknown_rule_error() {
        let err = PolicyError::unknown_rule(42);
        assert_eq!(err.kind, ErrorKind::UnknownRule);
        assert!(err.message.contains("#42"));
    }

    #[test]
    fn test_with_source() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "policy.30 missing");
        let err = PolicyError::invalid_query("cannot open").with_source(io_err);

        let source = err.source().unwrap();
        assert!(source.to_string().contains("policy.30"));
    }

    #[test]
    fn test_error_kind_as_str() {
        assert_eq!(ErrorKind::UnknownSymbol.as_str(), "unknown_symbol");
        assert_eq!(ErrorKind::DuplicateSymbol.as_str(), "duplicate_symbol");
        assert_eq!(ErrorKind::InvalidRule.as_str(), "invalid_rule");
        assert_eq!(ErrorKind::UnknownRule.as_str(), "unknown_rule");
        assert_eq!(ErrorKind::InvalidQuery.as_str(), "invalid_query");
        assert_eq!(ErrorKind::Serialization.as_str(), "serialization");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ not json")
            .err()
            .unwrap();
        let err: PolicyError = json_err.into();

        assert_eq!(err.kind, ErrorKind::Serialization);
        assert!(err.message.contains("JSON error"));
        assert!(err.source.is_some());
    }

    #[test]
    fn test_result_propagation() {
        fn inner() -> Result<()> {
            Err(PolicyError::duplicate_symbol("init_t"))
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        let err = outer().unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateSymbol);
    }
}
