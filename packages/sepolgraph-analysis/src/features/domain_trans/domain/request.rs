/*
 * Analysis request
 *
 * Parameters of one domain transition analysis. Mutators never fail;
 * contradictions are reported by `validate` when the request is run.
 */

use serde::{Deserialize, Serialize};

use crate::errors::{AnalysisError, Result};

/// Direction of the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Start type is the source domain; find reachable domains
    Forward,
    /// Start type is the end domain; find domains that reach it
    Reverse,
}

impl Direction {
    pub const FORWARD_BITS: u8 = 0x01;
    pub const REVERSE_BITS: u8 = 0x02;

    pub fn bits(self) -> u8 {
        match self {
            Direction::Forward => Self::FORWARD_BITS,
            Direction::Reverse => Self::REVERSE_BITS,
        }
    }

    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            Self::FORWARD_BITS => Ok(Direction::Forward),
            Self::REVERSE_BITS => Ok(Direction::Reverse),
            other => Err(AnalysisError::invalid_argument(format!(
                "unknown direction 0x{:02x}",
                other
            ))),
        }
    }
}

/// Which candidates survive the validity filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidityMode {
    #[default]
    Valid,
    Invalid,
    Both,
}

impl ValidityMode {
    pub const VALID_BITS: u8 = 0x01;
    pub const INVALID_BITS: u8 = 0x02;
    pub const BOTH_BITS: u8 = 0x03;

    pub fn bits(self) -> u8 {
        match self {
            ValidityMode::Valid => Self::VALID_BITS,
            ValidityMode::Invalid => Self::INVALID_BITS,
            ValidityMode::Both => Self::BOTH_BITS,
        }
    }

    /// Rejects zero and any bit outside `BOTH_BITS`
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            Self::VALID_BITS => Ok(ValidityMode::Valid),
            Self::INVALID_BITS => Ok(ValidityMode::Invalid),
            Self::BOTH_BITS => Ok(ValidityMode::Both),
            other => Err(AnalysisError::invalid_argument(format!(
                "validity mode 0x{:02x} outside 0x01..=0x03",
                other
            ))),
        }
    }

    /// Does a candidate with this validity pass the filter?
    pub fn accepts(self, valid: bool) -> bool {
        match self {
            ValidityMode::Valid => valid,
            ValidityMode::Invalid => !valid,
            ValidityMode::Both => true,
        }
    }
}

/// Pattern matched against result type names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPattern {
    pub pattern: String,
    pub is_regex: bool,
}

/// An object class and the permissions of interest on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPerm {
    pub class: String,
    /// Empty means any permission of the class
    pub perms: Vec<String>,
}

/// Domain transition analysis request
///
/// # Example
/// ```rust
/// use sepolgraph_analysis::features::domain_trans::{DomainTransAnalysis, Direction, ValidityMode};
///
/// let mut req = DomainTransAnalysis::new();
/// req.set_direction(Direction::Forward)
///     .set_validity_mode(ValidityMode::Both)
///     .set_start_type("init_t")
///     .append_access_type(Some("httpd_log_t"))
///     .append_class_permission(Some("file"), Some("append"));
/// assert!(req.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainTransAnalysis {
    direction: Option<Direction>,
    validity: ValidityMode,
    start_type: Option<String>,
    result: Option<ResultPattern>,
    access_types: Vec<String>,
    class_perms: Vec<ClassPerm>,
}

impl DomainTransAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_direction(&mut self, direction: Direction) -> &mut Self {
        self.direction = Some(direction);
        self
    }

    pub fn set_validity_mode(&mut self, mode: ValidityMode) -> &mut Self {
        self.validity = mode;
        self
    }

    pub fn set_start_type(&mut self, name: impl Into<String>) -> &mut Self {
        self.start_type = Some(name.into());
        self
    }

    /// Keep only results whose reported type matches `pattern`
    pub fn set_result_pattern(&mut self, pattern: impl Into<String>, is_regex: bool) -> &mut Self {
        self.result = Some(ResultPattern {
            pattern: pattern.into(),
            is_regex,
        });
        self
    }

    pub fn clear_result_pattern(&mut self) -> &mut Self {
        self.result = None;
        self
    }

    /// Append a target type for the access filter; `None` clears the list
    pub fn append_access_type(&mut self, name: Option<&str>) -> &mut Self {
        match name {
            Some(name) => self.access_types.push(name.to_string()),
            None => self.access_types.clear(),
        }
        self
    }

    /// Add a class/permission pair for the access filter
    ///
    /// - `None` class clears every pair.
    /// - Known class: `Some(perm)` is merged in, `None` clears its permissions.
    /// - New class: `Some(perm)` creates the pair, `None` does nothing.
    pub fn append_class_permission(&mut self, class: Option<&str>, perm: Option<&str>) -> &mut Self {
        let Some(class) = class else {
            self.class_perms.clear();
            return self;
        };
        match self.class_perms.iter_mut().find(|cp| cp.class == class) {
            Some(existing) => match perm {
                Some(perm) => {
                    if !existing.perms.iter().any(|p| p == perm) {
                        existing.perms.push(perm.to_string());
                    }
                }
                None => existing.perms.clear(),
            },
            None => {
                if let Some(perm) = perm {
                    self.class_perms.push(ClassPerm {
                        class: class.to_string(),
                        perms: vec![perm.to_string()],
                    });
                }
            }
        }
        self
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn validity_mode(&self) -> ValidityMode {
        self.validity
    }

    pub fn start_type(&self) -> Option<&str> {
        self.start_type.as_deref()
    }

    pub fn result_pattern(&self) -> Option<&ResultPattern> {
        self.result.as_ref()
    }

    pub fn access_types(&self) -> &[String] {
        &self.access_types
    }

    pub fn class_perms(&self) -> &[ClassPerm] {
        &self.class_perms
    }

    /// Is the access filter requested?
    pub fn wants_access_filter(&self) -> bool {
        !self.access_types.is_empty()
    }

    /// Check the request before any traversal; returns direction and start name
    pub fn validate(&self) -> Result<(Direction, &str)> {
        let direction = self
            .direction
            .ok_or_else(|| AnalysisError::invalid_argument("analysis direction not set"))?;
        let start = self
            .start_type
            .as_deref()
            .ok_or_else(|| AnalysisError::invalid_argument("start type not set"))?;

        match (self.access_types.is_empty(), self.class_perms.is_empty()) {
            (true, true) => {}
            (false, false) if direction == Direction::Reverse => {
                return Err(AnalysisError::invalid_argument(
                    "access filtering is only supported for forward analysis",
                ));
            }
            (false, false) => {}
            _ => {
                return Err(AnalysisError::invalid_argument(
                    "access types and class/permission sets must be given together",
                ));
            }
        }

        Ok((direction, start))
    }
}
