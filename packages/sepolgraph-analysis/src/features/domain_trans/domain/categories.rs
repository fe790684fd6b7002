/*
 * Rule categories
 *
 * One bit per kind of rule a domain transition depends on. Used both to
 * classify raw rules while the table is built and to report what is
 * missing from a specific (start, entrypoint, end) triple.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bit set of transition rule categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleCategories(u8);

/// Categories absent from a transition, as reported by `verify_transition`
pub type MissingRules = RuleCategories;

impl RuleCategories {
    /// `allow start end : process transition;`
    pub const PROC_TRANS: Self = Self(0x01);
    /// `allow start ep : file execute;`
    pub const EXEC: Self = Self(0x02);
    /// `allow start ep : file execute_no_trans;`
    pub const EXEC_NO_TRANS: Self = Self(0x04);
    /// `allow end ep : file entrypoint;`
    pub const ENTRYPOINT: Self = Self(0x08);
    /// `type_transition start ep : process end;`
    pub const TYPE_TRANS: Self = Self(0x10);
    /// `allow start self : process setexec;`
    pub const SETEXEC: Self = Self(0x20);

    const ALL_BITS: u8 = 0x3f;

    const NAMES: [(RuleCategories, &'static str); 6] = [
        (Self::PROC_TRANS, "process transition"),
        (Self::EXEC, "execute"),
        (Self::EXEC_NO_TRANS, "execute_no_trans"),
        (Self::ENTRYPOINT, "entrypoint"),
        (Self::TYPE_TRANS, "type_transition"),
        (Self::SETEXEC, "setexec"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Unknown bits are dropped
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL_BITS)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Names of the categories set, lowest bit first
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(c, _)| self.contains(*c))
            .map(|(_, n)| *n)
            .collect()
    }
}

impl BitOr for RuleCategories {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RuleCategories {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for RuleCategories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        write!(f, "{}", self.names().join(", "))
    }
}
