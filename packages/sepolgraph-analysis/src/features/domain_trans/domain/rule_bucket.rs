/*
 * Rule buckets
 *
 * A bucket holds, for one (owner type, rule category) pair, the rule entries
 * keyed by partner type. Entries stay sorted by partner ordinal and unique
 * per partner so lookups can binary-search.
 *
 * Traversal state ("has this entry been consumed already") is not stored in
 * the entries. It lives in `UsedMarks`, keyed by bucket kind, owner and
 * partner, so the table itself stays immutable once built.
 */

use rustc_hash::FxHashSet;
use sepolgraph_policy::{RuleId, TypeId};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Rules sharing one partner type inside a bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEntry {
    /// Target type for outbound buckets, source type for inbound buckets
    pub partner: TypeId,
    /// Default (resulting) type; set only in type-change buckets
    pub default: Option<TypeId>,
    /// Raw rules, in insertion order
    pub rules: Vec<RuleId>,
    /// Some rule in this entry also grants `execute_no_trans`
    pub has_no_trans: bool,
}

/// Sorted collection of rule entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleBucket {
    entries: Vec<RuleEntry>,
}

impl RuleBucket {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add `rule` under `partner`, appending to an existing entry when one
    /// exists. An existing entry keeps its original default type.
    pub fn insert(
        &mut self,
        partner: TypeId,
        default: Option<TypeId>,
        rule: RuleId,
        has_no_trans: bool,
    ) -> Result<()> {
        match self.position(partner) {
            Ok(pos) => {
                let entry = &mut self.entries[pos];
                entry.rules.try_reserve(1)?;
                entry.rules.push(rule);
                entry.has_no_trans |= has_no_trans;
            }
            Err(pos) => {
                self.entries.try_reserve(1)?;
                let mut rules = Vec::new();
                rules.try_reserve_exact(1)?;
                rules.push(rule);
                self.entries.insert(
                    pos,
                    RuleEntry {
                        partner,
                        default,
                        rules,
                        has_no_trans,
                    },
                );
            }
        }
        Ok(())
    }

    fn position(&self, partner: TypeId) -> std::result::Result<usize, usize> {
        self.entries.binary_search_by(|e| e.partner.cmp(&partner))
    }

    /// Binary search by partner ordinal
    pub fn find_for_partner(&self, partner: TypeId) -> Option<&RuleEntry> {
        self.position(partner).ok().map(|pos| &self.entries[pos])
    }

    /// Linear scan on the default type (type-change buckets)
    pub fn find_for_default(&self, default: TypeId) -> Option<&RuleEntry> {
        self.entries.iter().find(|e| e.default == Some(default))
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which bucket of a node an entry lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    /// Domain side: outbound `process transition`, keyed by target
    ProcessTransition,
    /// Domain side: outbound `file entrypoint`, keyed by executable
    Entrypoint,
    /// Domain side: self `process setexec`
    Setexec,
    /// Domain side: `type_transition ... : process`, keyed by executable
    TypeChange,
    /// Exec side: inbound `file execute`, keyed by executing domain
    Execute,
    /// Exec side: inbound `file entrypoint`, keyed by entered domain
    ExecEntrypoint,
}

impl BucketKind {
    pub fn is_domain_side(self) -> bool {
        matches!(
            self,
            BucketKind::ProcessTransition
                | BucketKind::Entrypoint
                | BucketKind::Setexec
                | BucketKind::TypeChange
        )
    }
}

/// Visited set for one table
///
/// Not safe to share between interleaved traversals; `clear` before a run
/// that must not observe earlier marks.
#[derive(Debug, Clone, Default)]
pub struct UsedMarks {
    marks: FxHashSet<(BucketKind, TypeId, TypeId)>,
}

impl UsedMarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an entry; returns `false` if it was already marked
    pub fn mark(&mut self, kind: BucketKind, owner: TypeId, partner: TypeId) -> bool {
        self.marks.insert((kind, owner, partner))
    }

    pub fn is_used(&self, kind: BucketKind, owner: TypeId, partner: TypeId) -> bool {
        self.marks.contains(&(kind, owner, partner))
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
