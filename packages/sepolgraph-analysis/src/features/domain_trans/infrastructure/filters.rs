/*
 * Result filters
 *
 * Applied in order: validity, result type, access. Each step removes
 * candidates in place and keeps the survivors in their original order.
 */

use regex::{Regex, RegexBuilder};
use sepolgraph_policy::TypeId;
use tracing::debug;

use crate::errors::{AnalysisError, Result};
use crate::features::domain_trans::domain::{
    ClassPerm, Direction, ResultPattern, TransitionCandidate, ValidityMode,
};
use crate::features::domain_trans::ports::{AllowRuleQuery, PolicyOracle};

/// Keep candidates whose validity matches `mode`
pub fn filter_validity(candidates: &mut Vec<TransitionCandidate>, mode: ValidityMode) {
    if mode == ValidityMode::Both {
        return;
    }
    let before = candidates.len();
    candidates.retain(|c| mode.accepts(c.valid));
    debug!(mode = ?mode, before, after = candidates.len(), "validity filter");
}

/// Compiled result-type pattern
#[derive(Debug, Clone)]
pub enum TypeMatcher {
    Literal(String),
    Regex(Regex),
}

impl TypeMatcher {
    /// Compile `pattern`; `size_limit` bounds the compiled regex
    pub fn compile(pattern: &ResultPattern, size_limit: usize) -> Result<Self> {
        if !pattern.is_regex {
            return Ok(TypeMatcher::Literal(pattern.pattern.clone()));
        }
        let regex = RegexBuilder::new(&pattern.pattern)
            .size_limit(size_limit)
            .build()?;
        Ok(TypeMatcher::Regex(regex))
    }

    pub fn is_match(&self, name: &str) -> bool {
        match self {
            TypeMatcher::Literal(lit) => lit == name,
            TypeMatcher::Regex(re) => re.is_match(name),
        }
    }

    /// Match the type's primary name or any alias
    pub fn matches_type<P: PolicyOracle + ?Sized>(&self, oracle: &P, id: TypeId) -> Result<bool> {
        let name = oracle
            .type_name(id)
            .ok_or_else(|| AnalysisError::not_found(format!("no name for type {}", id)))?;
        Ok(self.is_match(name) || oracle.type_aliases(id).iter().any(|a| self.is_match(a)))
    }
}

/// Keep candidates whose reported type matches
///
/// The reported type is the end type for forward analyses and the start
/// type for reverse ones. Candidates without that type never match.
pub fn filter_result_type<P: PolicyOracle + ?Sized>(
    oracle: &P,
    candidates: &mut Vec<TransitionCandidate>,
    direction: Direction,
    matcher: &TypeMatcher,
) -> Result<()> {
    let keep = candidates
        .iter()
        .map(|c| {
            let reported = match direction {
                Direction::Forward => Some(c.end),
                Direction::Reverse => c.start,
            };
            match reported {
                Some(id) => matcher.matches_type(oracle, id),
                None => Ok(false),
            }
        })
        .collect::<Result<Vec<bool>>>()?;

    let before = candidates.len();
    let mut keep = keep.into_iter();
    candidates.retain(|_| keep.next().unwrap_or(false));
    debug!(before, after = candidates.len(), "result type filter");
    Ok(())
}

/// Keep candidates whose end type holds any of the requested access
///
/// Every allow rule from the end type to one of `targets` covering one of
/// `class_perms` is accumulated onto the candidate.
pub fn filter_access<Q: AllowRuleQuery + ?Sized>(
    query: &Q,
    candidates: &mut Vec<TransitionCandidate>,
    targets: &[TypeId],
    class_perms: &[ClassPerm],
) -> Result<()> {
    for candidate in candidates.iter_mut() {
        for &target in targets {
            for cp in class_perms {
                let hits = query.query_allow(candidate.end, target, &cp.class, &cp.perms)?;
                candidate.access_rules.try_reserve(hits.len())?;
                candidate.access_rules.extend(hits);
            }
        }
    }

    let before = candidates.len();
    candidates.retain(|c| !c.access_rules.is_empty());
    debug!(before, after = candidates.len(), "access filter");
    Ok(())
}
