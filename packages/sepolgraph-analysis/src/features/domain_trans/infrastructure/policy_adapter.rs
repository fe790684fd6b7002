/*
 * Port implementations for the in-memory policy model
 */

use sepolgraph_policy::{AvRuleKind, AvRuleQuery, Policy, Rule, RuleId, TeRuleKind, TypeId};

use crate::errors::{AnalysisError, Result};
use crate::features::domain_trans::ports::{AllowRuleQuery, PolicyOracle};

impl PolicyOracle for Policy {
    fn policy_version(&self) -> u32 {
        self.version()
    }

    fn is_modular(&self) -> bool {
        Policy::is_modular(self)
    }

    fn type_count(&self) -> usize {
        self.symbol_count()
    }

    fn resolve_type(&self, name: &str) -> Result<TypeId> {
        Ok(self.lookup(name)?)
    }

    fn is_attribute(&self, id: TypeId) -> bool {
        Policy::is_attribute(self, id)
    }

    fn expand_type(&self, id: TypeId) -> Vec<TypeId> {
        self.expand(id)
    }

    fn type_name(&self, id: TypeId) -> Option<&str> {
        self.name_of(id)
    }

    fn type_aliases(&self, id: TypeId) -> &[String] {
        match self.datum(id) {
            Some(d) => d.aliases.as_slice(),
            None => &[],
        }
    }

    fn allow_rules(&self, class: &str, perm: Option<&str>) -> Vec<RuleId> {
        self.av_rules(AvRuleKind::Allow, Some(class), perm)
            .map(|(id, _)| id)
            .collect()
    }

    fn type_change_rules(&self, class: &str) -> Vec<RuleId> {
        self.te_rules(TeRuleKind::TypeTransition, Some(class))
            .map(|(id, _)| id)
            .collect()
    }

    fn rule_source(&self, rule: RuleId) -> Result<TypeId> {
        Ok(self.rule(rule)?.source())
    }

    fn rule_target(&self, rule: RuleId) -> Result<TypeId> {
        Ok(self.rule(rule)?.target())
    }

    fn rule_target_is_self(&self, rule: RuleId) -> Result<bool> {
        Ok(self.rule(rule)?.target_is_self())
    }

    fn rule_default(&self, rule: RuleId) -> Result<Option<TypeId>> {
        Ok(self.rule(rule)?.default_type())
    }

    fn rule_perms(&self, rule: RuleId) -> Result<&[String]> {
        match self.rule(rule)? {
            Rule::Av(av) => Ok(av.perms.as_slice()),
            Rule::Te(_) => Ok(&[][..]),
        }
    }
}

impl AllowRuleQuery for Policy {
    fn query_allow(
        &self,
        source: TypeId,
        target: TypeId,
        class: &str,
        perms: &[String],
    ) -> Result<Vec<RuleId>> {
        let name = |id: TypeId| {
            self.name_of(id)
                .ok_or_else(|| AnalysisError::not_found(format!("no name for type {}", id)))
        };
        let mut query = AvRuleQuery::new()
            .source(name(source)?, true)
            .target(name(target)?, true)
            .class(class);
        for perm in perms {
            query = query.perm(perm.as_str());
        }
        query
            .execute(self)
            .map_err(|e| AnalysisError::upstream(e.to_string()))
    }
}
