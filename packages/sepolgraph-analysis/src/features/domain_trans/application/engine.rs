/*
 * Domain Transition Engine
 *
 * Owns the cached transition table and its used marks for one policy and
 * runs analysis requests against them.
 *
 * # Pipeline
 * 1. Validate the request and resolve its type names
 * 2. Build the table on first use (reused until invalidated)
 * 3. Forward or reverse traversal
 * 4. Filters: validity -> result type -> access
 * 5. Survivors become owned `DomainTransResult`s
 *
 * # Example
 * ```rust
 * use sepolgraph_analysis::features::domain_trans::{Direction, DomainTransEngine};
 * use sepolgraph_policy::PolicyBuilder;
 *
 * let mut b = PolicyBuilder::new().with_version(30);
 * b.declare_type("init_t").unwrap();
 * b.declare_type("httpd_t").unwrap();
 * b.declare_type("httpd_exec_t").unwrap();
 * b.allow("init_t", "httpd_t", "process", &["transition"]).unwrap();
 * b.allow("init_t", "httpd_exec_t", "file", &["execute"]).unwrap();
 * b.allow("httpd_t", "httpd_exec_t", "file", &["execute", "entrypoint"]).unwrap();
 * b.type_transition("init_t", "httpd_exec_t", "process", "httpd_t").unwrap();
 * let policy = b.build();
 *
 * let mut engine = DomainTransEngine::new(&policy);
 * let mut req = engine.create_request();
 * req.set_direction(Direction::Forward).set_start_type("init_t");
 *
 * let results = engine.run(&req).unwrap();
 * assert_eq!(results.len(), 1);
 * assert!(results[0].is_valid());
 * ```
 */

use sepolgraph_policy::TypeId;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::errors::{AnalysisError, Result};
use crate::features::domain_trans::domain::{
    Direction, DomainTransAnalysis, DomainTransResult, MissingRules, UsedMarks,
};
use crate::features::domain_trans::infrastructure::{
    filter_access, filter_result_type, filter_validity, forward_transitions, reverse_transitions,
    structural_requirements, verify_triple, TransitionTable, TypeMatcher, SETEXEC_POLICY_VERSION,
};
use crate::features::domain_trans::ports::{AllowRuleQuery, PolicyOracle};

/// Domain transition analysis over one policy
pub struct DomainTransEngine<'p, P: PolicyOracle + AllowRuleQuery + ?Sized> {
    policy: &'p P,
    config: AnalysisConfig,
    table: Option<TransitionTable>,
    marks: UsedMarks,
}

impl<'p, P: PolicyOracle + AllowRuleQuery + ?Sized> DomainTransEngine<'p, P> {
    /// Engine with the default configuration
    pub fn new(policy: &'p P) -> Self {
        Self {
            policy,
            config: AnalysisConfig::default(),
            table: None,
            marks: UsedMarks::new(),
        }
    }

    /// Engine with a validated configuration
    pub fn with_config(policy: &'p P, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            policy,
            config,
            table: None,
            marks: UsedMarks::new(),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn policy(&self) -> &'p P {
        self.policy
    }

    // ═══════════════════════════════════════════════════════════════════
    // Table lifecycle
    // ═══════════════════════════════════════════════════════════════════

    /// Build the table if it does not exist yet
    pub fn build_table(&mut self) -> Result<()> {
        self.prepare().map(|_| ())
    }

    pub fn is_table_built(&self) -> bool {
        self.table.is_some()
    }

    pub fn table(&self) -> Option<&TransitionTable> {
        self.table.as_ref()
    }

    /// Drop the table and its marks; the next use rebuilds it
    pub fn invalidate_table(&mut self) {
        if self.table.take().is_some() {
            debug!("Transition table invalidated");
        }
        self.marks.clear();
    }

    pub fn rebuild_table(&mut self) -> Result<()> {
        self.invalidate_table();
        self.build_table()
    }

    /// Clear all used marks
    pub fn reset_table(&mut self) {
        debug!(marks = self.marks.len(), "Resetting used marks");
        self.marks.clear();
    }

    /// Table and marks, building the table on first use
    ///
    /// A failed build leaves no table behind.
    fn prepare(&mut self) -> Result<(&TransitionTable, &mut UsedMarks)> {
        let table = match self.table.take() {
            Some(table) => table,
            None => TransitionTable::build(self.policy)?,
        };
        let table = self.table.insert(table);
        Ok((&*table, &mut self.marks))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Analysis
    // ═══════════════════════════════════════════════════════════════════

    /// New request seeded with the configured default validity mode
    pub fn create_request(&self) -> DomainTransAnalysis {
        let mut request = DomainTransAnalysis::new();
        request.set_validity_mode(self.config.default_validity);
        request
    }

    /// Run one analysis
    ///
    /// Marks left by earlier runs stay visible unless `reset_table` was
    /// called or `auto_reset` is configured. A failure leaves the table
    /// intact.
    pub fn run(&mut self, request: &DomainTransAnalysis) -> Result<Vec<DomainTransResult>> {
        let (direction, start_name) = request.validate().map_err(|e| {
            warn!("Rejected domain transition request: {}", e);
            e
        })?;

        let access_count = request.access_types().len();
        if access_count > self.config.max_access_types {
            warn!(
                "Request names {} access types, limit is {}",
                access_count, self.config.max_access_types
            );
            return Err(AnalysisError::invalid_argument(format!(
                "{} access types exceed the configured limit of {}",
                access_count, self.config.max_access_types
            )));
        }

        let policy = self.policy;
        let start = policy.resolve_type(start_name)?;
        if policy.is_attribute(start) {
            return Err(AnalysisError::attribute_not_allowed(start_name));
        }
        let matcher = request
            .result_pattern()
            .map(|p| TypeMatcher::compile(p, self.config.regex_size_limit))
            .transpose()?;
        let targets = self.resolve_access_types(request)?;
        let auto_reset = self.config.auto_reset;

        let (table, marks) = self.prepare()?;
        if auto_reset {
            marks.clear();
        }

        let mut candidates = match direction {
            Direction::Forward => forward_transitions(table, marks, start)?,
            Direction::Reverse => reverse_transitions(policy, table, marks, start)?,
        };
        let found = candidates.len();

        filter_validity(&mut candidates, request.validity_mode());
        if let Some(matcher) = &matcher {
            filter_result_type(policy, &mut candidates, direction, matcher)?;
        }
        if request.wants_access_filter() {
            filter_access(policy, &mut candidates, &targets, request.class_perms())?;
        }

        let mut results = Vec::new();
        results.try_reserve_exact(candidates.len())?;
        results.extend(candidates.into_iter().map(DomainTransResult::from));

        info!(
            "Domain transition analysis ({:?}) from {}: {} candidates, {} results",
            direction,
            start_name,
            found,
            results.len()
        );
        Ok(results)
    }

    /// Resolve access-filter target names, dropping repeats in order
    fn resolve_access_types(&self, request: &DomainTransAnalysis) -> Result<Vec<TypeId>> {
        let mut targets: Vec<TypeId> = Vec::new();
        targets.try_reserve(request.access_types().len())?;
        for name in request.access_types() {
            let id = self.policy.resolve_type(name)?;
            if !targets.contains(&id) {
                targets.push(id);
            }
        }
        Ok(targets)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Verification
    // ═══════════════════════════════════════════════════════════════════

    /// Rule categories missing for one (start, entrypoint, end) triple
    ///
    /// Every given name must resolve. With any name omitted the table is not
    /// consulted; the result lists the categories the unknown parts would
    /// have to supply.
    pub fn verify_transition(
        &mut self,
        start: Option<&str>,
        entrypoint: Option<&str>,
        end: Option<&str>,
    ) -> Result<MissingRules> {
        let resolve = |name: Option<&str>| name.map(|n| self.policy.resolve_type(n)).transpose();
        let ids = (resolve(start)?, resolve(entrypoint)?, resolve(end)?);

        let (Some(start), Some(entrypoint), Some(end)) = ids else {
            let needs = self.policy.policy_version() >= SETEXEC_POLICY_VERSION
                || self.policy.is_modular();
            return Ok(structural_requirements(
                ids.0.is_some(),
                ids.1.is_some(),
                ids.2.is_some(),
                needs,
            ));
        };

        let (table, _) = self.prepare()?;
        let missing = verify_triple(table, start, entrypoint, end)?;
        debug!("Verified {} -> {} -> {}: missing {}", start, entrypoint, end, missing);
        Ok(missing)
    }
}
