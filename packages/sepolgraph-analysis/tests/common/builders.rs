//! Test data builders
//!
//! This module provides builder patterns for creating analysis requests.

use sepolgraph_analysis::features::domain_trans::{Direction, DomainTransAnalysis, ValidityMode};

/// Builder for DomainTransAnalysis
#[derive(Debug, Default)]
pub struct RequestBuilder {
    request: DomainTransAnalysis,
}

impl RequestBuilder {
    /// Forward analysis from `start`
    pub fn forward(start: &str) -> Self {
        let mut request = DomainTransAnalysis::new();
        request.set_direction(Direction::Forward).set_start_type(start);
        Self { request }
    }

    /// Reverse analysis into `end`
    pub fn reverse(end: &str) -> Self {
        let mut request = DomainTransAnalysis::new();
        request.set_direction(Direction::Reverse).set_start_type(end);
        Self { request }
    }

    pub fn validity(mut self, mode: ValidityMode) -> Self {
        self.request.set_validity_mode(mode);
        self
    }

    /// Keep both valid and invalid candidates
    pub fn all(self) -> Self {
        self.validity(ValidityMode::Both)
    }

    pub fn result_literal(mut self, name: &str) -> Self {
        self.request.set_result_pattern(name, false);
        self
    }

    pub fn result_regex(mut self, pattern: &str) -> Self {
        self.request.set_result_pattern(pattern, true);
        self
    }

    /// Access filter target type
    pub fn access_type(mut self, name: &str) -> Self {
        self.request.append_access_type(Some(name));
        self
    }

    /// Access filter class/permission pair
    pub fn class_perm(mut self, class: &str, perm: &str) -> Self {
        self.request.append_class_permission(Some(class), Some(perm));
        self
    }

    pub fn build(self) -> DomainTransAnalysis {
        self.request
    }
}
