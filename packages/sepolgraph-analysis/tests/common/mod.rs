//! Common test utilities for sepolgraph-analysis
//!
//! This module provides shared fixtures, assertions, and builders
//! for integration tests.

#![allow(dead_code)]

mod assertions;
mod builders;
mod fixtures;

// Re-export all utilities
pub use assertions::*;
pub use builders::*;
pub use fixtures::*;

/// Install a test subscriber filtered by `RUST_LOG`
///
/// Safe to call from every test; only the first call installs it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
