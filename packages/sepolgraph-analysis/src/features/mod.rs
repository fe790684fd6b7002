//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure business logic (no external dependencies)
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - External dependency implementations

pub mod domain_trans;
