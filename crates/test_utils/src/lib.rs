//! Test Utilities Crate
//!
//! Shared test infrastructure for the claims orchestration test suite.
//!
//! # Modules
//!
//! - `fixtures`: Canned claimants and producer results
//! - `builders`: Builder patterns for claim construction
//! - `evaluators`: Scripted risk evaluators with controllable outcomes
//! - `assertions`: Assertion helpers for claim routing
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod evaluators;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use evaluators::*;
pub use assertions::*;
pub use generators::*;
