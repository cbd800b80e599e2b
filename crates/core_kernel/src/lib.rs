//! Core Kernel - Foundational types for the claims orchestrator
//!
//! This crate provides the building blocks shared by the domain and interface crates:
//! - Strongly-typed identifiers for claims and audit records
//! - Port abstractions (error type and marker traits) for swappable adapters

pub mod identifiers;
pub mod ports;

pub use identifiers::{ClaimId, AuditEntryId};
pub use ports::{PortError, DomainPort};
