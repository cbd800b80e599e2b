//! Ports and Adapters Infrastructure
//!
//! Domain crates describe the collaborators they need (claim lookup and
//! storage) as port traits. Adapters implement those traits: an
//! in-memory store for tests and the demo binary, or a database/API backed one
//! supplied by the surrounding service.
//!
//! ```text
//!   ClaimService ──► ClaimStore (port) ◄── InMemoryClaimStore
//!                                      ◄── <durable adapter, out of tree>
//! ```

use std::fmt;
use thiserror::Error;

/// Error type shared by every port implementation
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared across tasks, so implementations must be thread-safe.
pub trait DomainPort: Send + Sync + 'static {}
