//! Claim lookup port
//!
//! The workflow core assumes operations on one claim are serialized. The store
//! hands out a per-claim async mutex so the service can hold a claim for the
//! length of an operation while other claims proceed independently.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use core_kernel::{ClaimId, DomainPort, PortError};
use crate::claim::Claim;

/// Shared handle to one stored claim
pub type ClaimHandle = Arc<Mutex<Claim>>;

/// Keyed claim storage
#[async_trait]
pub trait ClaimStore: DomainPort {
    /// Stores a new claim; fails with `Conflict` if the id is taken
    async fn insert(&self, claim: Claim) -> Result<ClaimHandle, PortError>;

    /// Returns the lockable handle for `id`
    async fn handle(&self, id: ClaimId) -> Result<ClaimHandle, PortError>;

    /// Handles for every stored claim, in id order
    async fn handles(&self) -> Result<Vec<ClaimHandle>, PortError>;
}

/// In-memory adapter, used by tests and the demo binary
#[derive(Debug, Default)]
pub struct InMemoryClaimStore {
    claims: RwLock<HashMap<ClaimId, ClaimHandle>>,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryClaimStore {}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn insert(&self, claim: Claim) -> Result<ClaimHandle, PortError> {
        let mut claims = self.claims.write().await;
        let id = claim.id();
        if claims.contains_key(&id) {
            return Err(PortError::conflict(format!("claim {id} already exists")));
        }
        let handle = Arc::new(Mutex::new(claim));
        claims.insert(id, handle.clone());
        Ok(handle)
    }

    async fn handle(&self, id: ClaimId) -> Result<ClaimHandle, PortError> {
        self.claims
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Claim", id))
    }

    async fn handles(&self) -> Result<Vec<ClaimHandle>, PortError> {
        let claims = self.claims.read().await;
        let mut ids: Vec<_> = claims.keys().copied().collect();
        ids.sort();
        Ok(ids.into_iter().filter_map(|id| claims.get(&id).cloned()).collect())
    }
}
