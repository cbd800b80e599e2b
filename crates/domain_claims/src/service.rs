//! Claims application service
//!
//! Wires the claim store, the event dispatcher and the result aggregator
//! together. Every mutating call locks the claim for its whole duration and
//! works on a copy, so a failed operation (an evaluator error during review,
//! an illegal target) leaves the stored claim exactly as it was.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::ClaimId;
use crate::claim::{Claim, NewClaim};
use crate::dispatcher::EventDispatcher;
use crate::error::ClaimError;
use crate::orchestrator::{AggregatedDecision, ResultAggregator, TextAnalysis, VisionAnalysis};
use crate::review::{self, ReviewOutcome};
use crate::state::ClaimState;
use crate::store::{ClaimHandle, ClaimStore, InMemoryClaimStore};

/// A claim after a workflow step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimUpdate {
    pub claim: Claim,
    pub message: String,
    pub next_valid_states: Vec<ClaimState>,
}

/// Routing view of a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimHistory {
    pub claim_id: ClaimId,
    pub current_state: ClaimState,
    pub state_history: Vec<ClaimState>,
    pub pending_states: Vec<ClaimState>,
}

/// Producer results to feed the aggregator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub vision: Option<VisionAnalysis>,
    pub text: Option<TextAnalysis>,
    /// Transcript the text producer compared against
    pub call_log: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub claim_id: ClaimId,
    pub decision: AggregatedDecision,
    pub claim_state: ClaimState,
    pub pending_states: Vec<ClaimState>,
}

/// Portfolio overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimsSummary {
    pub total_claims: usize,
    /// Every state is present, zero counts included
    pub state_counts: BTreeMap<ClaimState, usize>,
    pub fraud_flagged: usize,
}

pub struct ClaimService {
    store: Arc<dyn ClaimStore>,
    dispatcher: EventDispatcher,
    aggregator: ResultAggregator,
}

impl ClaimService {
    pub fn new(store: Arc<dyn ClaimStore>, dispatcher: EventDispatcher, aggregator: ResultAggregator) -> Self {
        Self {
            store,
            dispatcher,
            aggregator,
        }
    }

    /// Service backed by an [`InMemoryClaimStore`]
    pub fn in_memory(dispatcher: EventDispatcher, aggregator: ResultAggregator) -> Self {
        Self::new(Arc::new(InMemoryClaimStore::new()), dispatcher, aggregator)
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub async fn create(&self, intake: NewClaim) -> Result<Claim, ClaimError> {
        let claim = Claim::submit(intake)?;
        self.store.insert(claim.clone()).await?;
        info!(claim_id = %claim.id(), amount = %claim.amount, "Claim submitted");
        Ok(claim)
    }

    pub async fn get(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        let handle = self.handle(id).await?;
        let claim = handle.lock().await.clone();
        Ok(claim)
    }

    pub async fn list(&self) -> Result<Vec<Claim>, ClaimError> {
        let mut claims = Vec::new();
        for handle in self.store.handles().await? {
            claims.push(handle.lock().await.clone());
        }
        Ok(claims)
    }

    pub async fn valid_transitions(&self, id: ClaimId) -> Result<Vec<ClaimState>, ClaimError> {
        let claim = self.get(id).await?;
        Ok(self.dispatcher.machine().valid_transitions(&claim).into_iter().collect())
    }

    /// Moves the claim to its next state and runs that state's reactions
    pub async fn advance(&self, id: ClaimId) -> Result<ClaimUpdate, ClaimError> {
        let handle = self.handle(id).await?;
        let mut stored = handle.lock().await;
        let mut working = stored.clone();
        let previous = working.current_state();

        self.dispatcher.advance_with_reactions(&mut working).await?;

        *stored = working.clone();
        Ok(self.update(working, previous))
    }

    /// Moves the claim to `target` and runs that state's reactions
    pub async fn transition(&self, id: ClaimId, target: ClaimState) -> Result<ClaimUpdate, ClaimError> {
        let handle = self.handle(id).await?;
        let mut stored = handle.lock().await;
        let mut working = stored.clone();
        let previous = working.current_state();

        self.dispatcher.transition_with_reactions(&mut working, target).await?;

        *stored = working.clone();
        Ok(self.update(working, previous))
    }

    /// Inserts `new_state` ahead of the default flow; returns whether it was added
    pub async fn insert_state(
        &self,
        id: ClaimId,
        new_state: ClaimState,
        before: ClaimState,
    ) -> Result<bool, ClaimError> {
        let handle = self.handle(id).await?;
        let mut stored = handle.lock().await;
        self.dispatcher.machine().insert_state(&mut stored, new_state, before)
    }

    pub async fn history(&self, id: ClaimId) -> Result<ClaimHistory, ClaimError> {
        let claim = self.get(id).await?;
        Ok(ClaimHistory {
            claim_id: claim.id(),
            current_state: claim.current_state(),
            state_history: claim.state_history().to_vec(),
            pending_states: claim.pending_states().to_vec(),
        })
    }

    /// Aggregates producer results and routes the claim accordingly
    ///
    /// Producer outputs are stored on the claim and each one, plus the
    /// combined decision, is written to the audit log. Out-of-range producer
    /// values are rejected before the claim is touched.
    pub async fn analyze(&self, id: ClaimId, request: AnalysisRequest) -> Result<AnalysisReport, ClaimError> {
        if let Some(vision) = &request.vision {
            vision.validate()?;
        }
        if let Some(text) = &request.text {
            text.validate()?;
        }

        let handle = self.handle(id).await?;
        let mut stored = handle.lock().await;
        let mut working = stored.clone();

        let decision = self
            .aggregator
            .aggregate(request.vision.as_ref(), request.text.as_ref());

        if let Some(vision) = &request.vision {
            working.vision_analysis = Some(snapshot(vision)?);
            working.add_audit_entry(
                "Vision Agent",
                if decision.vision_flagged { "FLAGGED" } else { "CLEARED" },
                vision.reasoning.clone(),
                Some(vision.confidence),
            );
        }
        if let Some(text) = &request.text {
            working.text_analysis = Some(snapshot(text)?);
            working.add_audit_entry(
                "Text Agent",
                if decision.text_flagged { "FLAGGED" } else { "CLEARED" },
                format!("{} (score: {}/{})", text.verdict, text.inconsistency_score, TextAnalysis::MAX_SCORE),
                Some(f64::from(text.inconsistency_score) / f64::from(TextAnalysis::MAX_SCORE)),
            );
        }
        if let Some(call_log) = request.call_log {
            working.call_log = Some(call_log);
        }

        working.add_audit_entry(
            "Orchestrator",
            if decision.requires_investigation { "INVESTIGATE" } else { "PROCEED" },
            decision.summary.clone(),
            Some(decision.fraud_score),
        );
        self.aggregator
            .apply(self.dispatcher.machine(), &mut working, &decision)?;

        *stored = working.clone();
        Ok(AnalysisReport {
            claim_id: working.id(),
            decision,
            claim_state: working.current_state(),
            pending_states: working.pending_states().to_vec(),
        })
    }

    pub async fn approve(&self, id: ClaimId, operator: &str, reason: Option<&str>) -> Result<ReviewOutcome, ClaimError> {
        let handle = self.handle(id).await?;
        let mut stored = handle.lock().await;
        let mut working = stored.clone();

        let outcome = review::approve(self.dispatcher.machine(), &mut working, operator, reason)?;

        *stored = working;
        Ok(outcome)
    }

    pub async fn reject(&self, id: ClaimId, operator: &str, reason: Option<&str>) -> Result<ReviewOutcome, ClaimError> {
        let handle = self.handle(id).await?;
        let mut stored = handle.lock().await;
        let mut working = stored.clone();

        let outcome = review::reject(self.dispatcher.machine(), &mut working, operator, reason)?;

        *stored = working;
        Ok(outcome)
    }

    pub async fn summary(&self) -> Result<ClaimsSummary, ClaimError> {
        let claims = self.list().await?;
        let mut state_counts: BTreeMap<ClaimState, usize> =
            ClaimState::ALL.into_iter().map(|s| (s, 0)).collect();
        for claim in &claims {
            *state_counts.entry(claim.current_state()).or_default() += 1;
        }
        Ok(ClaimsSummary {
            total_claims: claims.len(),
            state_counts,
            fraud_flagged: claims.iter().filter(|c| c.requires_investigation).count(),
        })
    }

    async fn handle(&self, id: ClaimId) -> Result<ClaimHandle, ClaimError> {
        self.store.handle(id).await.map_err(|e| {
            if e.is_not_found() {
                ClaimError::ClaimNotFound(id)
            } else {
                ClaimError::Port(e)
            }
        })
    }

    fn update(&self, claim: Claim, previous: ClaimState) -> ClaimUpdate {
        let mut message = format!("Claim advanced from {previous} to {}", claim.current_state());
        if !claim.pending_states().is_empty() {
            let pending: Vec<_> = claim.pending_states().iter().map(ClaimState::as_str).collect();
            message.push_str(&format!(". Pending states: [{}]", pending.join(", ")));
        }
        let next_valid_states = self.dispatcher.machine().valid_transitions(&claim).into_iter().collect();
        ClaimUpdate {
            claim,
            message,
            next_valid_states,
        }
    }
}

fn snapshot<T: Serialize>(result: &T) -> Result<serde_json::Value, ClaimError> {
    serde_json::to_value(result)
        .map_err(|e| ClaimError::validation(format!("analysis result is not serializable: {e}")))
}
