//! Human review overrides
//!
//! Operators can clear a flagged claim (approve) or end it outright (reject).
//! Both record an audit entry and a free-text override note.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::claim::Claim;
use crate::error::ClaimError;
use crate::machine::ClaimStateMachine;
use crate::state::ClaimState;

pub const DEFAULT_APPROVAL_REASON: &str = "Manual review completed";
pub const DEFAULT_REJECTION_REASON: &str = "Claim rejected after review";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewAction {
    Approved,
    Rejected,
}

impl ReviewAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewAction::Approved => "APPROVED",
            ReviewAction::Rejected => "REJECTED",
        }
    }
}

/// What a human override did to the claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub action: ReviewAction,
    pub previous_state: ClaimState,
    pub new_state: ClaimState,
    pub message: String,
}

/// Clears the claim of suspicion and moves it one step forward
///
/// Any pending investigation is dropped and the investigation flag is reset.
/// The step forward goes through the transition engine without firing
/// reactions. A terminal claim is acknowledged without moving.
pub fn approve(
    machine: &ClaimStateMachine,
    claim: &mut Claim,
    operator: &str,
    reason: Option<&str>,
) -> Result<ReviewOutcome, ClaimError> {
    let reason = reason.filter(|r| !r.is_empty()).unwrap_or(DEFAULT_APPROVAL_REASON);
    let previous_state = claim.current_state();

    claim.pending_states_mut().remove(ClaimState::FraudInvestigation);

    let message = if claim.is_terminal() {
        format!("Claim acknowledged by {operator}. State unchanged.")
    } else {
        let entered = machine.advance(claim)?;
        if previous_state == ClaimState::FraudInvestigation {
            claim.human_override = Some(format!("Cleared by {operator}"));
            format!("Claim cleared by {operator}. Moved from {previous_state} to {entered}.")
        } else {
            format!("Claim approved by {operator}. Moved to {entered}.")
        }
    };

    claim.requires_investigation = false;
    claim.add_audit_entry(
        operator,
        ReviewAction::Approved.as_str(),
        format!("{reason}. Previous state: {previous_state}"),
        None,
    );

    info!(claim_id = %claim.id(), operator, from = %previous_state, to = %claim.current_state(), "Claim approved");

    Ok(ReviewOutcome {
        action: ReviewAction::Approved,
        previous_state,
        new_state: claim.current_state(),
        message,
    })
}

/// Ends the workflow with a rejection
pub fn reject(
    machine: &ClaimStateMachine,
    claim: &mut Claim,
    operator: &str,
    reason: Option<&str>,
) -> Result<ReviewOutcome, ClaimError> {
    let reason = reason.filter(|r| !r.is_empty()).unwrap_or(DEFAULT_REJECTION_REASON);
    let previous_state = claim.current_state();

    machine.close(claim)?;
    claim.human_override = Some(format!("Rejected by {operator}: {reason}"));
    claim.add_audit_entry(operator, ReviewAction::Rejected.as_str(), reason, None);

    info!(claim_id = %claim.id(), operator, from = %previous_state, "Claim rejected");

    Ok(ReviewOutcome {
        action: ReviewAction::Rejected,
        previous_state,
        new_state: claim.current_state(),
        message: format!("Claim rejected by {operator}. Reason: {reason}"),
    })
}
