//! Claims domain errors

use thiserror::Error;

use core_kernel::{ClaimId, PortError};
use crate::evaluation::{EvaluationOutcome, EvaluatorFault};
use crate::state::ClaimState;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Target is not in the claim's current set of valid transitions.
    /// Re-query the valid transitions and retry with a legal target.
    #[error("Invalid transition from {from} to {to}; valid transitions: {}", join_states(.valid))]
    InvalidTransition {
        from: ClaimState,
        to: ClaimState,
        valid: Vec<ClaimState>,
    },

    /// The static graph has no `state -> before` edge to route through
    #[error("Cannot insert {state} before {before}: {state} does not transition to {before}")]
    UnsupportedInsertion {
        state: ClaimState,
        before: ClaimState,
    },

    #[error("Claim is in terminal state {0}")]
    TerminalState(ClaimState),

    /// One or more risk evaluators failed. Results of the evaluators that did
    /// complete are kept for inspection; none of them were applied to the claim.
    #[error("Risk evaluation failed: {}", join_faults(.failures))]
    EvaluatorFailure {
        failures: Vec<EvaluatorFault>,
        completed: Vec<EvaluationOutcome>,
    },

    #[error("Claim not found: {0}")]
    ClaimNotFound(ClaimId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl ClaimError {
    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        ClaimError::Validation(message.into())
    }

    /// Returns true when the caller can recover by changing its request
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ClaimError::InvalidTransition { .. } | ClaimError::TerminalState(_)
        )
    }
}

fn join_states(states: &[ClaimState]) -> String {
    if states.is_empty() {
        return "none".to_string();
    }
    states
        .iter()
        .copied()
        .map(ClaimState::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_faults(faults: &[EvaluatorFault]) -> String {
    faults
        .iter()
        .map(|f| format!("{} ({})", f.evaluator, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}
