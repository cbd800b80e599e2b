//! Transition engine
//!
//! Validates and executes single-step state transitions and manages the
//! per-claim queue of dynamically inserted states.
//!
//! ```text
//! Standard:        SUBMITTED -> UNDER_REVIEW -> ASSESSMENT -> FINAL_DECISION
//! With detour:     SUBMITTED -> UNDER_REVIEW -> FRAUD_INVESTIGATION -> ASSESSMENT -> FINAL_DECISION
//! ```
//!
//! Insertions are restricted to edges the static graph already has, so
//! dynamic routing changes *when* a state is visited, never *whether* the
//! graph allows the move out of it.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::claim::Claim;
use crate::error::ClaimError;
use crate::state::ClaimState;

/// Stateless rules engine for claim routing
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimStateMachine;

impl ClaimStateMachine {
    pub fn new() -> Self {
        Self
    }

    /// Legal next states for `claim`
    ///
    /// A non-empty pending queue overrides the static graph entirely: only its
    /// front is legal.
    pub fn valid_transitions(&self, claim: &Claim) -> BTreeSet<ClaimState> {
        match claim.pending_states().front() {
            Some(required) => BTreeSet::from([required]),
            None => claim.current_state().successors().iter().copied().collect(),
        }
    }

    pub fn can_transition(&self, claim: &Claim, target: ClaimState) -> bool {
        self.valid_transitions(claim).contains(&target)
    }

    /// Moves `claim` into `target`
    ///
    /// Does not fire reactions; see [`crate::dispatcher::EventDispatcher`].
    pub fn transition(&self, claim: &mut Claim, target: ClaimState) -> Result<(), ClaimError> {
        let valid = self.valid_transitions(claim);
        if !valid.contains(&target) {
            return Err(ClaimError::InvalidTransition {
                from: claim.current_state(),
                to: target,
                valid: valid.into_iter().collect(),
            });
        }

        if claim.pending_states().front() == Some(target) {
            claim.pending_states_mut().pop_front();
        }

        let from = claim.current_state();
        claim.record_state_change(target);

        info!(
            claim_id = %claim.id(),
            %from,
            to = %target,
            pending = claim.pending_states().len(),
            "Claim transitioned"
        );
        Ok(())
    }

    /// Requires `new_state` to be visited before the default flow resumes
    ///
    /// `before` must be a static successor of `new_state`. Returns `false`
    /// when `new_state` was already pending and nothing changed. A terminal
    /// claim takes no insertions.
    pub fn insert_state(
        &self,
        claim: &mut Claim,
        new_state: ClaimState,
        before: ClaimState,
    ) -> Result<bool, ClaimError> {
        if claim.is_terminal() {
            return Err(ClaimError::TerminalState(claim.current_state()));
        }
        if !new_state.leads_to(before) {
            return Err(ClaimError::UnsupportedInsertion {
                state: new_state,
                before,
            });
        }

        if claim.pending_states().contains(new_state) {
            debug!(claim_id = %claim.id(), state = %new_state, "State already pending");
            return Ok(false);
        }

        claim.pending_states_mut().push_front(new_state);
        claim.touch();

        info!(
            claim_id = %claim.id(),
            state = %new_state,
            before = %before,
            "State inserted into claim path"
        );
        Ok(true)
    }

    /// Where [`advance`](Self::advance) would go, or `None` when terminal
    ///
    /// With nothing pending, detour states are never picked by default; among
    /// the remaining successors the earliest in declaration order wins.
    pub fn next_state(&self, claim: &Claim) -> Option<ClaimState> {
        if let Some(required) = claim.pending_states().front() {
            return Some(required);
        }
        self.valid_transitions(claim)
            .into_iter()
            .find(|state| !state.is_detour())
    }

    /// Transitions to [`next_state`](Self::next_state)
    pub fn advance(&self, claim: &mut Claim) -> Result<ClaimState, ClaimError> {
        let next = self
            .next_state(claim)
            .ok_or(ClaimError::TerminalState(claim.current_state()))?;
        self.transition(claim, next)?;
        Ok(next)
    }

    /// Ends the workflow immediately, discarding pending states
    ///
    /// This is the only move that bypasses the transition graph; it backs the
    /// human rejection path.
    pub fn close(&self, claim: &mut Claim) -> Result<(), ClaimError> {
        if claim.is_terminal() {
            return Err(ClaimError::TerminalState(claim.current_state()));
        }
        let from = claim.current_state();
        claim.pending_states_mut().clear();
        claim.record_state_change(ClaimState::FinalDecision);

        info!(claim_id = %claim.id(), %from, "Claim closed");
        Ok(())
    }
}
