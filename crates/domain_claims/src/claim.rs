//! Claim aggregate

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{AuditEntryId, ClaimId};
use crate::error::ClaimError;
use crate::state::ClaimState;

/// Intake data for a new claim
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewClaim {
    #[validate(length(min = 1, message = "claimant name must not be empty"))]
    pub claimant_name: String,
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    /// Pre-flag the claim for investigation at intake
    #[serde(default)]
    pub requires_investigation: bool,
    /// Transcript of the first call with the claimant
    #[serde(default)]
    pub call_log: Option<String>,
}

impl NewClaim {
    /// Creates intake data with no pre-set flag and no call log
    pub fn new(claimant_name: impl Into<String>, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            claimant_name: claimant_name.into(),
            amount,
            description: description.into(),
            requires_investigation: false,
            call_log: None,
        }
    }
}

fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_positive() && !amount.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("positive_amount"))
    }
}

/// States that were dynamically inserted into a claim's remaining path
///
/// Insertion goes to the front and consumption comes off the front, so the
/// most recently inserted state is always visited next. Only the transition
/// engine and human review can mutate the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingStates(VecDeque<ClaimState>);

impl PendingStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state that must be entered next, if any
    pub fn front(&self) -> Option<ClaimState> {
        self.0.front().copied()
    }

    pub fn contains(&self, state: ClaimState) -> bool {
        self.0.contains(&state)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ClaimState> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<ClaimState> {
        self.iter().collect()
    }

    pub(crate) fn push_front(&mut self, state: ClaimState) {
        self.0.push_front(state);
    }

    pub(crate) fn pop_front(&mut self) -> Option<ClaimState> {
        self.0.pop_front()
    }

    /// Drops every occurrence of `state`; returns whether anything was removed
    pub(crate) fn remove(&mut self, state: ClaimState) -> bool {
        let before = self.0.len();
        self.0.retain(|s| *s != state);
        self.0.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

/// A recorded decision, by an evaluator, the orchestrator or a human operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: AuditEntryId,
    /// Evaluator, producer or operator that made the decision
    pub actor: String,
    pub timestamp: DateTime<Utc>,
    pub decision: String,
    pub rationale: String,
    pub confidence: Option<f64>,
}

/// An insurance claim moving through the orchestration workflow
///
/// Workflow fields (`current_state`, `state_history`, `pending_states`,
/// `audit_log`) are only reachable through accessors so the transition engine
/// stays the single writer of routing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    id: ClaimId,
    pub claimant_name: String,
    pub amount: Decimal,
    pub description: String,
    /// Raised by any evaluator or the orchestrator, cleared only by human approval
    pub requires_investigation: bool,
    current_state: ClaimState,
    state_history: Vec<ClaimState>,
    pending_states: PendingStates,
    /// Latest vision producer output
    pub vision_analysis: Option<serde_json::Value>,
    /// Latest text producer output
    pub text_analysis: Option<serde_json::Value>,
    pub call_log: Option<String>,
    pub human_override: Option<String>,
    audit_log: Vec<AuditLogEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Validates intake data and creates a claim in `Submitted`
    pub fn submit(intake: NewClaim) -> Result<Self, ClaimError> {
        intake
            .validate()
            .map_err(|e| ClaimError::validation(e.to_string()))?;

        let now = Utc::now();
        Ok(Self {
            id: ClaimId::new(),
            claimant_name: intake.claimant_name,
            amount: intake.amount,
            description: intake.description,
            requires_investigation: intake.requires_investigation,
            current_state: ClaimState::Submitted,
            state_history: Vec::new(),
            pending_states: PendingStates::new(),
            vision_analysis: None,
            text_analysis: None,
            call_log: intake.call_log,
            human_override: None,
            audit_log: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> ClaimId {
        self.id
    }

    pub fn current_state(&self) -> ClaimState {
        self.current_state
    }

    /// States previously occupied, oldest first
    pub fn state_history(&self) -> &[ClaimState] {
        &self.state_history
    }

    pub fn pending_states(&self) -> &PendingStates {
        &self.pending_states
    }

    pub fn audit_log(&self) -> &[AuditLogEntry] {
        &self.audit_log
    }

    pub fn is_terminal(&self) -> bool {
        self.current_state.is_terminal()
    }

    /// Appends a decision to the audit trail
    pub fn add_audit_entry(
        &mut self,
        actor: impl Into<String>,
        decision: impl Into<String>,
        rationale: impl Into<String>,
        confidence: Option<f64>,
    ) {
        self.audit_log.push(AuditLogEntry {
            id: AuditEntryId::new(),
            actor: actor.into(),
            timestamp: Utc::now(),
            decision: decision.into(),
            rationale: rationale.into(),
            confidence,
        });
        self.touch();
    }

    pub(crate) fn pending_states_mut(&mut self) -> &mut PendingStates {
        &mut self.pending_states
    }

    /// Moves to `target`, archiving the current state first
    pub(crate) fn record_state_change(&mut self, target: ClaimState) {
        if self.state_history.last() != Some(&self.current_state) {
            self.state_history.push(self.current_state);
        }
        self.current_state = target;
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
