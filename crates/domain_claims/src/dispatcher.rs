//! State-entry reactions
//!
//! The dispatcher keeps, per state, an ordered list of reactions that run when
//! a claim enters that state. Reactions run one after another and each sees
//! the claim as the previous one left it. A reaction may call back into the
//! transition engine, typically to insert a state into the remaining path.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::claim::Claim;
use crate::error::ClaimError;
use crate::evaluation::EvaluationFanOut;
use crate::machine::ClaimStateMachine;
use crate::state::ClaimState;

/// Action executed when a claim enters a state
#[async_trait]
pub trait Reaction: Send + Sync {
    fn name(&self) -> &str;

    async fn react(&self, claim: &mut Claim, machine: &ClaimStateMachine) -> Result<(), ClaimError>;
}

/// Adapts a synchronous closure into a [`Reaction`]
pub struct FnReaction<F> {
    name: String,
    f: F,
}

impl<F> FnReaction<F>
where
    F: Fn(&mut Claim, &ClaimStateMachine) -> Result<(), ClaimError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

#[async_trait]
impl<F> Reaction for FnReaction<F>
where
    F: Fn(&mut Claim, &ClaimStateMachine) -> Result<(), ClaimError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn react(&self, claim: &mut Claim, machine: &ClaimStateMachine) -> Result<(), ClaimError> {
        (self.f)(claim, machine)
    }
}

/// Runs the risk fan-out and routes flagged claims through investigation
///
/// Registered on `UnderReview` by default. Each evaluator outcome is written
/// to the audit log. If the fan-out fails the claim is left untouched.
#[derive(Debug, Clone)]
pub struct RiskEvaluationReaction {
    fan_out: EvaluationFanOut,
}

impl RiskEvaluationReaction {
    pub fn new(fan_out: EvaluationFanOut) -> Self {
        Self { fan_out }
    }
}

#[async_trait]
impl Reaction for RiskEvaluationReaction {
    fn name(&self) -> &str {
        "risk-evaluation"
    }

    async fn react(&self, claim: &mut Claim, machine: &ClaimStateMachine) -> Result<(), ClaimError> {
        let verdict = self.fan_out.evaluate(claim).await?;

        for outcome in &verdict.outcomes {
            claim.add_audit_entry(
                outcome.evaluator.clone(),
                if outcome.flagged { "FLAGGED" } else { "CLEARED" },
                outcome.reason.clone(),
                Some(outcome.confidence),
            );
        }

        if verdict.requires_investigation {
            warn!(claim_id = %claim.id(), "Claim flagged for investigation");
            claim.requires_investigation = true;
            machine.insert_state(claim, ClaimState::FraudInvestigation, ClaimState::Assessment)?;
        } else {
            info!(claim_id = %claim.id(), "Claim passed evaluation");
        }
        Ok(())
    }
}

/// Registry of reactions keyed by the state that triggers them
#[derive(Clone)]
pub struct EventDispatcher {
    machine: ClaimStateMachine,
    reactions: HashMap<ClaimState, Vec<Arc<dyn Reaction>>>,
}

impl EventDispatcher {
    /// Dispatcher with the risk evaluation reaction bound to `UnderReview`
    pub fn new(machine: ClaimStateMachine, fan_out: EvaluationFanOut) -> Self {
        let mut dispatcher = Self::without_default_reactions(machine);
        dispatcher.register(ClaimState::UnderReview, RiskEvaluationReaction::new(fan_out));
        dispatcher
    }

    /// Dispatcher with no reactions registered
    pub fn without_default_reactions(machine: ClaimStateMachine) -> Self {
        Self {
            machine,
            reactions: HashMap::new(),
        }
    }

    pub fn machine(&self) -> &ClaimStateMachine {
        &self.machine
    }

    /// Appends `reaction` to the list for `state`
    pub fn register(&mut self, state: ClaimState, reaction: impl Reaction + 'static) {
        self.register_shared(state, Arc::new(reaction));
    }

    pub fn register_shared(&mut self, state: ClaimState, reaction: Arc<dyn Reaction>) {
        info!(%state, reaction = reaction.name(), "Registered reaction");
        self.reactions.entry(state).or_default().push(reaction);
    }

    /// Names of the reactions for `state`, in execution order
    pub fn reaction_names(&self, state: ClaimState) -> Vec<&str> {
        self.reactions
            .get(&state)
            .map(|list| list.iter().map(|r| r.name()).collect())
            .unwrap_or_default()
    }

    /// Runs every reaction registered for `state`, in order
    ///
    /// Stops at the first failing reaction; earlier reactions' changes stay
    /// applied to `claim`.
    pub async fn on_entered(&self, claim: &mut Claim, state: ClaimState) -> Result<(), ClaimError> {
        let Some(reactions) = self.reactions.get(&state) else {
            return Ok(());
        };
        for reaction in reactions {
            reaction.react(claim, &self.machine).await?;
        }
        Ok(())
    }

    /// Advances along the workflow and fires reactions for the entered state
    ///
    /// The move and its reactions commit together: if any reaction fails,
    /// `claim` is left exactly as it was before the call.
    pub async fn advance_with_reactions(&self, claim: &mut Claim) -> Result<ClaimState, ClaimError> {
        let mut working = claim.clone();
        let entered = self.machine.advance(&mut working)?;
        self.on_entered(&mut working, entered).await?;
        *claim = working;
        Ok(entered)
    }

    /// Moves to an explicit `target` and fires its reactions
    ///
    /// Commits all or nothing, like [`advance_with_reactions`](Self::advance_with_reactions).
    pub async fn transition_with_reactions(
        &self,
        claim: &mut Claim,
        target: ClaimState,
    ) -> Result<(), ClaimError> {
        let mut working = claim.clone();
        self.machine.transition(&mut working, target)?;
        self.on_entered(&mut working, target).await?;
        *claim = working;
        Ok(())
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registered: HashMap<_, _> = self
            .reactions
            .keys()
            .map(|state| (*state, self.reaction_names(*state)))
            .collect();
        f.debug_struct("EventDispatcher")
            .field("reactions", &registered)
            .finish()
    }
}
