//! Test Data Builders
//!
//! Builder patterns for claims. Tests set only the fields they care about
//! and take defaults for the rest.

use domain_claims::{Claim, ClaimState, ClaimStateMachine, NewClaim};
use rust_decimal::Decimal;

use crate::fixtures::ClaimFixtures;

/// Builder for claims, optionally already moved along the workflow
pub struct TestClaimBuilder {
    intake: NewClaim,
    path: Vec<ClaimState>,
    inserted: Vec<(ClaimState, ClaimState)>,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    /// Starts from the routine claim fixture
    pub fn new() -> Self {
        Self {
            intake: ClaimFixtures::routine(),
            path: Vec::new(),
            inserted: Vec::new(),
        }
    }

    pub fn with_claimant(mut self, name: impl Into<String>) -> Self {
        self.intake.claimant_name = name.into();
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.intake.amount = amount;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.intake.description = description.into();
        self
    }

    pub fn with_call_log(mut self, call_log: impl Into<String>) -> Self {
        self.intake.call_log = Some(call_log.into());
        self
    }

    /// Pre-flags the claim for investigation
    pub fn flagged(mut self) -> Self {
        self.intake.requires_investigation = true;
        self
    }

    /// Inserts `state` before `before` once the path has been walked
    pub fn with_inserted(mut self, state: ClaimState, before: ClaimState) -> Self {
        self.inserted.push((state, before));
        self
    }

    /// Transitions through `states` in order after submission
    ///
    /// Reactions are not fired.
    pub fn through(mut self, states: &[ClaimState]) -> Self {
        self.path.extend_from_slice(states);
        self
    }

    pub fn build_intake(self) -> NewClaim {
        self.intake
    }

    /// Builds the claim
    ///
    /// # Panics
    ///
    /// Panics if the intake data is invalid or the path is not legal.
    pub fn build(self) -> Claim {
        let machine = ClaimStateMachine::new();
        let mut claim = Claim::submit(self.intake).expect("test intake should be valid");
        for state in self.path {
            machine
                .transition(&mut claim, state)
                .expect("test path should follow the workflow");
        }
        for (state, before) in self.inserted {
            machine
                .insert_state(&mut claim, state, before)
                .expect("test insertion should be supported");
        }
        claim
    }
}
