//! Claim states and the static transition graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing stage a claim occupies
///
/// Declaration order doubles as the deterministic ordering used whenever a
/// set of states has to be reduced to one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimState {
    /// Claim received, nothing evaluated yet
    #[default]
    Submitted,
    /// Automated risk evaluation runs on entry
    UnderReview,
    /// Detour state, only reachable through dynamic insertion
    FraudInvestigation,
    /// Loss assessment
    Assessment,
    /// Terminal
    FinalDecision,
}

impl ClaimState {
    /// Every state, in declaration order
    pub const ALL: [ClaimState; 5] = [
        ClaimState::Submitted,
        ClaimState::UnderReview,
        ClaimState::FraudInvestigation,
        ClaimState::Assessment,
        ClaimState::FinalDecision,
    ];

    /// States directly reachable from `self` in the static graph
    pub fn successors(self) -> &'static [ClaimState] {
        use ClaimState::*;
        match self {
            Submitted => &[UnderReview],
            UnderReview => &[Assessment, FraudInvestigation],
            FraudInvestigation => &[Assessment],
            Assessment => &[FinalDecision],
            FinalDecision => &[],
        }
    }

    /// Whether the static graph has an edge `self -> target`
    pub fn leads_to(self, target: ClaimState) -> bool {
        self.successors().contains(&target)
    }

    /// True for the state with no outgoing edges
    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    /// True for states the default flow never selects on its own
    pub fn is_detour(self) -> bool {
        matches!(self, ClaimState::FraudInvestigation)
    }

    /// Wire name, e.g. `UNDER_REVIEW`
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimState::Submitted => "SUBMITTED",
            ClaimState::UnderReview => "UNDER_REVIEW",
            ClaimState::FraudInvestigation => "FRAUD_INVESTIGATION",
            ClaimState::Assessment => "ASSESSMENT",
            ClaimState::FinalDecision => "FINAL_DECISION",
        }
    }
}

impl fmt::Display for ClaimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
