//! Property-Based Test Generators
//!
//! Proptest strategies for claims, producer results and workflow operations.

use domain_claims::{ClaimState, NewClaim, TextAnalysis, VisionAnalysis};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Any workflow state
pub fn claim_state_strategy() -> impl Strategy<Value = ClaimState> {
    proptest::sample::select(ClaimState::ALL.to_vec())
}

/// Positive claim amounts with two decimal places
pub fn claim_amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..20_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Valid intake data
pub fn new_claim_strategy() -> impl Strategy<Value = NewClaim> {
    ("[A-Z][a-z]{2,10} [A-Z][a-z]{2,10}", claim_amount_strategy(), "[a-z ]{5,40}", any::<bool>())
        .prop_map(|(name, amount, description, flagged)| NewClaim {
            requires_investigation: flagged,
            ..NewClaim::new(name, amount, format!("Damage: {description}"))
        })
}

/// Vision results across the confidence range
pub fn vision_analysis_strategy() -> impl Strategy<Value = VisionAnalysis> {
    (any::<bool>(), 0.0f64..=1.0f64).prop_map(|(mismatch_found, confidence)| VisionAnalysis {
        detected_damage: "Generated damage".to_string(),
        mismatch_found,
        confidence,
        reasoning: "Generated reasoning".to_string(),
    })
}

/// Text results with scores in `0..=10` and up to five contradictions
pub fn text_analysis_strategy() -> impl Strategy<Value = TextAnalysis> {
    (0u8..=TextAnalysis::MAX_SCORE, proptest::collection::vec("[a-z]{3,12}", 0..5)).prop_map(
        |(score, contradictions)| TextAnalysis {
            inconsistency_score: score,
            contradictions,
            verdict: if score >= 5 { "SUSPICIOUS" } else { "CONSISTENT" }.to_string(),
            reasoning: String::new(),
        },
    )
}

/// One step applied to a claim in a random workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOp {
    Advance,
    Transition(ClaimState),
    Insert { state: ClaimState, before: ClaimState },
}

pub fn workflow_op_strategy() -> impl Strategy<Value = WorkflowOp> {
    prop_oneof![
        3 => Just(WorkflowOp::Advance),
        1 => claim_state_strategy().prop_map(WorkflowOp::Transition),
        2 => (claim_state_strategy(), claim_state_strategy())
            .prop_map(|(state, before)| WorkflowOp::Insert { state, before }),
    ]
}

pub fn workflow_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<WorkflowOp>> {
    proptest::collection::vec(workflow_op_strategy(), 0..max_len)
}
