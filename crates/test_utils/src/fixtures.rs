//! Pre-built Test Fixtures
//!
//! Ready-to-use intake data and producer results. Values are fixed so that
//! assertions on scores and reasons stay predictable.

use domain_claims::{NewClaim, TextAnalysis, VisionAnalysis};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for claim intake data
pub struct ClaimFixtures;

impl ClaimFixtures {
    /// Small claim that passes every default evaluator
    pub fn routine() -> NewClaim {
        NewClaim::new(
            "Jordan Reyes",
            Self::routine_amount(),
            "Rear bumper dented while parked at the supermarket",
        )
    }

    /// Claim above the default screening threshold
    pub fn high_value() -> NewClaim {
        NewClaim::new(
            "Morgan Blake",
            Self::high_amount(),
            "Vehicle destroyed in garage fire",
        )
    }

    /// Low-value claim pre-flagged at intake
    pub fn pre_flagged() -> NewClaim {
        NewClaim {
            requires_investigation: true,
            ..NewClaim::new("Casey Moore", dec!(1800), "Phone stolen on the train")
        }
    }

    /// Claim with a call transcript attached
    pub fn with_call_log() -> NewClaim {
        NewClaim {
            call_log: Some(
                "Caller said the accident happened at night in heavy rain on the highway.".to_string(),
            ),
            ..NewClaim::new(
                "Riley Shah",
                dec!(12000),
                "Collision on a sunny afternoon in a parking lot",
            )
        }
    }

    pub fn routine_amount() -> Decimal {
        dec!(2500)
    }

    pub fn high_amount() -> Decimal {
        dec!(75000)
    }
}

/// Fixture for vision producer results
pub struct VisionFixtures;

impl VisionFixtures {
    /// Confident mismatch between photo and description
    pub fn confident_mismatch() -> VisionAnalysis {
        VisionAnalysis {
            detected_damage: "Rear-end impact".to_string(),
            mismatch_found: true,
            confidence: 0.85,
            reasoning: "Photo shows rear damage but the claim describes a front collision".to_string(),
        }
    }

    /// Mismatch reported with low confidence
    pub fn uncertain_mismatch() -> VisionAnalysis {
        VisionAnalysis {
            confidence: 0.6,
            ..Self::confident_mismatch()
        }
    }

    /// Photo consistent with the description
    pub fn consistent() -> VisionAnalysis {
        VisionAnalysis {
            detected_damage: "Dented rear bumper".to_string(),
            mismatch_found: false,
            confidence: 0.92,
            reasoning: "Visible damage matches the description".to_string(),
        }
    }
}

/// Fixture for text producer results
pub struct TextFixtures;

impl TextFixtures {
    /// High inconsistency with four contradictions
    pub fn suspicious() -> TextAnalysis {
        TextAnalysis {
            inconsistency_score: 8,
            contradictions: vec![
                "Weather: rain on the call, sunny in writing".to_string(),
                "Time: night on the call, afternoon in writing".to_string(),
                "Location: highway on the call, parking lot in writing".to_string(),
                "Speed: fast on the call, slow in writing".to_string(),
            ],
            verdict: "SUSPICIOUS".to_string(),
            reasoning: "Multiple factual contradictions".to_string(),
        }
    }

    /// Low inconsistency
    pub fn consistent() -> TextAnalysis {
        TextAnalysis {
            inconsistency_score: 2,
            contradictions: Vec::new(),
            verdict: "CONSISTENT".to_string(),
            reasoning: "Statements agree".to_string(),
        }
    }

    /// Exactly on the default flagging threshold
    pub fn borderline() -> TextAnalysis {
        TextAnalysis {
            inconsistency_score: 5,
            contradictions: vec!["Time of day differs".to_string()],
            verdict: "SUSPICIOUS".to_string(),
            reasoning: "One contradiction".to_string(),
        }
    }
}
