//! Multi-producer fraud aggregation
//!
//! Combines the optional outputs of the vision and text producers into one
//! decision. Each producer is judged on its own; the composite score is the
//! maximum contribution so an absent or weak producer never dilutes a strong
//! signal, and investigation is required if any producer flags.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::claim::Claim;
use crate::error::ClaimError;
use crate::machine::ClaimStateMachine;
use crate::state::ClaimState;

/// Photo-versus-description comparison
///
/// Deserialization rejects a confidence outside `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VisionAnalysisFields")]
pub struct VisionAnalysis {
    pub detected_damage: String,
    pub mismatch_found: bool,
    /// In `[0, 1]`
    pub confidence: f64,
    pub reasoning: String,
}

impl VisionAnalysis {
    pub fn validate(&self) -> Result<(), ClaimError> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ClaimError::validation(format!(
                "vision confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct VisionAnalysisFields {
    #[serde(default)]
    detected_damage: String,
    mismatch_found: bool,
    confidence: f64,
    #[serde(default)]
    reasoning: String,
}

impl TryFrom<VisionAnalysisFields> for VisionAnalysis {
    type Error = ClaimError;

    fn try_from(fields: VisionAnalysisFields) -> Result<Self, Self::Error> {
        let analysis = Self {
            detected_damage: fields.detected_damage,
            mismatch_found: fields.mismatch_found,
            confidence: fields.confidence,
            reasoning: fields.reasoning,
        };
        analysis.validate()?;
        Ok(analysis)
    }
}

/// Call-log-versus-written-claim comparison
///
/// Deserialization rejects scores above [`TextAnalysis::MAX_SCORE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TextAnalysisFields")]
pub struct TextAnalysis {
    /// 0 (consistent) to 10 (highly suspicious)
    pub inconsistency_score: u8,
    pub contradictions: Vec<String>,
    pub verdict: String,
    pub reasoning: String,
}

impl TextAnalysis {
    pub const MAX_SCORE: u8 = 10;

    /// Builds a text result, rejecting scores above 10
    pub fn new(
        inconsistency_score: u8,
        contradictions: Vec<String>,
        verdict: impl Into<String>,
        reasoning: impl Into<String>,
    ) -> Result<Self, ClaimError> {
        let analysis = Self {
            inconsistency_score,
            contradictions,
            verdict: verdict.into(),
            reasoning: reasoning.into(),
        };
        analysis.validate()?;
        Ok(analysis)
    }

    pub fn validate(&self) -> Result<(), ClaimError> {
        if self.inconsistency_score > Self::MAX_SCORE {
            return Err(ClaimError::validation(format!(
                "inconsistency score {} exceeds {}",
                self.inconsistency_score,
                Self::MAX_SCORE
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct TextAnalysisFields {
    inconsistency_score: u8,
    #[serde(default)]
    contradictions: Vec<String>,
    verdict: String,
    #[serde(default)]
    reasoning: String,
}

impl TryFrom<TextAnalysisFields> for TextAnalysis {
    type Error = ClaimError;

    fn try_from(fields: TextAnalysisFields) -> Result<Self, Self::Error> {
        Self::new(
            fields.inconsistency_score,
            fields.contradictions,
            fields.verdict,
            fields.reasoning,
        )
    }
}

/// Score weights and thresholds
///
/// Defaults are the business values in production today. They have no
/// documented derivation and are kept configurable pending product review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Contribution of a vision mismatch above the confidence cutoff
    pub vision_confident_weight: f64,
    /// Contribution of a vision mismatch at or below the cutoff
    pub vision_uncertain_weight: f64,
    pub vision_confidence_cutoff: f64,
    /// Contribution of a vision result without mismatch
    pub vision_clear_weight: f64,
    /// Text scores at or above this flag the claim
    pub text_threshold: u8,
    pub text_flagged_divisor: f64,
    pub text_clear_divisor: f64,
    /// How many contradictions are copied into the reasons
    pub max_contradictions: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            vision_confident_weight: 0.8,
            vision_uncertain_weight: 0.5,
            vision_confidence_cutoff: 0.7,
            vision_clear_weight: 0.1,
            text_threshold: 5,
            text_flagged_divisor: 10.0,
            text_clear_divisor: 20.0,
            max_contradictions: 3,
        }
    }
}

/// Combined decision over whichever producers ran
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedDecision {
    pub requires_investigation: bool,
    /// In `[0, 1]`
    pub fraud_score: f64,
    pub vision_flagged: bool,
    pub text_flagged: bool,
    pub reasons: Vec<String>,
    pub summary: String,
}

/// Merges producer results into an [`AggregatedDecision`]
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    config: AggregatorConfig,
}

impl ResultAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn aggregate(
        &self,
        vision: Option<&VisionAnalysis>,
        text: Option<&TextAnalysis>,
    ) -> AggregatedDecision {
        let cfg = &self.config;
        let mut reasons = Vec::new();
        let mut contributions = Vec::with_capacity(2);
        let mut producers = Vec::with_capacity(2);

        let vision_flagged = vision.is_some_and(|v| v.mismatch_found);
        if let Some(v) = vision {
            if vision_flagged {
                reasons.push(format!("Vision Agent: {}", v.reasoning));
                contributions.push(if v.confidence > cfg.vision_confidence_cutoff {
                    cfg.vision_confident_weight
                } else {
                    cfg.vision_uncertain_weight
                });
            } else {
                contributions.push(cfg.vision_clear_weight);
            }
            producers.push(format!("Vision({})", flag_label(vision_flagged)));
        }

        let text_flagged = text.is_some_and(|t| t.inconsistency_score >= cfg.text_threshold);
        if let Some(t) = text {
            let score = f64::from(t.inconsistency_score.min(TextAnalysis::MAX_SCORE));
            if text_flagged {
                reasons.push(format!(
                    "Text Agent: {} (score: {}/{})",
                    t.verdict,
                    t.inconsistency_score,
                    TextAnalysis::MAX_SCORE
                ));
                reasons.extend(
                    t.contradictions
                        .iter()
                        .take(cfg.max_contradictions)
                        .map(|c| format!("  - {c}")),
                );
                contributions.push(score / cfg.text_flagged_divisor);
            } else {
                contributions.push(score / cfg.text_clear_divisor);
            }
            producers.push(format!("Text({})", flag_label(text_flagged)));
        }

        let fraud_score = contributions
            .into_iter()
            .fold(0.0_f64, f64::max)
            .clamp(0.0, 1.0);
        let requires_investigation = vision_flagged || text_flagged;

        let summary = if requires_investigation {
            format!(
                "Agents: {}. FRAUD INVESTIGATION REQUIRED. Score: {fraud_score:.2}",
                producers.join(", ")
            )
        } else {
            format!(
                "Agents: {}. No suspicious activity detected. Score: {fraud_score:.2}",
                producers.join(", ")
            )
        };

        info!(requires_investigation, fraud_score, "Orchestrator decision");

        AggregatedDecision {
            requires_investigation,
            fraud_score,
            vision_flagged,
            text_flagged,
            reasons,
            summary,
        }
    }

    /// Flags `claim` and routes it through investigation when required
    ///
    /// Uses the same insertion as the review-time risk reaction, so applying a
    /// positive decision to a claim that is already routed is a no-op.
    pub fn apply(
        &self,
        machine: &ClaimStateMachine,
        claim: &mut Claim,
        decision: &AggregatedDecision,
    ) -> Result<(), ClaimError> {
        if !decision.requires_investigation {
            return Ok(());
        }
        warn!(
            claim_id = %claim.id(),
            fraud_score = decision.fraud_score,
            "Fraud signals detected by analysis producers"
        );
        claim.requires_investigation = true;
        claim.touch();

        // Terminal claims keep the flag but are never reopened by routing.
        if claim.is_terminal() || claim.current_state() == ClaimState::FraudInvestigation {
            return Ok(());
        }
        machine.insert_state(claim, ClaimState::FraudInvestigation, ClaimState::Assessment)?;
        Ok(())
    }
}

fn flag_label(flagged: bool) -> &'static str {
    if flagged { "flagged" } else { "clear" }
}
