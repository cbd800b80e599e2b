//! Concurrent risk evaluation
//!
//! Runs every registered evaluator against the same claim snapshot and joins
//! all of them before deciding. The verdict is a logical OR over the flags;
//! every outcome is kept for explainability even after the first flag.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::claim::Claim;
use crate::error::ClaimError;

/// Output of a single risk evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub evaluator: String,
    pub flagged: bool,
    /// In `[0, 1]`
    pub confidence: f64,
    pub reason: String,
}

/// Failure reported by an evaluator
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct EvaluatorError {
    pub message: String,
}

impl EvaluatorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// An evaluator that did not produce a usable outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorFault {
    pub evaluator: String,
    pub message: String,
}

/// Independent risk check run during review
///
/// Implementations receive a shared reference and must not rely on seeing
/// other evaluators' effects.
#[async_trait]
pub trait RiskEvaluator: Send + Sync {
    fn name(&self) -> &str;

    async fn evaluate(&self, claim: &Claim) -> Result<EvaluationOutcome, EvaluatorError>;
}

/// Combined result of a fan-out run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanOutVerdict {
    pub requires_investigation: bool,
    /// In evaluator registration order
    pub outcomes: Vec<EvaluationOutcome>,
}

impl FanOutVerdict {
    pub fn flagged_by(&self) -> impl Iterator<Item = &EvaluationOutcome> {
        self.outcomes.iter().filter(|o| o.flagged)
    }
}

/// Fixed set of evaluators run concurrently per claim
#[derive(Clone, Default)]
pub struct EvaluationFanOut {
    evaluators: Vec<Arc<dyn RiskEvaluator>>,
}

impl EvaluationFanOut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount screening and cross validation
    pub fn standard(amount_threshold: Decimal) -> Self {
        Self::new()
            .with_evaluator(AmountScreeningEvaluator::new(amount_threshold))
            .with_evaluator(CrossValidationEvaluator)
    }

    pub fn with_evaluator(self, evaluator: impl RiskEvaluator + 'static) -> Self {
        self.with_shared_evaluator(Arc::new(evaluator))
    }

    /// Adds an evaluator that may also be registered on other fan-outs
    pub fn with_shared_evaluator(mut self, evaluator: Arc<dyn RiskEvaluator>) -> Self {
        self.evaluators.push(evaluator);
        self
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    pub fn evaluator_names(&self) -> Vec<&str> {
        self.evaluators.iter().map(|e| e.name()).collect()
    }

    /// Runs all evaluators to completion and ORs their flags
    ///
    /// A failing evaluator never cancels its siblings. If any evaluator fails
    /// (or reports a confidence outside `[0, 1]`) the whole run fails with
    /// [`ClaimError::EvaluatorFailure`], carrying the completed outcomes.
    pub async fn evaluate(&self, claim: &Claim) -> Result<FanOutVerdict, ClaimError> {
        info!(
            claim_id = %claim.id(),
            evaluators = self.evaluators.len(),
            "Starting risk evaluation"
        );

        let runs = self.evaluators.iter().map(|evaluator| async move {
            let result = evaluator.evaluate(claim).await;
            (evaluator.name().to_string(), result)
        });
        let results = join_all(runs).await;

        let mut outcomes = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (name, result) in results {
            match result {
                Ok(outcome) if (0.0..=1.0).contains(&outcome.confidence) => {
                    debug!(
                        claim_id = %claim.id(),
                        evaluator = %outcome.evaluator,
                        flagged = outcome.flagged,
                        confidence = outcome.confidence,
                        reason = %outcome.reason,
                        "Evaluator finished"
                    );
                    outcomes.push(outcome);
                }
                Ok(outcome) => {
                    warn!(claim_id = %claim.id(), evaluator = %name, confidence = outcome.confidence, "Confidence out of range");
                    failures.push(EvaluatorFault {
                        evaluator: name,
                        message: format!("confidence {} outside [0, 1]", outcome.confidence),
                    });
                }
                Err(e) => {
                    warn!(claim_id = %claim.id(), evaluator = %name, error = %e, "Evaluator failed");
                    failures.push(EvaluatorFault {
                        evaluator: name,
                        message: e.message,
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Err(ClaimError::EvaluatorFailure {
                failures,
                completed: outcomes,
            });
        }

        let requires_investigation = outcomes.iter().fold(false, |acc, o| acc | o.flagged);

        info!(
            claim_id = %claim.id(),
            requires_investigation,
            "Risk evaluation complete"
        );
        Ok(FanOutVerdict {
            requires_investigation,
            outcomes,
        })
    }
}

impl std::fmt::Debug for EvaluationFanOut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationFanOut")
            .field("evaluators", &self.evaluator_names())
            .finish()
    }
}

/// Default amount above which a claim is screened for fraud
pub const DEFAULT_AMOUNT_THRESHOLD: Decimal = dec!(50000);

/// Flags high-value claims and claims already marked for investigation
#[derive(Debug, Clone)]
pub struct AmountScreeningEvaluator {
    threshold: Decimal,
}

impl AmountScreeningEvaluator {
    pub fn new(threshold: Decimal) -> Self {
        Self { threshold }
    }
}

impl Default for AmountScreeningEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_AMOUNT_THRESHOLD)
    }
}

#[async_trait]
impl RiskEvaluator for AmountScreeningEvaluator {
    fn name(&self) -> &str {
        "Agent Alpha"
    }

    async fn evaluate(&self, claim: &Claim) -> Result<EvaluationOutcome, EvaluatorError> {
        let high_amount = claim.amount > self.threshold;
        let flagged = high_amount || claim.requires_investigation;

        let reason = if high_amount {
            "High claim amount detected"
        } else if claim.requires_investigation {
            "Investigation flag set"
        } else {
            "No anomalies detected"
        };

        Ok(EvaluationOutcome {
            evaluator: self.name().to_string(),
            flagged,
            confidence: if flagged { 0.85 } else { 0.75 },
            reason: reason.to_string(),
        })
    }
}

/// Re-checks the claim's existing investigation flag
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossValidationEvaluator;

#[async_trait]
impl RiskEvaluator for CrossValidationEvaluator {
    fn name(&self) -> &str {
        "Agent Beta"
    }

    async fn evaluate(&self, claim: &Claim) -> Result<EvaluationOutcome, EvaluatorError> {
        let flagged = claim.requires_investigation;
        Ok(EvaluationOutcome {
            evaluator: self.name().to_string(),
            flagged,
            confidence: if flagged { 0.90 } else { 0.80 },
            reason: if flagged {
                "Cross-validation flagged for review".to_string()
            } else {
                "Cross-validation passed".to_string()
            },
        })
    }
}
