//! Scripted risk evaluators
//!
//! Evaluators whose outcome is fixed up front, with optional delay and call
//! counting, for exercising the fan-out without real heuristics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain_claims::{Claim, EvaluationOutcome, EvaluatorError, RiskEvaluator};

/// Returns a fixed outcome after an optional delay
#[derive(Debug, Clone)]
pub struct ScriptedEvaluator {
    name: String,
    flagged: bool,
    confidence: f64,
    reason: String,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl ScriptedEvaluator {
    /// Evaluator that flags every claim
    pub fn flagging(name: impl Into<String>) -> Self {
        Self::new(name, true, 0.9, "Scripted flag")
    }

    /// Evaluator that clears every claim
    pub fn clearing(name: impl Into<String>) -> Self {
        Self::new(name, false, 0.8, "Scripted clear")
    }

    pub fn new(name: impl Into<String>, flagged: bool, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flagged,
            confidence,
            reason: reason.into(),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared counter incremented once per completed evaluation
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl RiskEvaluator for ScriptedEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, _claim: &Claim) -> Result<EvaluationOutcome, EvaluatorError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(EvaluationOutcome {
            evaluator: self.name.clone(),
            flagged: self.flagged,
            confidence: self.confidence,
            reason: self.reason.clone(),
        })
    }
}

/// Always fails with the given message
#[derive(Debug, Clone)]
pub struct FailingEvaluator {
    name: String,
    message: String,
}

impl FailingEvaluator {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl RiskEvaluator for FailingEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, _claim: &Claim) -> Result<EvaluationOutcome, EvaluatorError> {
        Err(EvaluatorError::new(self.message.clone()))
    }
}
