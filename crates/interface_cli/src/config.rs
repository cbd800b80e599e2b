//! Orchestrator configuration

use domain_claims::{AggregatorConfig, DEFAULT_AMOUNT_THRESHOLD};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Orchestrator configuration
///
/// Every field can be set through a `CLAIMS_`-prefixed environment variable;
/// unset fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Log level
    pub log_level: String,
    /// Claims above this amount are flagged during review
    pub amount_threshold: Decimal,
    pub vision_confident_weight: f64,
    pub vision_uncertain_weight: f64,
    pub vision_confidence_cutoff: f64,
    pub vision_clear_weight: f64,
    /// Text inconsistency scores at or above this flag the claim
    pub text_threshold: u8,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        let aggregator = AggregatorConfig::default();
        Self {
            log_level: "info".to_string(),
            amount_threshold: DEFAULT_AMOUNT_THRESHOLD,
            vision_confident_weight: aggregator.vision_confident_weight,
            vision_uncertain_weight: aggregator.vision_uncertain_weight,
            vision_confidence_cutoff: aggregator.vision_confidence_cutoff,
            vision_clear_weight: aggregator.vision_clear_weight,
            text_threshold: aggregator.text_threshold,
        }
    }
}

impl OrchestratorConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::with_prefix("CLAIMS"))
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let loaded: Self = config::Config::builder()
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        let weights = [
            ("vision_confident_weight", self.vision_confident_weight),
            ("vision_uncertain_weight", self.vision_uncertain_weight),
            ("vision_confidence_cutoff", self.vision_confidence_cutoff),
            ("vision_clear_weight", self.vision_clear_weight),
        ];
        if let Some((name, value)) = weights.iter().find(|(_, v)| !(0.0..=1.0).contains(v)) {
            return Err(config::ConfigError::Message(format!(
                "{name} must be within [0, 1], got {value}"
            )));
        }
        if self.text_threshold > domain_claims::TextAnalysis::MAX_SCORE {
            return Err(config::ConfigError::Message(format!(
                "text_threshold must be at most {}, got {}",
                domain_claims::TextAnalysis::MAX_SCORE,
                self.text_threshold
            )));
        }
        if self.amount_threshold.is_sign_negative() {
            return Err(config::ConfigError::Message(
                "amount_threshold must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Aggregator weights, with the remaining knobs at their defaults
    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            vision_confident_weight: self.vision_confident_weight,
            vision_uncertain_weight: self.vision_uncertain_weight,
            vision_confidence_cutoff: self.vision_confidence_cutoff,
            vision_clear_weight: self.vision_clear_weight,
            text_threshold: self.text_threshold,
            ..AggregatorConfig::default()
        }
    }
}
