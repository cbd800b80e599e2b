//! Claims Orchestrator - Scripted Cycle Binary
//!
//! Runs a scripted claims cycle against the in-memory service and prints
//! each claim's routing history as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-orchestrator
//!
//! # Lower the screening threshold and log every transition detail
//! CLAIMS_AMOUNT_THRESHOLD=10000 RUST_LOG=debug cargo run --bin claims-orchestrator
//! ```
//!
//! # Environment Variables
//!
//! * `CLAIMS_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `CLAIMS_AMOUNT_THRESHOLD` - Amount above which claims are flagged (default: 50000)
//! * `CLAIMS_TEXT_THRESHOLD` - Text inconsistency score that flags a claim (default: 5)
//! * `CLAIMS_VISION_CONFIDENT_WEIGHT`, `CLAIMS_VISION_UNCERTAIN_WEIGHT`,
//!   `CLAIMS_VISION_CONFIDENCE_CUTOFF`, `CLAIMS_VISION_CLEAR_WEIGHT` - Vision score weights
//!
//! An unparsable or out-of-range value aborts startup with the offending key.

use anyhow::Context;
use interface_cli::{build_service, config::OrchestratorConfig, scenario};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = OrchestratorConfig::from_env().context("invalid CLAIMS_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        amount_threshold = %config.amount_threshold,
        text_threshold = config.text_threshold,
        "Starting claims orchestrator"
    );

    let service = build_service(&config);
    let reports = scenario::run(&service)
        .await
        .context("scripted claims cycle failed")?;

    println!("{}", serde_json::to_string_pretty(&reports)?);

    let summary = service.summary().await?;
    tracing::info!(
        total_claims = summary.total_claims,
        fraud_flagged = summary.fraud_flagged,
        "Cycle complete"
    );
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
