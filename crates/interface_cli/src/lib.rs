//! Claims Orchestrator CLI
//!
//! Builds the in-memory claims service from configuration and runs a
//! scripted cycle over it.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_cli::{build_service, config::OrchestratorConfig, scenario};
//!
//! let service = build_service(&OrchestratorConfig::default());
//! let reports = scenario::run(&service).await?;
//! ```

pub mod config;
pub mod scenario;

use domain_claims::{ClaimService, ClaimStateMachine, EvaluationFanOut, EventDispatcher, ResultAggregator};

use crate::config::OrchestratorConfig;

/// Wires the standard evaluators, reactions and aggregator over an in-memory store
pub fn build_service(config: &OrchestratorConfig) -> ClaimService {
    let dispatcher = EventDispatcher::new(
        ClaimStateMachine::new(),
        EvaluationFanOut::standard(config.amount_threshold),
    );
    let aggregator = ResultAggregator::new(config.aggregator_config());
    ClaimService::in_memory(dispatcher, aggregator)
}
