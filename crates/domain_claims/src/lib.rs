//! Claims Orchestration Domain
//!
//! This crate routes insurance claims through a fixed workflow graph, with
//! an investigation step that is inserted at runtime when risk evaluation or
//! fraud analysis flags a claim.
//!
//! # Claim Workflow
//!
//! ```text
//! SUBMITTED -> UNDER_REVIEW -> ASSESSMENT -> FINAL_DECISION
//!                   |               ^
//!                   +-> FRAUD_INVESTIGATION
//! ```
//!
//! Entering `UNDER_REVIEW` fires the risk evaluation reaction, which runs all
//! evaluators concurrently and queues `FRAUD_INVESTIGATION` if any of them
//! flags the claim.

pub mod state;
pub mod claim;
pub mod machine;
pub mod evaluation;
pub mod dispatcher;
pub mod orchestrator;
pub mod review;
pub mod store;
pub mod service;
pub mod error;

pub use state::ClaimState;
pub use claim::{AuditLogEntry, Claim, NewClaim, PendingStates};
pub use machine::ClaimStateMachine;
pub use evaluation::{
    AmountScreeningEvaluator, CrossValidationEvaluator, EvaluationFanOut, EvaluationOutcome,
    EvaluatorError, EvaluatorFault, FanOutVerdict, RiskEvaluator, DEFAULT_AMOUNT_THRESHOLD,
};
pub use dispatcher::{EventDispatcher, FnReaction, Reaction, RiskEvaluationReaction};
pub use orchestrator::{AggregatedDecision, AggregatorConfig, ResultAggregator, TextAnalysis, VisionAnalysis};
pub use review::{ReviewAction, ReviewOutcome};
pub use store::{ClaimHandle, ClaimStore, InMemoryClaimStore};
pub use service::{AnalysisReport, AnalysisRequest, ClaimHistory, ClaimService, ClaimUpdate, ClaimsSummary};
pub use error::ClaimError;
