//! Scripted end-to-end cycle
//!
//! Drives three claims through the service: a routine claim, a high-value
//! claim that is cleared by an operator during investigation, and a claim
//! that producer analysis routes to investigation before it is rejected.

use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::info;

use core_kernel::ClaimId;
use domain_claims::{
    AnalysisRequest, ClaimError, ClaimHistory, ClaimService, ClaimState, NewClaim, TextAnalysis,
    VisionAnalysis,
};

pub const REVIEW_OPERATOR: &str = "claims-desk";

/// Final view of one scripted claim
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub label: String,
    pub history: ClaimHistory,
    pub requires_investigation: bool,
    pub human_override: Option<String>,
    pub audit_entries: usize,
}

pub async fn run(service: &ClaimService) -> Result<Vec<ScenarioReport>, ClaimError> {
    let mut reports = Vec::with_capacity(3);

    let routine = service
        .create(NewClaim::new(
            "Jordan Reyes",
            dec!(1000),
            "Rear bumper dented while parked",
        ))
        .await?;
    finish(service, routine.id()).await?;
    reports.push(report(service, "routine", routine.id()).await?);

    let high_value = service
        .create(NewClaim::new(
            "Morgan Blake",
            dec!(60000),
            "Vehicle destroyed in garage fire",
        ))
        .await?;
    advance_until(service, high_value.id(), ClaimState::FraudInvestigation).await?;
    service
        .approve(high_value.id(), REVIEW_OPERATOR, Some("Fire report confirms the loss"))
        .await?;
    finish(service, high_value.id()).await?;
    reports.push(report(service, "high-value", high_value.id()).await?);

    let analyzed = service
        .create(NewClaim {
            call_log: Some("It was raining hard at night on the highway when they hit me.".to_string()),
            ..NewClaim::new(
                "Riley Shah",
                dec!(12000),
                "Minor collision in a parking lot on a sunny afternoon",
            )
        })
        .await?;
    service.advance(analyzed.id()).await?;
    let analysis = service
        .analyze(analyzed.id(), sample_analysis()?)
        .await?;
    info!(
        claim_id = %analyzed.id(),
        fraud_score = analysis.decision.fraud_score,
        summary = %analysis.decision.summary,
        "Analysis complete"
    );
    advance_until(service, analyzed.id(), ClaimState::FraudInvestigation).await?;
    service
        .reject(analyzed.id(), REVIEW_OPERATOR, Some("Statements contradict the written claim"))
        .await?;
    reports.push(report(service, "analyzed", analyzed.id()).await?);

    Ok(reports)
}

fn sample_analysis() -> Result<AnalysisRequest, ClaimError> {
    Ok(AnalysisRequest {
        vision: Some(VisionAnalysis {
            detected_damage: "Front-end impact".to_string(),
            mismatch_found: false,
            confidence: 0.9,
            reasoning: "Damage matches the description".to_string(),
        }),
        text: Some(TextAnalysis::new(
            8,
            vec![
                "Weather: raining on the call, sunny in writing".to_string(),
                "Time: night on the call, afternoon in writing".to_string(),
                "Location: highway on the call, parking lot in writing".to_string(),
            ],
            "SUSPICIOUS",
            "Call log contradicts the written claim",
        )?),
        call_log: None,
    })
}

async fn advance_until(service: &ClaimService, id: ClaimId, target: ClaimState) -> Result<(), ClaimError> {
    loop {
        let update = service.advance(id).await?;
        if update.claim.current_state() == target {
            return Ok(());
        }
    }
}

async fn finish(service: &ClaimService, id: ClaimId) -> Result<(), ClaimError> {
    advance_until(service, id, ClaimState::FinalDecision).await
}

async fn report(service: &ClaimService, label: &str, id: ClaimId) -> Result<ScenarioReport, ClaimError> {
    let claim = service.get(id).await?;
    Ok(ScenarioReport {
        label: label.to_string(),
        history: service.history(id).await?,
        requires_investigation: claim.requires_investigation,
        audit_entries: claim.audit_log().len(),
        human_override: claim.human_override,
    })
}
