//! Workflow tests for domain_claims

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use rust_decimal_macros::dec;

use core_kernel::ClaimId;
use domain_claims::{
    AggregatorConfig, AnalysisRequest, Claim, ClaimError, ClaimService, ClaimState, ClaimStateMachine,
    EvaluationFanOut, EventDispatcher, NewClaim, ResultAggregator, RiskEvaluator, TextAnalysis,
    DEFAULT_AMOUNT_THRESHOLD,
};
use test_utils::*;

fn standard_dispatcher() -> EventDispatcher {
    EventDispatcher::new(
        ClaimStateMachine::new(),
        EvaluationFanOut::standard(DEFAULT_AMOUNT_THRESHOLD),
    )
}

fn standard_service() -> ClaimService {
    ClaimService::in_memory(standard_dispatcher(), ResultAggregator::default())
}

// ============================================================================
// Workflow Scenarios
// ============================================================================

mod scenario_tests {
    use super::*;

    #[tokio::test]
    async fn test_high_amount_detours_through_investigation() {
        let dispatcher = standard_dispatcher();
        let mut claim = TestClaimBuilder::new().with_amount(dec!(60000)).build();

        while !claim.is_terminal() {
            dispatcher.advance_with_reactions(&mut claim).await.unwrap();
        }

        assert!(claim.requires_investigation);
        assert_route(
            &claim,
            &[
                ClaimState::Submitted,
                ClaimState::UnderReview,
                ClaimState::FraudInvestigation,
                ClaimState::Assessment,
                ClaimState::FinalDecision,
            ],
        );
        assert_audited(&claim, "Agent Alpha", "FLAGGED");
        assert_audited(&claim, "Agent Beta", "CLEARED");
    }

    #[tokio::test]
    async fn test_low_amount_follows_default_path() {
        let dispatcher = standard_dispatcher();
        let mut claim = TestClaimBuilder::new().with_amount(dec!(1000)).build();

        while !claim.is_terminal() {
            dispatcher.advance_with_reactions(&mut claim).await.unwrap();
        }

        assert!(!claim.requires_investigation);
        assert_route(
            &claim,
            &[
                ClaimState::Submitted,
                ClaimState::UnderReview,
                ClaimState::Assessment,
                ClaimState::FinalDecision,
            ],
        );
    }

    #[tokio::test]
    async fn test_pre_flagged_intake_detours_regardless_of_amount() {
        let service = standard_service();
        let intake = TestClaimBuilder::new()
            .with_claimant("Dana Frost")
            .with_amount(dec!(900))
            .with_description("Bicycle stolen from the porch")
            .with_call_log("Caller reported the theft the next morning")
            .flagged()
            .build_intake();
        let claim = service.create(intake).await.unwrap();

        assert_eq!(claim.claimant_name, "Dana Frost");
        assert_eq!(claim.description, "Bicycle stolen from the porch");
        assert_eq!(claim.call_log.as_deref(), Some("Caller reported the theft the next morning"));

        let update = service.advance(claim.id()).await.unwrap();
        assert_eq!(update.next_valid_states, vec![ClaimState::FraudInvestigation]);
        assert_audited(&update.claim, "Agent Beta", "FLAGGED");
    }

    #[tokio::test]
    async fn test_preinserted_detour_runs_before_default_flow() {
        let dispatcher = standard_dispatcher();
        let mut claim = TestClaimBuilder::new()
            .through(&[ClaimState::UnderReview])
            .with_inserted(ClaimState::FraudInvestigation, ClaimState::Assessment)
            .build();
        assert_pending(&claim, &[ClaimState::FraudInvestigation]);

        while !claim.is_terminal() {
            dispatcher.advance_with_reactions(&mut claim).await.unwrap();
        }

        assert_route(
            &claim,
            &[
                ClaimState::Submitted,
                ClaimState::UnderReview,
                ClaimState::FraudInvestigation,
                ClaimState::Assessment,
                ClaimState::FinalDecision,
            ],
        );
    }

    #[test]
    fn test_confident_vision_mismatch_outweighs_consistent_text() {
        let vision = domain_claims::VisionAnalysis {
            confidence: 0.8,
            ..VisionFixtures::confident_mismatch()
        };
        let decision = ResultAggregator::default().aggregate(Some(&vision), Some(&TextFixtures::consistent()));

        assert!(decision.requires_investigation);
        assert_score_eq(decision.fraud_score, 0.8);
    }

    #[test]
    fn test_advance_on_final_decision_fails() {
        let machine = ClaimStateMachine::new();
        let mut claim = TestClaimBuilder::new()
            .through(&[ClaimState::UnderReview, ClaimState::Assessment, ClaimState::FinalDecision])
            .build();

        let err = machine.advance(&mut claim).unwrap_err();

        assert!(matches!(err, ClaimError::TerminalState(ClaimState::FinalDecision)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_insertion_against_graph_is_unsupported() {
        let machine = ClaimStateMachine::new();
        let mut claim = TestClaimBuilder::new().build();

        let err = machine
            .insert_state(&mut claim, ClaimState::Assessment, ClaimState::Submitted)
            .unwrap_err();

        assert!(matches!(err, ClaimError::UnsupportedInsertion { .. }));
        assert!(!err.is_recoverable());
        assert_pending(&claim, &[]);
    }

    #[test]
    fn test_invalid_transition_reports_valid_targets() {
        let machine = ClaimStateMachine::new();
        let mut claim = TestClaimBuilder::new().through(&[ClaimState::UnderReview]).build();

        let err = machine.transition(&mut claim, ClaimState::FinalDecision).unwrap_err();

        match err {
            ClaimError::InvalidTransition { from, to, valid } => {
                assert_eq!(from, ClaimState::UnderReview);
                assert_eq!(to, ClaimState::FinalDecision);
                assert_eq!(valid, vec![ClaimState::FraudInvestigation, ClaimState::Assessment]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(claim.current_state(), ClaimState::UnderReview);
    }
}

// ============================================================================
// Transition Engine Properties
// ============================================================================

mod property_tests {
    use super::*;

    fn apply(machine: &ClaimStateMachine, claim: &mut Claim, op: WorkflowOp) -> Result<(), TestCaseError> {
        let valid = machine.valid_transitions(claim);
        let expected: BTreeSet<_> = match claim.pending_states().front() {
            Some(front) => BTreeSet::from([front]),
            None => claim.current_state().successors().iter().copied().collect(),
        };
        prop_assert_eq!(&valid, &expected);

        match op {
            WorkflowOp::Advance => match machine.next_state(claim) {
                Some(next) => {
                    prop_assert_eq!(machine.advance(claim).ok(), Some(next));
                    prop_assert_eq!(claim.current_state(), next);
                }
                None => {
                    let is_terminal_error = matches!(machine.advance(claim), Err(ClaimError::TerminalState(_)));
                    prop_assert!(is_terminal_error);
                }
            },
            WorkflowOp::Transition(target) => {
                let before = claim.current_state();
                let result = machine.transition(claim, target);
                if valid.contains(&target) {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(claim.current_state(), target);
                } else {
                    let is_invalid = matches!(result, Err(ClaimError::InvalidTransition { .. }));
                    prop_assert!(is_invalid);
                    prop_assert_eq!(claim.current_state(), before);
                }
            }
            WorkflowOp::Insert { state, before } => {
                let pending_before = claim.pending_states().to_vec();
                let result = machine.insert_state(claim, state, before);
                if claim.is_terminal() {
                    let is_terminal_error = matches!(result, Err(ClaimError::TerminalState(_)));
                    prop_assert!(is_terminal_error);
                    prop_assert_eq!(claim.pending_states().to_vec(), pending_before);
                } else if !state.leads_to(before) {
                    let is_unsupported = matches!(result, Err(ClaimError::UnsupportedInsertion { .. }));
                    prop_assert!(is_unsupported);
                    prop_assert_eq!(claim.pending_states().to_vec(), pending_before);
                } else if pending_before.contains(&state) {
                    prop_assert_eq!(result.ok(), Some(false));
                    prop_assert_eq!(claim.pending_states().to_vec(), pending_before);
                } else {
                    prop_assert_eq!(result.ok(), Some(true));
                    prop_assert_eq!(claim.pending_states().front(), Some(state));
                    let snapshot = claim.pending_states().to_vec();
                    prop_assert_eq!(machine.insert_state(claim, state, before).ok(), Some(false));
                    prop_assert_eq!(claim.pending_states().to_vec(), snapshot);
                }
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn test_random_operations_keep_engine_rules(
            intake in new_claim_strategy(),
            ops in workflow_ops_strategy(24),
        ) {
            let machine = ClaimStateMachine::new();
            let mut claim = Claim::submit(intake).unwrap();
            for op in ops {
                apply(&machine, &mut claim, op)?;
            }
        }

        #[test]
        fn test_pending_states_drain_front_first_then_default_flow(
            ops in workflow_ops_strategy(24),
        ) {
            let machine = ClaimStateMachine::new();
            let mut claim = TestClaimBuilder::new().build();
            for op in ops {
                apply(&machine, &mut claim, op)?;
            }

            let queued = claim.pending_states().to_vec();
            let mut visited = Vec::new();
            for _ in 0..queued.len() {
                visited.push(machine.advance(&mut claim).unwrap());
            }
            prop_assert_eq!(visited, queued);
            prop_assert!(claim.pending_states().is_empty());

            let mut steps = 0;
            while !claim.is_terminal() {
                let next = machine.advance(&mut claim).unwrap();
                prop_assert!(!next.is_detour());
                steps += 1;
                prop_assert!(steps <= 3);
            }
        }

        #[test]
        fn test_history_never_repeats_consecutively(ops in workflow_ops_strategy(24)) {
            let machine = ClaimStateMachine::new();
            let mut claim = TestClaimBuilder::new().build();
            for op in ops {
                apply(&machine, &mut claim, op)?;
            }
            let history = claim.state_history();
            prop_assert!(history.windows(2).all(|w| w[0] != w[1]));
        }
    }
}

// ============================================================================
// Evaluation Fan-out Tests
// ============================================================================

mod fan_out_tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_one_flag_is_enough() {
        let fan_out = EvaluationFanOut::new()
            .with_evaluator(ScriptedEvaluator::clearing("a"))
            .with_evaluator(ScriptedEvaluator::flagging("b"))
            .with_evaluator(ScriptedEvaluator::clearing("c"));
        let claim = TestClaimBuilder::new().build();

        let verdict = fan_out.evaluate(&claim).await.unwrap();

        assert!(verdict.requires_investigation);
        assert_eq!(verdict.outcomes.len(), 3);
        assert_eq!(verdict.flagged_by().map(|o| o.evaluator.as_str()).collect::<Vec<_>>(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_failure_keeps_sibling_outcomes() {
        let slow = ScriptedEvaluator::flagging("slow").with_delay(Duration::from_millis(20));
        let calls = slow.call_counter();
        let fan_out = EvaluationFanOut::new()
            .with_evaluator(FailingEvaluator::new("broken", "model endpoint timed out"))
            .with_evaluator(slow);
        let claim = TestClaimBuilder::new().build();

        let err = fan_out.evaluate(&claim).await.unwrap_err();

        match err {
            ClaimError::EvaluatorFailure { failures, completed } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].evaluator, "broken");
                assert_eq!(completed.len(), 1);
                assert_eq!(completed[0].evaluator, "slow");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_evaluators_run_concurrently() {
        let fan_out = (0..5).fold(EvaluationFanOut::new(), |fan_out, i| {
            fan_out.with_evaluator(ScriptedEvaluator::clearing(format!("e{i}")).with_delay(Duration::from_millis(100)))
        });
        let claim = TestClaimBuilder::new().build();

        let started = tokio::time::Instant::now();
        fan_out.evaluate(&claim).await.unwrap();

        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_shared_evaluator_serves_several_fan_outs() {
        let scripted = ScriptedEvaluator::flagging("shared");
        let calls = scripted.call_counter();
        let shared: Arc<dyn RiskEvaluator> = Arc::new(scripted);
        let screening = EvaluationFanOut::new().with_shared_evaluator(Arc::clone(&shared));
        let intake_check = EvaluationFanOut::new()
            .with_evaluator(ScriptedEvaluator::clearing("local"))
            .with_shared_evaluator(shared);
        let claim = TestClaimBuilder::new().build();

        assert!(screening.evaluate(&claim).await.unwrap().requires_investigation);
        assert!(intake_check.evaluate(&claim).await.unwrap().requires_investigation);

        assert_eq!(intake_check.evaluator_names(), vec!["local", "shared"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_confidence_is_a_failure() {
        let fan_out = EvaluationFanOut::new()
            .with_evaluator(ScriptedEvaluator::new("overconfident", true, 1.5, "certain"));
        let claim = TestClaimBuilder::new().build();

        assert!(matches!(
            fan_out.evaluate(&claim).await,
            Err(ClaimError::EvaluatorFailure { .. })
        ));
    }
}

// ============================================================================
// Result Aggregation Tests
// ============================================================================

mod aggregation_tests {
    use super::*;

    #[test]
    fn test_uncertain_vision_mismatch_uses_lower_weight() {
        let decision = ResultAggregator::default().aggregate(Some(&VisionFixtures::uncertain_mismatch()), None);

        assert!(decision.vision_flagged);
        assert_score_eq(decision.fraud_score, 0.5);
    }

    #[test]
    fn test_borderline_text_flags_at_threshold() {
        let decision = ResultAggregator::default().aggregate(
            Some(&VisionFixtures::consistent()),
            Some(&TextFixtures::borderline()),
        );

        assert!(decision.text_flagged);
        assert!(!decision.vision_flagged);
        assert_score_eq(decision.fraud_score, 0.5);
        assert_eq!(decision.reasons, vec!["Text Agent: SUSPICIOUS (score: 5/10)", "  - Time of day differs"]);
    }

    fn expected_score(config: &AggregatorConfig, vision: Option<&domain_claims::VisionAnalysis>, text: Option<&TextAnalysis>) -> f64 {
        let vision_part = vision.map(|v| match (v.mismatch_found, v.confidence > config.vision_confidence_cutoff) {
            (true, true) => config.vision_confident_weight,
            (true, false) => config.vision_uncertain_weight,
            (false, _) => config.vision_clear_weight,
        });
        let text_part = text.map(|t| {
            let score = f64::from(t.inconsistency_score);
            if t.inconsistency_score >= config.text_threshold {
                score / config.text_flagged_divisor
            } else {
                score / config.text_clear_divisor
            }
        });
        vision_part.into_iter().chain(text_part).fold(0.0, f64::max)
    }

    proptest! {
        #[test]
        fn test_score_is_max_of_contributions(
            vision in proptest::option::of(vision_analysis_strategy()),
            text in proptest::option::of(text_analysis_strategy()),
        ) {
            let config = AggregatorConfig::default();
            let decision = ResultAggregator::new(config.clone()).aggregate(vision.as_ref(), text.as_ref());

            prop_assert!((0.0..=1.0).contains(&decision.fraud_score));
            let expected = expected_score(&config, vision.as_ref(), text.as_ref());
            prop_assert!((decision.fraud_score - expected).abs() < 1e-9);
        }

        #[test]
        fn test_investigation_is_or_of_producer_flags(
            vision in proptest::option::of(vision_analysis_strategy()),
            text in proptest::option::of(text_analysis_strategy()),
        ) {
            let decision = ResultAggregator::default().aggregate(vision.as_ref(), text.as_ref());

            let vision_flag = vision.as_ref().is_some_and(|v| v.mismatch_found);
            let text_flag = text.as_ref().is_some_and(|t| t.inconsistency_score >= 5);
            prop_assert_eq!(decision.vision_flagged, vision_flag);
            prop_assert_eq!(decision.text_flagged, text_flag);
            prop_assert_eq!(decision.requires_investigation, vision_flag || text_flag);
            prop_assert_eq!(decision.summary.contains("FRAUD INVESTIGATION REQUIRED"), vision_flag || text_flag);
        }
    }
}

// ============================================================================
// Claim Service Tests
// ============================================================================

mod service_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_rejects_invalid_intake() {
        let service = standard_service();

        let err = service
            .create(NewClaim::new("", dec!(100), "Broken window"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::Validation(_)));

        let err = service
            .create(NewClaim::new("Ari Cole", dec!(0), "Broken window"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_claim_is_not_found() {
        let service = standard_service();
        let id = ClaimId::new();

        assert!(matches!(service.advance(id).await, Err(ClaimError::ClaimNotFound(missing)) if missing == id));
        assert!(matches!(service.history(id).await, Err(ClaimError::ClaimNotFound(_))));
    }

    #[tokio::test]
    async fn test_advance_reports_pending_detour() {
        let service = standard_service();
        let claim = service.create(ClaimFixtures::high_value()).await.unwrap();

        let update = service.advance(claim.id()).await.unwrap();

        assert_eq!(update.claim.current_state(), ClaimState::UnderReview);
        assert_eq!(update.next_valid_states, vec![ClaimState::FraudInvestigation]);
        assert_eq!(
            update.message,
            "Claim advanced from SUBMITTED to UNDER_REVIEW. Pending states: [FRAUD_INVESTIGATION]"
        );

        let history = service.history(claim.id()).await.unwrap();
        assert_eq!(history.state_history, vec![ClaimState::Submitted]);
        assert_eq!(history.pending_states, vec![ClaimState::FraudInvestigation]);
    }

    #[tokio::test]
    async fn test_explicit_transition_fires_reactions() {
        let service = standard_service();
        let claim = service.create(ClaimFixtures::pre_flagged()).await.unwrap();

        service.transition(claim.id(), ClaimState::UnderReview).await.unwrap();
        let err = service.transition(claim.id(), ClaimState::Assessment).await.unwrap_err();

        assert!(matches!(err, ClaimError::InvalidTransition { .. }));
        assert_eq!(
            service.valid_transitions(claim.id()).await.unwrap(),
            vec![ClaimState::FraudInvestigation]
        );
    }

    #[tokio::test]
    async fn test_evaluator_failure_leaves_stored_claim_unchanged() {
        let fan_out = EvaluationFanOut::new()
            .with_evaluator(ScriptedEvaluator::flagging("ok"))
            .with_evaluator(FailingEvaluator::new("down", "connection refused"));
        let service = ClaimService::in_memory(
            EventDispatcher::new(ClaimStateMachine::new(), fan_out),
            ResultAggregator::default(),
        );
        let claim = service.create(ClaimFixtures::routine()).await.unwrap();

        let err = service.advance(claim.id()).await.unwrap_err();
        assert!(matches!(err, ClaimError::EvaluatorFailure { .. }));

        let stored = service.get(claim.id()).await.unwrap();
        assert_eq!(stored.current_state(), ClaimState::Submitted);
        assert!(stored.state_history().is_empty());
        assert!(stored.audit_log().is_empty());
        assert!(!stored.requires_investigation);
    }

    #[tokio::test]
    async fn test_analyze_routes_and_audits() {
        let service = standard_service();
        let claim = service.create(ClaimFixtures::with_call_log()).await.unwrap();
        service.advance(claim.id()).await.unwrap();

        let report = service
            .analyze(
                claim.id(),
                AnalysisRequest {
                    vision: Some(VisionFixtures::confident_mismatch()),
                    text: Some(TextFixtures::consistent()),
                    call_log: None,
                },
            )
            .await
            .unwrap();

        assert!(report.decision.requires_investigation);
        assert_score_eq(report.decision.fraud_score, 0.8);
        assert_eq!(report.claim_state, ClaimState::UnderReview);
        assert_eq!(report.pending_states, vec![ClaimState::FraudInvestigation]);

        let stored = service.get(claim.id()).await.unwrap();
        assert!(stored.requires_investigation);
        assert_eq!(stored.vision_analysis.as_ref().unwrap()["mismatch_found"], true);
        assert_eq!(stored.text_analysis.as_ref().unwrap()["inconsistency_score"], 2);
        assert!(stored.call_log.is_some());
        assert_audited(&stored, "Vision Agent", "FLAGGED");
        assert_audited(&stored, "Text Agent", "CLEARED");
        assert_audited(&stored, "Orchestrator", "INVESTIGATE");
    }

    #[tokio::test]
    async fn test_analyze_rejects_out_of_range_results() {
        let service = standard_service();
        let claim = service.create(ClaimFixtures::routine()).await.unwrap();
        service.advance(claim.id()).await.unwrap();
        let before = service.get(claim.id()).await.unwrap();

        let mut text = TextFixtures::borderline();
        text.inconsistency_score = 42;
        let err = service
            .analyze(
                claim.id(),
                AnalysisRequest {
                    text: Some(text),
                    ..AnalysisRequest::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::Validation(_)));

        let vision = domain_claims::VisionAnalysis {
            confidence: 1.5,
            ..VisionFixtures::uncertain_mismatch()
        };
        let err = service
            .analyze(
                claim.id(),
                AnalysisRequest {
                    vision: Some(vision),
                    text: Some(TextFixtures::consistent()),
                    call_log: Some("never stored".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::Validation(_)));

        let stored = service.get(claim.id()).await.unwrap();
        assert!(!stored.requires_investigation);
        assert!(stored.text_analysis.is_none());
        assert!(stored.vision_analysis.is_none());
        assert!(stored.call_log.is_none());
        assert_eq!(stored.audit_log().len(), before.audit_log().len());
        assert_pending(&stored, &[]);
    }

    #[tokio::test]
    async fn test_analyze_is_idempotent_for_routing() {
        let service = standard_service();
        let claim = service.create(ClaimFixtures::routine()).await.unwrap();
        service.advance(claim.id()).await.unwrap();
        let request = AnalysisRequest {
            text: Some(TextFixtures::suspicious()),
            ..AnalysisRequest::default()
        };

        service.analyze(claim.id(), request.clone()).await.unwrap();
        let report = service.analyze(claim.id(), request).await.unwrap();

        assert_eq!(report.pending_states, vec![ClaimState::FraudInvestigation]);
        assert_eq!(report.decision.reasons.len(), 4);
    }

    #[tokio::test]
    async fn test_approve_then_finish() {
        let service = standard_service();
        let claim = service.create(ClaimFixtures::high_value()).await.unwrap();
        service.advance(claim.id()).await.unwrap();
        service.advance(claim.id()).await.unwrap();

        let outcome = service.approve(claim.id(), "Dana", None).await.unwrap();
        assert_eq!(outcome.previous_state, ClaimState::FraudInvestigation);
        assert_eq!(outcome.new_state, ClaimState::Assessment);

        service.advance(claim.id()).await.unwrap();
        let stored = service.get(claim.id()).await.unwrap();
        assert_route(
            &stored,
            &[
                ClaimState::Submitted,
                ClaimState::UnderReview,
                ClaimState::FraudInvestigation,
                ClaimState::Assessment,
                ClaimState::FinalDecision,
            ],
        );
        assert!(!stored.requires_investigation);
        assert_audited(&stored, "Dana", "APPROVED");
    }

    #[tokio::test]
    async fn test_reject_closes_claim() {
        let service = standard_service();
        let claim = service.create(ClaimFixtures::high_value()).await.unwrap();
        service.advance(claim.id()).await.unwrap();

        let outcome = service
            .reject(claim.id(), "Dana", Some("Photos predate the policy"))
            .await
            .unwrap();

        assert_eq!(outcome.new_state, ClaimState::FinalDecision);
        let history = service.history(claim.id()).await.unwrap();
        assert!(history.pending_states.is_empty());
        assert!(matches!(
            service.reject(claim.id(), "Dana", None).await,
            Err(ClaimError::TerminalState(_))
        ));
    }

    #[tokio::test]
    async fn test_summary_counts_every_state() {
        let service = standard_service();
        let routine = service.create(ClaimFixtures::routine()).await.unwrap();
        let risky = service.create(ClaimFixtures::high_value()).await.unwrap();
        service.create(ClaimFixtures::routine()).await.unwrap();

        for _ in 0..3 {
            service.advance(routine.id()).await.unwrap();
        }
        service.advance(risky.id()).await.unwrap();

        let summary = service.summary().await.unwrap();

        assert_eq!(summary.total_claims, 3);
        assert_eq!(summary.state_counts.len(), 5);
        assert_eq!(summary.state_counts[&ClaimState::Submitted], 1);
        assert_eq!(summary.state_counts[&ClaimState::UnderReview], 1);
        assert_eq!(summary.state_counts[&ClaimState::FraudInvestigation], 0);
        assert_eq!(summary.state_counts[&ClaimState::Assessment], 0);
        assert_eq!(summary.state_counts[&ClaimState::FinalDecision], 1);
        assert_eq!(summary.fraud_flagged, 1);
    }

    #[tokio::test]
    async fn test_concurrent_advances_on_one_claim_are_serialized() {
        let service = Arc::new(standard_service());
        let claim = service.create(ClaimFixtures::routine()).await.unwrap();

        let tasks: Vec<_> = (0..3)
            .map(|_| {
                let service = Arc::clone(&service);
                let id = claim.id();
                tokio::spawn(async move { service.advance(id).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = service.get(claim.id()).await.unwrap();
        assert_route(
            &stored,
            &[
                ClaimState::Submitted,
                ClaimState::UnderReview,
                ClaimState::Assessment,
                ClaimState::FinalDecision,
            ],
        );
    }

    #[tokio::test]
    async fn test_history_serializes_state_names() {
        let service = standard_service();
        let claim = service.create(ClaimFixtures::routine()).await.unwrap();
        service.advance(claim.id()).await.unwrap();

        let json = serde_json::to_value(service.history(claim.id()).await.unwrap()).unwrap();

        assert_eq!(json["current_state"], "UNDER_REVIEW");
        assert_eq!(json["state_history"], serde_json::json!(["SUBMITTED"]));
        assert_eq!(json["pending_states"], serde_json::json!([]));
    }
}
