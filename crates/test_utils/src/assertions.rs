//! Custom Test Assertions
//!
//! Assertion helpers for claim routing that print the whole route on failure.

use domain_claims::{Claim, ClaimState};

/// Asserts the full route so far: history followed by the current state
pub fn assert_route(claim: &Claim, expected: &[ClaimState]) {
    let mut route = claim.state_history().to_vec();
    route.push(claim.current_state());
    assert_eq!(
        route,
        expected,
        "Unexpected route for claim {}: pending={:?}",
        claim.id(),
        claim.pending_states().to_vec()
    );
}

/// Asserts the pending queue, front first
pub fn assert_pending(claim: &Claim, expected: &[ClaimState]) {
    assert_eq!(
        claim.pending_states().to_vec(),
        expected,
        "Unexpected pending states for claim {} in {}",
        claim.id(),
        claim.current_state()
    );
}

/// Asserts that `actor` wrote an audit entry with `decision`
pub fn assert_audited(claim: &Claim, actor: &str, decision: &str) {
    let found = claim
        .audit_log()
        .iter()
        .any(|entry| entry.actor == actor && entry.decision == decision);
    assert!(
        found,
        "No audit entry from {actor} with decision {decision}; log: {:?}",
        claim
            .audit_log()
            .iter()
            .map(|e| format!("{}:{}", e.actor, e.decision))
            .collect::<Vec<_>>()
    );
}

/// Asserts that two scores are equal within floating point noise
pub fn assert_score_eq(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "Score mismatch: actual={actual}, expected={expected}"
    );
}
