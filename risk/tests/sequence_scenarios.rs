//! End-to-end sequence-pattern matching scenarios.

#![allow(clippy::unwrap_used)]

use fraudguard_core::environment::{SystemClock, UuidGenerator};
use fraudguard_risk::{match_template, RiskProfileEngine, BUST_OUT};
use fraudguard_testing::scenarios::{bust_out_events, clean_seller_events};
use std::sync::Arc;

fn seed(events: Vec<fraudguard_core::domain::RiskEvent>) -> RiskProfileEngine {
    let engine = RiskProfileEngine::new(Arc::new(SystemClock), Arc::new(UuidGenerator));
    for event in events {
        engine.emit_risk_event(&event.seller_id, event.domain, &event.event_type, event.risk_score, event.metadata);
    }
    engine
}

#[test]
fn bust_out_match_reproduces_the_scenario_exactly() {
    let engine = seed(bust_out_events("S1", 0));

    let history = engine.events_for("S1");
    let result = match_template(&history, &BUST_OUT);

    assert_eq!(result.steps_completed, 6);
    assert_eq!(result.total_steps, 6);
    assert_eq!(result.severity, "CRITICAL");
    assert!(result.match_score > 0.7, "expected matchScore > 0.7, got {}", result.match_score);
}

#[test]
fn clean_seller_does_not_match() {
    let engine = seed(clean_seller_events("S2", 0));

    let history = engine.events_for("S2");
    let result = match_template(&history, &BUST_OUT);

    assert!(result.match_score < 0.5, "expected matchScore < 0.5, got {}", result.match_score);
}
