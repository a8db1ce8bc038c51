//! Sequence-pattern matching over a seller's risk-event history.
//!
//! A **sequence pattern** (glossary) is a named ordered template of
//! `(domain, eventType-set)` steps with a max duration and severity.
//! Matching replays a seller's events chronologically against a template,
//! looking for each step in order.

use fraudguard_core::domain::{Domain, RiskEvent};
use serde::{Deserialize, Serialize};

/// One step of a [`SequenceTemplate`]: matches any event in `domain` whose
/// `event_type` is one of `event_types`.
#[derive(Debug, Clone, Copy)]
pub struct SequenceStep {
    /// The domain the triggering event must belong to.
    pub domain: Domain,
    /// Any one of these event types satisfies the step.
    pub event_types: &'static [&'static str],
}

/// A named ordered template: the steps must occur in order, the whole
/// sequence bounded by `max_duration_ms` from the first matched step.
#[derive(Debug, Clone, Copy)]
pub struct SequenceTemplate {
    /// The pattern's name, e.g. `"BUST_OUT"`.
    pub name: &'static str,
    /// Ordered steps.
    pub steps: &'static [SequenceStep],
    /// Maximum span, in milliseconds, from the first matched step to the last.
    pub max_duration_ms: i64,
    /// Severity reported when the match completes.
    pub severity: &'static str,
}

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// A seller who is approved, sets up the account and a listing, then spikes
/// transaction velocity, changes bank details mid-dispute, and spikes
/// payout velocity: the classic onboard-build-trust-then-drain shape.
pub const BUST_OUT: SequenceTemplate = SequenceTemplate {
    name: "BUST_OUT",
    steps: &[
        SequenceStep { domain: Domain::Onboarding, event_types: &["SELLER_APPROVED"] },
        SequenceStep { domain: Domain::AccountSetup, event_types: &["ACCOUNT_SETUP_OK"] },
        SequenceStep { domain: Domain::Listing, event_types: &["LISTING_APPROVED"] },
        SequenceStep { domain: Domain::Transaction, event_types: &["VELOCITY_SPIKE"] },
        SequenceStep { domain: Domain::ProfileUpdates, event_types: &["BANK_CHANGE_DURING_DISPUTE"] },
        SequenceStep { domain: Domain::Payout, event_types: &["PAYOUT_VELOCITY_SPIKE"] },
    ],
    max_duration_ms: 60 * DAY_MS,
    severity: "CRITICAL",
};

/// Every template the matcher knows about.
pub const TEMPLATES: &[SequenceTemplate] = &[BUST_OUT];

/// The result of matching one template against one seller's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceMatch {
    /// The template's name.
    pub pattern_name: String,
    /// `> 0.7` is a strong match; scenarios treat `>= 0.5` as notable.
    pub match_score: f64,
    /// How many of the template's steps matched.
    pub steps_completed: usize,
    /// Total steps in the template.
    pub total_steps: usize,
    /// The template's configured severity.
    pub severity: String,
    /// Timestamp of the first matched step, if any.
    pub first_matched_at: Option<i64>,
    /// Timestamp of the last matched step, if any.
    pub last_matched_at: Option<i64>,
}

/// Matches `events` (any order; sorted internally by `created_at`) against
/// a single `template`.
///
/// The matcher greedily advances a `last_matched_time` anchor: each step
/// looks for the earliest remaining event at or after the anchor (and, once
/// the first step has matched, within `max_duration_ms` of that first
/// match) satisfying the step's domain/event-type. If no event is found,
/// the step is skipped — a partial match — but the anchor does not move
/// and the search continues with the next step. This can under-match some
/// timelines (a step's genuine event might appear later, out of order,
/// relative to a step that matched against a coincidental early event) but
/// that is the documented, preserved behaviour: it never backtracks once a
/// step has consumed an event.
#[must_use]
pub fn match_template(events: &[RiskEvent], template: &SequenceTemplate) -> SequenceMatch {
    let mut sorted: Vec<&RiskEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.created_at);

    let mut steps_completed = 0usize;
    let mut first_matched_at: Option<i64> = None;
    let mut last_matched_at: Option<i64> = None;
    let mut anchor = i64::MIN;

    for step in template.steps {
        let deadline = first_matched_at.map(|first| first + template.max_duration_ms);
        let found = sorted
            .iter()
            .find(|e| e.domain == step.domain && step.event_types.contains(&e.event_type.as_str()) && e.created_at >= anchor && deadline.is_none_or(|d| e.created_at <= d));

        if let Some(event) = found {
            steps_completed += 1;
            anchor = event.created_at;
            first_matched_at.get_or_insert(event.created_at);
            last_matched_at = Some(event.created_at);
        }
    }

    let total_steps = template.steps.len();
    let completeness = f64::from(u32::try_from(steps_completed).unwrap_or(u32::MAX)) / total_steps as f64;
    let elapsed_ms = match (first_matched_at, last_matched_at) {
        (Some(first), Some(last)) => (last - first) as f64,
        _ => 0.0,
    };
    let time_factor = (1.0 - elapsed_ms / template.max_duration_ms as f64).clamp(0.0, 1.0);
    let match_score = (0.8 * completeness + 0.2 * time_factor).min(1.0);

    SequenceMatch {
        pattern_name: template.name.to_string(),
        match_score,
        steps_completed,
        total_steps,
        severity: template.severity.to_string(),
        first_matched_at,
        last_matched_at,
    }
}

/// Matches `events` against every known template, returning every result
/// (callers filter by `match_score` themselves, as spec scenarios do).
#[must_use]
pub fn match_all(events: &[RiskEvent]) -> Vec<SequenceMatch> {
    TEMPLATES.iter().map(|template| match_template(events, template)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn event(seller_id: &str, domain: Domain, event_type: &str, day: i64) -> RiskEvent {
        RiskEvent {
            event_id: format!("{seller_id}-{event_type}"),
            seller_id: seller_id.to_string(),
            domain,
            event_type: event_type.to_string(),
            risk_score: 0.0,
            metadata: serde_json::json!({}),
            created_at: day * DAY_MS,
        }
    }

    #[test]
    fn bust_out_full_sequence_matches_strongly() {
        let events = vec![
            event("S1", Domain::Onboarding, "SELLER_APPROVED", 0),
            event("S1", Domain::AccountSetup, "ACCOUNT_SETUP_OK", 2),
            event("S1", Domain::Listing, "LISTING_APPROVED", 5),
            event("S1", Domain::Transaction, "VELOCITY_SPIKE", 30),
            event("S1", Domain::ProfileUpdates, "BANK_CHANGE_DURING_DISPUTE", 40),
            event("S1", Domain::Payout, "PAYOUT_VELOCITY_SPIKE", 50),
        ];

        let result = match_template(&events, &BUST_OUT);

        assert_eq!(result.pattern_name, "BUST_OUT");
        assert_eq!(result.steps_completed, 6);
        assert_eq!(result.total_steps, 6);
        assert_eq!(result.severity, "CRITICAL");
        assert!(result.match_score > 0.7, "expected > 0.7, got {}", result.match_score);
    }

    #[test]
    fn clean_seller_does_not_match_strongly() {
        let events = vec![
            event("S2", Domain::Onboarding, "SELLER_APPROVED", 0),
            event("S2", Domain::AccountSetup, "ACCOUNT_SETUP_OK", 1),
        ];

        let result = match_template(&events, &BUST_OUT);

        assert_eq!(result.steps_completed, 2);
        assert!(result.match_score < 0.5, "expected < 0.5, got {}", result.match_score);
    }

    #[test]
    fn unordered_input_is_sorted_before_matching() {
        let events = vec![
            event("S1", Domain::Payout, "PAYOUT_VELOCITY_SPIKE", 50),
            event("S1", Domain::Onboarding, "SELLER_APPROVED", 0),
        ];
        let result = match_template(&events, &BUST_OUT);
        assert_eq!(result.first_matched_at, Some(0));
        assert_eq!(result.last_matched_at, Some(50 * DAY_MS));
    }

    #[test]
    fn missing_step_is_skipped_without_moving_the_anchor() {
        // No account_setup event: step 2 is skipped, step 3 (listing) still
        // matches against the anchor left by step 1.
        let events = vec![
            event("S1", Domain::Onboarding, "SELLER_APPROVED", 0),
            event("S1", Domain::Listing, "LISTING_APPROVED", 5),
        ];
        let result = match_template(&events, &BUST_OUT);
        assert_eq!(result.steps_completed, 2);
    }

    #[test]
    fn empty_history_matches_nothing() {
        let result = match_template(&[], &BUST_OUT);
        assert_eq!(result.steps_completed, 0);
        assert_eq!(result.match_score, 0.0);
        assert_eq!(result.first_matched_at, None);
    }
}
