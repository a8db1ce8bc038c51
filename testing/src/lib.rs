//! # FraudGuard Testing
//!
//! Deterministic test doubles and seed-data builders shared across crates:
//! a fixed clock for reproducible timestamps, and day-offset event
//! sequences for common seller scenarios so downstream test modules don't
//! duplicate the arithmetic.

use chrono::{DateTime, TimeZone, Utc};
use fraudguard_core::domain::{Domain, RiskEvent};
use fraudguard_core::environment::Clock;

/// A clock that always returns the same instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a fixed clock at the given time.
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }

    /// Advance the clock by `millis` and return a new `FixedClock`.
    ///
    /// `FixedClock` is immutable by design (so two handles never silently
    /// diverge); callers that need to advance time replace their clock
    /// reference with the value this returns.
    #[must_use]
    pub fn advance_millis(self, millis: i64) -> Self {
        Self {
            time: self.time + chrono::Duration::milliseconds(millis),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// The default fixed clock for tests: 2025-01-01T00:00:00Z.
#[must_use]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(|| Utc.timestamp_opt(1_735_689_600, 0).unwrap()),
    )
}

/// Seed builders for common end-to-end seller scenarios.
pub mod scenarios {
    use super::{Domain, RiskEvent};

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn event(
        seller_id: &str,
        domain: Domain,
        event_type: &str,
        risk_score: f64,
        day_offset: i64,
        base_millis: i64,
    ) -> RiskEvent {
        RiskEvent {
            event_id: format!("{seller_id}-{event_type}-{day_offset}"),
            seller_id: seller_id.to_string(),
            domain,
            event_type: event_type.to_string(),
            risk_score,
            metadata: serde_json::json!({}),
            created_at: base_millis + day_offset * DAY_MS,
        }
    }

    /// A classic bust-out sequence: clean onboarding followed by an
    /// escalating velocity spike, a bank-change-during-dispute event, and a
    /// payout velocity spike.
    #[must_use]
    pub fn bust_out_events(seller_id: &str, base_millis: i64) -> Vec<RiskEvent> {
        vec![
            event(seller_id, Domain::Onboarding, "SELLER_APPROVED", 10.0, 0, base_millis),
            event(seller_id, Domain::AccountSetup, "ACCOUNT_SETUP_OK", 10.0, 2, base_millis),
            event(seller_id, Domain::Listing, "LISTING_APPROVED", 20.0, 5, base_millis),
            event(seller_id, Domain::Transaction, "VELOCITY_SPIKE", 80.0, 30, base_millis),
            event(
                seller_id,
                Domain::ProfileUpdates,
                "BANK_CHANGE_DURING_DISPUTE",
                90.0,
                40,
                base_millis,
            ),
            event(seller_id, Domain::Payout, "PAYOUT_VELOCITY_SPIKE", 95.0, 50, base_millis),
        ]
    }

    /// A clean seller with no fraud signal.
    #[must_use]
    pub fn clean_seller_events(seller_id: &str, base_millis: i64) -> Vec<RiskEvent> {
        vec![
            event(seller_id, Domain::Onboarding, "SELLER_APPROVED", 5.0, 0, base_millis),
            event(seller_id, Domain::AccountSetup, "ACCOUNT_SETUP_OK", 5.0, 1, base_millis),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_stable_across_calls() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn advance_millis_moves_time_forward() {
        let clock = test_clock();
        let later = clock.advance_millis(1000);
        assert_eq!((later.now() - clock.now()).num_milliseconds(), 1000);
    }

    #[test]
    fn bust_out_scenario_has_six_steps() {
        let events = scenarios::bust_out_events("S1", test_clock().now_millis());
        assert_eq!(events.len(), 6);
        assert_eq!(events[0].domain, Domain::Onboarding);
        assert_eq!(events[5].domain, Domain::Payout);
    }
}
