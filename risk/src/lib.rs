//! # FraudGuard Risk Profile Engine
//!
//! Maintains one composite risk profile per seller: domain-weighted,
//! exponentially decayed over the seller's full event history, with a
//! 48-hour de-escalation cooldown so a transient quiet period can't mask an
//! active risk tier. Every seller recomputes under its own lock so
//! concurrent risk events never block across sellers.

pub mod engine;
pub mod error;
pub mod profile;
pub mod sequence;

pub use engine::{HistoryPoint, RiskProfileEngine};
pub use error::RiskError;
pub use profile::{SellerProfile, Tier, DOMAIN_WEIGHTS};
pub use sequence::{match_all, match_template, SequenceMatch, SequenceStep, SequenceTemplate, BUST_OUT, TEMPLATES};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use fraudguard_core::domain::Domain;
    use fraudguard_core::environment::{Clock, IdGenerator};
    use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
    use std::sync::Arc;

    struct FakeClock(AtomicI64);

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.timestamp_millis_opt(self.0.load(Ordering::SeqCst)).single().unwrap()
        }
        fn now_millis(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl FakeClock {
        fn advance_days(&self, days: i64) {
            self.0.fetch_add(days * 86_400_000, Ordering::SeqCst);
        }
    }

    struct FakeIdGenerator(AtomicU64);

    impl IdGenerator for FakeIdGenerator {
        fn next_id(&self) -> String {
            format!("evt-{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn engine() -> (Arc<FakeClock>, RiskProfileEngine) {
        let clock = Arc::new(FakeClock(AtomicI64::new(0)));
        let engine = RiskProfileEngine::new(clock.clone(), Arc::new(FakeIdGenerator(AtomicU64::new(0))));
        (clock, engine)
    }

    #[test]
    fn composite_score_weights_domains() {
        let (_clock, engine) = engine();
        let profile = engine.emit_risk_event("S1", Domain::Ato, "ATO_ATTEMPT", 100.0, serde_json::json!({}));
        // Domain::Ato weight is 0.14, single fresh event -> 100 * 0.14 = 14.0
        assert!((profile.composite_score - 14.0).abs() < 1e-6);
        assert_eq!(profile.effective_tier, Tier::Low);
    }

    #[test]
    fn tier_escalates_immediately_but_deescalation_waits_for_cooldown() {
        let (clock, engine) = engine();
        // Drive composite well past the CRITICAL threshold (86) across several domains.
        for domain in [Domain::Ato, Domain::Payout, Domain::Transaction, Domain::Onboarding] {
            engine.emit_risk_event("S1", domain, "SPIKE", 100.0, serde_json::json!({}));
        }
        let profile = engine.emit_risk_event("S1", Domain::Shipping, "SPIKE", 100.0, serde_json::json!({}));
        assert_eq!(profile.effective_tier, Tier::Critical);

        // Within the 48h cooldown, decay alone should not de-escalate the effective tier.
        clock.advance_days(1);
        let profile = engine.emit_risk_event("S1", Domain::Returns, "NOOP", 0.0, serde_json::json!({}));
        assert_eq!(profile.effective_tier, Tier::Critical);

        // Past the cooldown, decay has dropped the composite and the tier can fall.
        clock.advance_days(60);
        let profile = engine.emit_risk_event("S1", Domain::Returns, "NOOP", 0.0, serde_json::json!({}));
        assert_eq!(profile.effective_tier, Tier::Low);
    }

    #[test]
    fn manual_override_supersedes_computation() {
        let (_clock, engine) = engine();
        engine.emit_risk_event("S1", Domain::Ato, "ATO_ATTEMPT", 5.0, serde_json::json!({}));
        let profile = engine.set_manual_override("S1", Some(Tier::Critical));
        assert_eq!(profile.effective_tier, Tier::Critical);
    }

    #[test]
    fn history_replays_as_of_each_events_own_timestamp() {
        let (clock, engine) = engine();
        engine.emit_risk_event("S1", Domain::Ato, "A", 50.0, serde_json::json!({}));
        clock.advance_days(30);
        engine.emit_risk_event("S1", Domain::Ato, "B", 50.0, serde_json::json!({}));

        let history = engine.get_history("S1");
        assert_eq!(history.len(), 2);
        // At the second event's own timestamp, the first event has decayed by one half-life.
        let expected_second = (50.0 * 0.5 + 50.0) * 0.14;
        assert!((history[1].composite_score - (expected_second * 100.0).round() / 100.0).abs() < 0.1);
    }

    #[test]
    fn unknown_seller_has_no_profile() {
        let (_clock, engine) = engine();
        assert!(engine.get_profile("ghost").is_none());
        assert!(engine.get_history("ghost").is_empty());
    }
}
