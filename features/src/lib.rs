//! # FraudGuard Feature Store
//!
//! A two-tier feature store: an online tier with per-group TTL eviction
//! serving low-latency reads, and an offline tier that every write passes
//! through, keyed for both latest-value and point-in-time lookups.

pub mod stats;
pub mod store;

pub use stats::{FeatureStoreStats, StatsSnapshot};
pub use store::FeatureStore;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fraudguard_core::domain::FeatureGroup;
    use fraudguard_core::environment::Clock;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    struct FakeClock(AtomicI64);
    impl Clock for FakeClock {
        fn now(&self) -> chrono::DateTime<chrono::Utc> {
            chrono::DateTime::from_timestamp_millis(self.0.load(Ordering::SeqCst)).unwrap_or_default()
        }
    }

    #[test]
    fn fresh_entry_is_returned_within_ttl() {
        let clock = Arc::new(FakeClock(AtomicI64::new(0)));
        let store = FeatureStore::new(clock.clone());
        store.put_features("e1", FeatureGroup::TransactionVelocity, serde_json::json!({"n": 1}));

        clock.0.store(30_000, Ordering::SeqCst);
        assert!(store.get_features("e1", FeatureGroup::TransactionVelocity).is_some());
    }

    #[test]
    fn expired_entry_is_evicted_and_counted_as_miss() {
        let clock = Arc::new(FakeClock(AtomicI64::new(0)));
        let store = FeatureStore::new(clock.clone());
        store.put_features("e1", FeatureGroup::TransactionVelocity, serde_json::json!({"n": 1}));

        clock.0.store(70_000, Ordering::SeqCst);
        assert!(store.get_features("e1", FeatureGroup::TransactionVelocity).is_none());
        assert_eq!(store.stats().snapshot().misses, 1);
    }

    #[test]
    fn point_in_time_lookup_falls_back_to_latest() {
        let clock = Arc::new(FakeClock(AtomicI64::new(1000)));
        let store = FeatureStore::new(clock.clone());
        store.put_features("e1", FeatureGroup::SellerProfile, serde_json::json!({"v": 1}));

        let hit = store.get_features_as_of("e1", FeatureGroup::SellerProfile, 5000);
        assert_eq!(hit, Some(serde_json::json!({"v": 1})));

        let miss = store.get_features_as_of("e1", FeatureGroup::SellerProfile, 500);
        assert!(miss.is_none());
    }

    #[test]
    fn point_in_time_lookup_survives_online_eviction() {
        let clock = Arc::new(FakeClock(AtomicI64::new(0)));
        let store = FeatureStore::new(clock.clone());
        store.put_features("e1", FeatureGroup::SellerProfile, serde_json::json!({"v": 1}));

        // Past the online TTL (5 min): a plain get now evicts the online entry.
        clock.0.store(400_000, Ordering::SeqCst);
        assert!(store.get_features("e1", FeatureGroup::SellerProfile).is_none());

        // The offline tier still knows when it was written, so a PIT query
        // for a moment after the write falls back correctly regardless.
        let hit = store.get_features_as_of("e1", FeatureGroup::SellerProfile, 350_000);
        assert_eq!(hit, Some(serde_json::json!({"v": 1})));
    }

    #[test]
    fn hit_rate_reflects_hits_and_misses() {
        let clock = Arc::new(FakeClock(AtomicI64::new(0)));
        let store = FeatureStore::new(clock);
        store.put_features("e1", FeatureGroup::DeviceTrust, serde_json::json!(1));
        let _ = store.get_features("e1", FeatureGroup::DeviceTrust);
        let _ = store.get_features("missing", FeatureGroup::DeviceTrust);

        let snapshot = store.stats().snapshot();
        assert!((snapshot.hit_rate - 0.5).abs() < f64::EPSILON);
    }
}
