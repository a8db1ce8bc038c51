use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use fraudguard_core::domain::FeatureGroup;
use fraudguard_core::environment::Clock;
use serde_json::Value;
use tracing::debug;

use crate::stats::FeatureStoreStats;

#[derive(Debug, Clone)]
struct OnlineEntry {
    payload: Value,
    updated_at: i64,
    ttl_ms: i64,
}

#[derive(Debug, Clone)]
struct OfflineEntry {
    payload: Value,
    updated_at: i64,
}

type OnlineKey = (String, FeatureGroup);

/// Two-tier feature store: an online tier with per-group TTL eviction and an
/// offline tier written through on every `put`, keyed both by the latest
/// value and by a point-in-time snapshot. The offline tier carries its own
/// `updated_at` per entry so point-in-time lookups remain answerable after
/// the corresponding online entry has TTL-evicted.
pub struct FeatureStore {
    online: RwLock<HashMap<OnlineKey, OnlineEntry>>,
    offline: RwLock<HashMap<String, OfflineEntry>>,
    clock: Arc<dyn Clock>,
    stats: FeatureStoreStats,
}

impl FeatureStore {
    /// Builds an empty feature store.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            online: RwLock::new(HashMap::new()),
            offline: RwLock::new(HashMap::new()),
            clock,
            stats: FeatureStoreStats::default(),
        }
    }

    /// Read-only access to the accumulated stats.
    #[must_use]
    pub const fn stats(&self) -> &FeatureStoreStats {
        &self.stats
    }

    fn latest_key(entity_id: &str, group: FeatureGroup) -> String {
        format!("{entity_id}:{group}")
    }

    fn pit_key(entity_id: &str, group: FeatureGroup, ts: i64) -> String {
        format!("{entity_id}:{group}:{ts}")
    }

    /// Returns the payload if present and not past its TTL; evicts it from
    /// the online tier otherwise.
    pub fn get_features(&self, entity_id: &str, group: FeatureGroup) -> Option<Value> {
        let now = self.clock.now_millis();
        let key = (entity_id.to_string(), group);

        let fresh = {
            let online = self.online.read().unwrap_or_else(PoisonError::into_inner);
            online.get(&key).map(|entry| (now - entry.updated_at <= entry.ttl_ms, entry.payload.clone()))
        };

        match fresh {
            Some((true, payload)) => {
                self.stats.record_read(group, true);
                Some(payload)
            }
            Some((false, _)) => {
                let mut online = self.online.write().unwrap_or_else(PoisonError::into_inner);
                online.remove(&key);
                self.stats.record_read(group, false);
                None
            }
            None => {
                self.stats.record_read(group, false);
                None
            }
        }
    }

    /// Writes `payload` into the online tier (stamping `updated_at = now`,
    /// `ttl = group.ttl_millis()`), and write-through into the offline tier
    /// under both the latest key and a point-in-time key.
    pub fn put_features(&self, entity_id: &str, group: FeatureGroup, payload: Value) {
        let now = self.clock.now_millis();
        let key = (entity_id.to_string(), group);
        {
            let mut online = self.online.write().unwrap_or_else(PoisonError::into_inner);
            online.insert(key, OnlineEntry { payload: payload.clone(), updated_at: now, ttl_ms: group.ttl_millis() });
        }
        {
            let mut offline = self.offline.write().unwrap_or_else(PoisonError::into_inner);
            offline.insert(Self::latest_key(entity_id, group), OfflineEntry { payload: payload.clone(), updated_at: now });
            offline.insert(Self::pit_key(entity_id, group, now), OfflineEntry { payload, updated_at: now });
        }
        self.stats.record_write(group);
        debug!(entity_id, %group, "materialized feature");
    }

    /// Exact point-in-time lookup; falls back to the latest value if it was
    /// written no later than `ts`; otherwise a miss. The fallback uses the
    /// offline tier's own `updated_at`, so it still answers correctly once
    /// the online entry has TTL-evicted (a `get_features` side effect
    /// elsewhere in this engine, unrelated to this lookup).
    pub fn get_features_as_of(&self, entity_id: &str, group: FeatureGroup, ts: i64) -> Option<Value> {
        let offline = self.offline.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(exact) = offline.get(&Self::pit_key(entity_id, group, ts)) {
            self.stats.record_read(group, true);
            return Some(exact.payload.clone());
        }
        if let Some(latest) = offline.get(&Self::latest_key(entity_id, group)) {
            if latest.updated_at <= ts {
                self.stats.record_read(group, true);
                return Some(latest.payload.clone());
            }
        }
        self.stats.record_read(group, false);
        None
    }
}
