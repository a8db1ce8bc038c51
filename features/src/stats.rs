use fraudguard_core::domain::FeatureGroup;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[derive(Debug, Default)]
struct GroupTally {
    fresh: AtomicU64,
    stale: AtomicU64,
}

/// Read/write/hit/miss counters, overall and broken down per feature group.
#[derive(Debug, Default)]
pub struct FeatureStoreStats {
    reads: AtomicU64,
    writes: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    per_group: RwLock<HashMap<FeatureGroup, GroupTally>>,
}

/// A point-in-time snapshot of [`FeatureStoreStats`].
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct StatsSnapshot {
    /// Total `getFeatures`/`getFeaturesAsOf` calls.
    pub reads: u64,
    /// Total `putFeatures` calls.
    pub writes: u64,
    /// Reads that found a live entry.
    pub hits: u64,
    /// Reads that found nothing or an expired entry.
    pub misses: u64,
    /// `hits / (hits + misses)`, `0.0` if there have been no reads.
    pub hit_rate: f64,
}

impl FeatureStoreStats {
    pub(crate) fn record_write(&self, group: FeatureGroup) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.tally(group, true);
    }

    pub(crate) fn record_read(&self, group: FeatureGroup, hit: bool) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        self.tally(group, hit);
    }

    fn tally(&self, group: FeatureGroup, fresh: bool) {
        let groups = self.per_group.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(entry) = groups.get(&group) {
            if fresh {
                entry.fresh.fetch_add(1, Ordering::Relaxed);
            } else {
                entry.stale.fetch_add(1, Ordering::Relaxed);
            }
            return;
        }
        drop(groups);
        let mut groups = self.per_group.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        let entry = groups.entry(group).or_default();
        if fresh {
            entry.fresh.fetch_add(1, Ordering::Relaxed);
        } else {
            entry.stale.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Current fresh/stale tally for one group.
    #[must_use]
    pub fn group_tally(&self, group: FeatureGroup) -> (u64, u64) {
        let groups = self.per_group.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        groups.get(&group).map_or((0, 0), |t| (t.fresh.load(Ordering::Relaxed), t.stale.load(Ordering::Relaxed)))
    }

    /// A consistent snapshot of the overall counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        StatsSnapshot {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            hits,
            misses,
            hit_rate: if total == 0 { 0.0 } else { hits as f64 / total as f64 },
        }
    }
}
