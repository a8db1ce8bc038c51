use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock};

/// Accumulated count/sum/min/max for one window slot.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct Aggregate {
    /// Number of values added to this window.
    pub count: u64,
    /// Sum of all added values.
    pub sum: f64,
    /// Smallest value added.
    pub min: f64,
    /// Largest value added.
    pub max: f64,
}

impl Aggregate {
    /// `sum / count`, or `0.0` for an empty window.
    #[must_use]
    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = if self.count == 1 { value } else { self.min.min(value) };
        self.max = if self.count == 1 { value } else { self.max.max(value) };
    }
}

impl Default for Aggregate {
    fn default() -> Self {
        Self { count: 0, sum: 0.0, min: 0.0, max: 0.0 }
    }
}

fn window_starts(ts: i64, window_ms: i64, slide_ms: i64) -> Vec<i64> {
    let aligned = (ts / slide_ms) * slide_ms;
    let max_windows = window_ms / slide_ms + 1;
    let mut starts = Vec::new();
    for i in 0..max_windows {
        let start = aligned - i * slide_ms;
        if start < 0 {
            break;
        }
        if start <= ts && ts < start + window_ms {
            starts.push(start);
        }
    }
    starts
}

/// A tumbling (`slide == window`) or sliding (`slide < window`) aggregation
/// over `(key, timestamp)` pairs, bounded in memory by active keys times
/// windows-per-key.
pub struct WindowedAggregator<K> {
    window_ms: i64,
    slide_ms: i64,
    slots: RwLock<HashMap<(K, i64), Aggregate>>,
}

impl<K: Eq + Hash + Clone> WindowedAggregator<K> {
    /// Creates an aggregator. `window_ms == slide_ms` is tumbling.
    #[must_use]
    pub fn new(window_ms: i64, slide_ms: i64) -> Self {
        Self { window_ms, slide_ms, slots: RwLock::new(HashMap::new()) }
    }

    /// Adds `value` at `ts` to every window slot it falls into.
    pub fn add(&self, key: K, value: f64, ts: i64) {
        let starts = window_starts(ts, self.window_ms, self.slide_ms);
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        for start in starts {
            slots.entry((key.clone(), start)).or_default().add(value);
        }
    }

    /// The aggregate for the tumbling window slot containing `now` (the
    /// "current" window), or an empty aggregate if nothing was added to it.
    #[must_use]
    pub fn current(&self, key: &K, now: i64) -> Aggregate {
        let start = (now / self.window_ms) * self.window_ms;
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(&(key.clone(), start)).copied().unwrap_or_default()
    }

    /// Drops window slots that have fully expired relative to `now`.
    pub fn cleanup(&self, now: i64) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.retain(|(_, start), _| start + self.window_ms >= now - self.window_ms);
    }
}
