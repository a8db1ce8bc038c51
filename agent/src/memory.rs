//! Short-term and long-term agent memory.
//!
//! Short-term memory is a fixed-capacity ring buffer of recent observations.
//! Long-term memory is episodic, keyed by a pattern-matching signature
//! derived from the episode's input so that future reasoning cycles can
//! recall similarly-shaped prior episodes.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

const DEFAULT_SHORT_TERM_CAPACITY: usize = 50;

/// A single short-term observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Free-form description of what was observed.
    pub content: String,
    /// Epoch-ms time of the observation.
    pub recorded_at: i64,
}

/// Ring-buffer of the most recent observations.
#[derive(Debug)]
pub struct ShortTermMemory {
    capacity: usize,
    buffer: VecDeque<Observation>,
}

impl ShortTermMemory {
    /// Create a ring buffer with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), buffer: VecDeque::with_capacity(capacity) }
    }

    /// Record an observation, dropping the oldest if at capacity.
    pub fn record(&mut self, content: impl Into<String>, recorded_at: i64) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(Observation { content: content.into(), recorded_at });
    }

    /// The most recent observations, oldest first.
    #[must_use]
    pub fn recent(&self) -> &VecDeque<Observation> {
        &self.buffer
    }

    /// Number of observations currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for ShortTermMemory {
    fn default() -> Self {
        Self::new(DEFAULT_SHORT_TERM_CAPACITY)
    }
}

/// A completed reasoning episode, recalled by pattern-matching signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// The input that triggered this episode.
    pub input_summary: String,
    /// The recommendation the episode concluded with.
    pub recommendation: String,
    /// The composite score the episode computed.
    pub composite_score: f64,
    /// Epoch-ms time the episode completed.
    pub recorded_at: i64,
}

/// Episodic long-term memory, keyed by a pattern-matching signature.
#[derive(Debug, Default)]
pub struct LongTermMemory {
    episodes: HashMap<String, Vec<Episode>>,
}

/// Derives a coarse pattern-matching signature from an input, by picking out
/// the stable shape of the input (its sorted top-level JSON keys) rather than
/// its specific values, so structurally similar inputs collide.
#[must_use]
pub fn extract_features_for_pattern_matching(input: &serde_json::Value) -> String {
    let serde_json::Value::Object(map) = input else {
        return format!("scalar:{}", input.to_string().len().min(16));
    };
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys.join(",")
}

impl LongTermMemory {
    /// Create an empty long-term memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed episode under the input's pattern signature.
    pub fn record(&mut self, input: &serde_json::Value, episode: Episode) {
        let signature = extract_features_for_pattern_matching(input);
        self.episodes.entry(signature).or_default().push(episode);
    }

    /// Recall every episode recorded under the same pattern signature as
    /// `input`, most recent first.
    #[must_use]
    pub fn recall(&self, input: &serde_json::Value) -> Vec<&Episode> {
        let signature = extract_features_for_pattern_matching(input);
        let mut episodes: Vec<&Episode> = self.episodes.get(&signature).into_iter().flatten().collect();
        episodes.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        episodes
    }

    /// Total number of episodes recorded across all signatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.episodes.values().map(Vec::len).sum()
    }

    /// Whether no episodes have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }
}
