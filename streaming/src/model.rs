use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// A single immutable record appended to a partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Position within the partition at append time.
    pub offset: u64,
    /// Producer-supplied partition key.
    pub key: String,
    /// Opaque payload.
    pub value: serde_json::Value,
    /// Epoch-ms append time.
    pub timestamp: i64,
}

/// An ordered, append-only log. Retention drops a contiguous expired prefix;
/// remaining messages keep the offsets assigned at produce time.
#[derive(Debug, Default)]
pub struct Partition {
    messages: VecDeque<Message>,
    next_offset: u64,
}

impl Partition {
    pub(crate) fn append(&mut self, key: String, value: serde_json::Value, timestamp: i64) -> Message {
        let offset = self.next_offset;
        self.next_offset += 1;
        let message = Message { offset, key, value, timestamp };
        self.messages.push_back(message.clone());
        message
    }

    /// The next offset that will be assigned; also the count of all messages
    /// ever appended (retained or not).
    pub(crate) const fn high_water_mark(&self) -> u64 {
        self.next_offset
    }

    /// Messages starting at `start_offset`, up to `max` of them. If
    /// `start_offset` predates the oldest retained message, reading starts
    /// from the oldest one available instead.
    pub(crate) fn read_from(&self, start_offset: u64, max: usize) -> Vec<Message> {
        let Some(front) = self.messages.front() else {
            return Vec::new();
        };
        let start_idx = start_offset.saturating_sub(front.offset) as usize;
        self.messages.iter().skip(start_idx).take(max).cloned().collect()
    }

    /// Drops the contiguous prefix of messages older than `cutoff`, returning
    /// how many were dropped.
    pub(crate) fn evict_expired(&mut self, cutoff: i64) -> usize {
        let mut dropped = 0;
        while let Some(front) = self.messages.front() {
            if front.timestamp < cutoff {
                self.messages.pop_front();
                dropped += 1;
            } else {
                break;
            }
        }
        dropped
    }

    pub(crate) fn len(&self) -> usize {
        self.messages.len()
    }
}

/// A named, partitioned append-only log.
#[derive(Debug)]
pub struct Topic {
    /// Topic name.
    pub name: String,
    /// Number of partitions, fixed at creation.
    pub num_partitions: u32,
    /// Retention window in milliseconds.
    pub retention_ms: i64,
    /// Epoch-ms creation time.
    pub created_at: i64,
    pub(crate) partitions: Vec<std::sync::RwLock<Partition>>,
}

impl Topic {
    pub(crate) fn new(name: String, num_partitions: u32, retention_ms: i64, created_at: i64) -> Self {
        let partitions = (0..num_partitions).map(|_| std::sync::RwLock::new(Partition::default())).collect();
        Self { name, num_partitions, retention_ms, created_at, partitions }
    }
}

/// Default retention window: 1 hour.
pub const DEFAULT_RETENTION_MS: i64 = 60 * 60 * 1000;
/// Default partition count for auto-created topics.
pub const DEFAULT_NUM_PARTITIONS: u32 = 4;

/// The fixed set of topics auto-created at startup.
pub const DEFAULT_TOPICS: &[&str] = &[
    "transactions.received",
    "transactions.enriched",
    "transactions.scored",
    "transactions.decided",
    "risk.events",
    "alerts.created",
    "agent.actions",
    "features.materialized",
];

/// A named collection of consumers sharing ownership of a topic's partitions.
#[derive(Debug, Default)]
pub struct ConsumerGroup {
    /// Group id.
    pub group_id: String,
    /// Topic this group consumes.
    pub topic_name: String,
    /// Member consumer ids, in the order used to compute round-robin assignment.
    pub members: Vec<String>,
    /// partition index -> assigned consumer id.
    pub assignment: HashMap<u32, String>,
    /// partition index -> consumer id -> committed offset.
    pub committed_offsets: HashMap<u32, HashMap<String, u64>>,
}

impl ConsumerGroup {
    pub(crate) fn new(group_id: String, topic_name: String) -> Self {
        Self { group_id, topic_name, ..Self::default() }
    }

    /// Recomputes a total, disjoint round-robin assignment: partition `i`
    /// goes to `members[i % members.len()]`.
    pub(crate) fn rebalance(&mut self, num_partitions: u32) {
        self.assignment.clear();
        if self.members.is_empty() {
            return;
        }
        for partition in 0..num_partitions {
            let member_idx = (partition as usize) % self.members.len();
            self.assignment.insert(partition, self.members[member_idx].clone());
        }
    }

    pub(crate) fn partitions_for(&self, consumer_id: &str) -> Vec<u32> {
        let mut partitions: Vec<u32> = self
            .assignment
            .iter()
            .filter(|(_, owner)| owner.as_str() == consumer_id)
            .map(|(partition, _)| *partition)
            .collect();
        partitions.sort_unstable();
        partitions
    }

    pub(crate) fn committed(&self, partition: u32, consumer_id: &str) -> u64 {
        self.committed_offsets
            .get(&partition)
            .and_then(|by_consumer| by_consumer.get(consumer_id))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn commit(&mut self, partition: u32, consumer_id: &str, offset: u64) {
        self.committed_offsets
            .entry(partition)
            .or_default()
            .insert(consumer_id.to_string(), offset);
    }
}
