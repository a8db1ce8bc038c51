use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use fraudguard_core::environment::Clock;
use fraudguard_core::event_bus::{BusEvent, EventBus};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::StreamingError;
use crate::model::{
    ConsumerGroup, Message, Topic, DEFAULT_NUM_PARTITIONS, DEFAULT_RETENTION_MS, DEFAULT_TOPICS,
};

/// Result of a `produce` call.
#[derive(Debug, Clone, Copy)]
pub struct ProduceReceipt {
    /// Partition the message landed in.
    pub partition: u32,
    /// Offset assigned within that partition.
    pub offset: u64,
    /// Epoch-ms append time.
    pub timestamp: i64,
}

/// Read-only topic summary for introspection endpoints.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TopicSummary {
    /// Topic name.
    pub name: String,
    /// Number of partitions, fixed at creation.
    pub num_partitions: u32,
    /// Retention window in milliseconds.
    pub retention_ms: i64,
    /// Epoch-ms creation time.
    pub created_at: i64,
}

/// Read-only consumer group summary for introspection endpoints.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConsumerGroupSummary {
    /// Group id.
    pub group_id: String,
    /// Topic this group consumes.
    pub topic_name: String,
    /// Member consumer ids.
    pub members: Vec<String>,
}

/// Per-partition lag for a consumer group.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct PartitionLag {
    /// Partition index.
    pub partition: u32,
    /// Next offset to be assigned.
    pub high_water_mark: u64,
    /// Minimum committed offset across the group's members assigned to this
    /// partition.
    pub committed_offset: u64,
    /// `high_water_mark - committed_offset`.
    pub lag: u64,
}

/// The in-process partitioned log: topics, consumer groups, and the bridge
/// to the internal event bus.
pub struct StreamingEngine {
    topics: RwLock<HashMap<String, Arc<Topic>>>,
    groups: RwLock<HashMap<String, Arc<RwLock<ConsumerGroup>>>>,
    topic_event_map: HashMap<&'static str, &'static str>,
    event_bus: Arc<dyn EventBus>,
    clock: Arc<dyn Clock>,
}

impl StreamingEngine {
    /// Builds the engine with the default topics already created.
    #[must_use]
    pub fn new(event_bus: Arc<dyn EventBus>, clock: Arc<dyn Clock>) -> Self {
        let engine = Self {
            topics: RwLock::new(HashMap::new()),
            groups: RwLock::new(HashMap::new()),
            topic_event_map: DEFAULT_TOPICS.iter().map(|name| (*name, *name)).collect(),
            event_bus,
            clock,
        };
        for name in DEFAULT_TOPICS {
            engine.create_topic(name, DEFAULT_NUM_PARTITIONS, DEFAULT_RETENTION_MS);
        }
        engine
    }

    fn topics_read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Topic>>> {
        self.topics.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn topics_write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<Topic>>> {
        self.topics.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn groups_read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<RwLock<ConsumerGroup>>>> {
        self.groups.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn groups_write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<RwLock<ConsumerGroup>>>> {
        self.groups.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a topic if absent; idempotent no-op otherwise.
    pub fn create_topic(&self, name: &str, num_partitions: u32, retention_ms: i64) {
        let mut topics = self.topics_write();
        topics.entry(name.to_string()).or_insert_with(|| {
            Arc::new(Topic::new(name.to_string(), num_partitions, retention_ms, self.clock.now_millis()))
        });
    }

    fn topic(&self, name: &str) -> Result<Arc<Topic>, StreamingError> {
        self.topics_read()
            .get(name)
            .cloned()
            .ok_or_else(|| StreamingError::TopicNotFound(name.to_string()))
    }

    /// Lists known topic names.
    #[must_use]
    pub fn topic_names(&self) -> Vec<String> {
        self.topics_read().keys().cloned().collect()
    }

    /// Lists every known topic's shape, for read-only introspection.
    #[must_use]
    pub fn topics(&self) -> Vec<TopicSummary> {
        self.topics_read()
            .values()
            .map(|topic| TopicSummary {
                name: topic.name.clone(),
                num_partitions: topic.num_partitions,
                retention_ms: topic.retention_ms,
                created_at: topic.created_at,
            })
            .collect()
    }

    /// Lists every known consumer group's membership, for read-only
    /// introspection.
    #[must_use]
    pub fn consumer_groups(&self) -> Vec<ConsumerGroupSummary> {
        self.groups_read()
            .values()
            .map(|group_handle| {
                let group = group_handle.read().unwrap_or_else(PoisonError::into_inner);
                ConsumerGroupSummary {
                    group_id: group.group_id.clone(),
                    topic_name: group.topic_name.clone(),
                    members: group.members.clone(),
                }
            })
            .collect()
    }

    /// Appends `(key, value)` to the topic, selecting the partition via the
    /// stable hash of `key`, and forwards the message onto the internal event
    /// bus under the topic's mapped canonical event name.
    pub async fn produce(&self, topic_name: &str, key: &str, value: Value) -> Result<ProduceReceipt, StreamingError> {
        let topic = self.topic(topic_name)?;
        let partition_idx = crate::hash::partition_for_key(key, topic.num_partitions);
        let now = self.clock.now_millis();

        let message = {
            let lock = &topic.partitions[partition_idx as usize];
            let mut partition = lock.write().unwrap_or_else(PoisonError::into_inner);
            partition.append(key.to_string(), value, now)
        };

        let event_name = self
            .topic_event_map
            .get(topic_name)
            .copied()
            .unwrap_or(topic_name);
        let bus_event = BusEvent {
            topic: event_name.to_string(),
            key: Some(key.to_string()),
            payload: message.value.clone(),
            timestamp: message.timestamp,
        };
        if let Err(err) = self.event_bus.publish(bus_event).await {
            warn!(topic = topic_name, error = %err, "failed to forward produced message to event bus");
        }

        Ok(ProduceReceipt { partition: partition_idx, offset: message.offset, timestamp: message.timestamp })
    }

    /// Creates the group if absent and returns it either way (idempotent).
    pub fn create_consumer_group(&self, group_id: &str, topic_name: &str) -> Result<(), StreamingError> {
        self.topic(topic_name)?;
        let mut groups = self.groups_write();
        if let Some(existing) = groups.get(group_id) {
            let existing = existing.read().unwrap_or_else(PoisonError::into_inner);
            if existing.topic_name != topic_name {
                return Err(StreamingError::ConsumerGroupConflict(group_id.to_string()));
            }
            return Ok(());
        }
        groups.insert(
            group_id.to_string(),
            Arc::new(RwLock::new(ConsumerGroup::new(group_id.to_string(), topic_name.to_string()))),
        );
        Ok(())
    }

    fn group(&self, group_id: &str) -> Result<Arc<RwLock<ConsumerGroup>>, StreamingError> {
        self.groups_read()
            .get(group_id)
            .cloned()
            .ok_or_else(|| StreamingError::TopicNotFound(group_id.to_string()))
    }

    /// Adds a consumer to the group and triggers a rebalance.
    pub fn add_consumer(&self, group_id: &str, consumer_id: &str) -> Result<(), StreamingError> {
        let group_handle = self.group(group_id)?;
        let topic = {
            let group = group_handle.read().unwrap_or_else(PoisonError::into_inner);
            self.topic(&group.topic_name)?
        };
        let mut group = group_handle.write().unwrap_or_else(PoisonError::into_inner);
        if !group.members.iter().any(|m| m == consumer_id) {
            group.members.push(consumer_id.to_string());
        }
        group.rebalance(topic.num_partitions);
        info!(group_id, consumer_id, "consumer joined, rebalanced");
        Ok(())
    }

    /// Removes a consumer from the group and triggers a rebalance.
    pub fn remove_consumer(&self, group_id: &str, consumer_id: &str) -> Result<(), StreamingError> {
        let group_handle = self.group(group_id)?;
        let topic = {
            let group = group_handle.read().unwrap_or_else(PoisonError::into_inner);
            self.topic(&group.topic_name)?
        };
        let mut group = group_handle.write().unwrap_or_else(PoisonError::into_inner);
        group.members.retain(|m| m != consumer_id);
        group.rebalance(topic.num_partitions);
        info!(group_id, consumer_id, "consumer left, rebalanced");
        Ok(())
    }

    /// Reads up to `max_messages` across the consumer's assigned partitions,
    /// split as evenly as possible, auto-committing to `last_read_offset + 1`.
    /// Returns empty if the consumer has no assignment.
    pub fn poll(&self, group_id: &str, consumer_id: &str, max_messages: usize) -> Result<Vec<Message>, StreamingError> {
        let group_handle = self.group(group_id)?;
        let topic_name = {
            let group = group_handle.read().unwrap_or_else(PoisonError::into_inner);
            group.topic_name.clone()
        };
        let topic = self.topic(&topic_name)?;

        let assigned = {
            let group = group_handle.read().unwrap_or_else(PoisonError::into_inner);
            group.partitions_for(consumer_id)
        };
        if assigned.is_empty() || max_messages == 0 {
            return Ok(Vec::new());
        }

        let per_partition = (max_messages / assigned.len()).max(1);
        let mut out = Vec::new();
        let mut group = group_handle.write().unwrap_or_else(PoisonError::into_inner);
        for partition_idx in assigned {
            if out.len() >= max_messages {
                break;
            }
            let start = group.committed(partition_idx, consumer_id);
            let take = per_partition.min(max_messages - out.len());
            let Some(lock) = topic.partitions.get(partition_idx as usize) else { continue };
            let read = lock.read().unwrap_or_else(PoisonError::into_inner).read_from(start, take);
            if let Some(last) = read.last() {
                group.commit(partition_idx, consumer_id, last.offset + 1);
            }
            out.extend(read);
        }
        Ok(out)
    }

    /// Explicitly sets the committed offset for `(group, consumer, partition)`.
    pub fn commit_offset(&self, group_id: &str, consumer_id: &str, partition: u32, offset: u64) -> Result<(), StreamingError> {
        let group_handle = self.group(group_id)?;
        let mut group = group_handle.write().unwrap_or_else(PoisonError::into_inner);
        group.commit(partition, consumer_id, offset);
        Ok(())
    }

    /// Per-partition lag for every partition the group's members own.
    pub fn lag(&self, group_id: &str) -> Result<Vec<PartitionLag>, StreamingError> {
        let group_handle = self.group(group_id)?;
        let group = group_handle.read().unwrap_or_else(PoisonError::into_inner);
        let topic = self.topic(&group.topic_name)?;

        let mut out = Vec::new();
        for partition_idx in 0..topic.num_partitions {
            let Some(owner) = group.assignment.get(&partition_idx) else { continue };
            let hwm = topic
                .partitions
                .get(partition_idx as usize)
                .map(|lock| lock.read().unwrap_or_else(PoisonError::into_inner).high_water_mark())
                .unwrap_or_default();
            let committed = group.committed(partition_idx, owner);
            out.push(PartitionLag {
                partition: partition_idx,
                high_water_mark: hwm,
                committed_offset: committed,
                lag: hwm.saturating_sub(committed),
            });
        }
        Ok(out)
    }

    /// Runs one retention pass over every topic, dropping expired prefixes
    /// and decrementing affected consumer groups' committed offsets by the
    /// number of messages dropped from each partition.
    ///
    /// A consumer group's committed offset tracks its position relative to
    /// the *current* in-memory window, not a permanent absolute counter, so
    /// this decrement keeps it aligned with the shrunk partition. That
    /// relationship is only ever reconstructed from live state and does not
    /// survive a process restart.
    pub fn run_retention_sweep(&self) {
        let now = self.clock.now_millis();
        let topics: Vec<Arc<Topic>> = self.topics_read().values().cloned().collect();
        for topic in topics {
            let cutoff = now - topic.retention_ms;
            for (partition_idx, lock) in topic.partitions.iter().enumerate() {
                let dropped = {
                    let mut partition = lock.write().unwrap_or_else(PoisonError::into_inner);
                    partition.evict_expired(cutoff)
                };
                if dropped == 0 {
                    continue;
                }
                debug!(topic = %topic.name, partition = partition_idx, dropped, "retention evicted messages");
                self.decrement_committed_offsets(&topic.name, partition_idx as u32, dropped as u64);
            }
        }
    }

    fn decrement_committed_offsets(&self, topic_name: &str, partition: u32, by: u64) {
        let groups = self.groups_read();
        for group_handle in groups.values() {
            let mut group = group_handle.write().unwrap_or_else(PoisonError::into_inner);
            if group.topic_name != topic_name {
                continue;
            }
            if let Some(by_consumer) = group.committed_offsets.get_mut(&partition) {
                for offset in by_consumer.values_mut() {
                    *offset = offset.saturating_sub(by);
                }
            }
        }
    }

    /// Spawns the periodic retention task (every 60s) on the current tokio
    /// runtime, returning a handle the caller can abort on shutdown.
    pub fn spawn_retention_task(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                self.run_retention_sweep();
            }
        })
    }
}
