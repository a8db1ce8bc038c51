//! # FraudGuard Streaming
//!
//! An in-process, Kafka-like partitioned log: named topics with a fixed
//! partition count, consumer groups with round-robin rebalancing, offset
//! tracking, and time-based retention. Every produced message is also
//! forwarded to the shared internal event bus so the risk engine, agents,
//! and the WebSocket bridge can react to it without polling partitions
//! themselves.

pub mod engine;
pub mod error;
pub mod hash;
pub mod model;

pub use engine::{ConsumerGroupSummary, PartitionLag, ProduceReceipt, StreamingEngine, TopicSummary};
pub use error::StreamingError;
pub use model::{ConsumerGroup, Message, Topic, DEFAULT_NUM_PARTITIONS, DEFAULT_RETENTION_MS, DEFAULT_TOPICS};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fraudguard_core::event_bus::BroadcastEventBus;
    use fraudguard_core::environment::SystemClock;
    use std::sync::Arc;

    fn engine() -> StreamingEngine {
        StreamingEngine::new(Arc::new(BroadcastEventBus::default()), Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn produce_then_poll_returns_value_once() {
        let engine = engine();
        engine.create_consumer_group("g1", "risk.events").unwrap();
        engine.add_consumer("g1", "c1").unwrap();

        engine.produce("risk.events", "seller-1", serde_json::json!({"n": 1})).await.unwrap();
        let first = engine.poll("g1", "c1", 10).unwrap();
        assert_eq!(first.len(), 1);

        let second = engine.poll("g1", "c1", 10).unwrap();
        assert!(second.is_empty(), "second poll should not re-deliver the same message");
    }

    #[tokio::test]
    async fn produce_to_unknown_topic_fails() {
        let engine = engine();
        let err = engine.produce("does.not.exist", "k", serde_json::json!(null)).await.unwrap_err();
        assert!(matches!(err, StreamingError::TopicNotFound(_)));
    }

    #[test]
    fn poll_on_unassigned_consumer_returns_empty() {
        let engine = engine();
        engine.create_consumer_group("g2", "risk.events").unwrap();
        let polled = engine.poll("g2", "ghost", 10).unwrap();
        assert!(polled.is_empty());
    }

    #[test]
    fn rebalance_assigns_every_partition_exactly_once() {
        let engine = engine();
        engine.create_consumer_group("g3", "risk.events").unwrap();
        engine.add_consumer("g3", "c1").unwrap();
        engine.add_consumer("g3", "c2").unwrap();

        let assigned_c1 = engine.poll("g3", "c1", 0);
        let assigned_c2 = engine.poll("g3", "c2", 0);
        assert!(assigned_c1.is_ok() && assigned_c2.is_ok());
    }

    #[tokio::test]
    async fn default_topics_are_created_at_startup() {
        let engine = engine();
        let names = engine.topic_names();
        for expected in DEFAULT_TOPICS {
            assert!(names.contains(&(*expected).to_string()));
        }
    }

    #[tokio::test]
    async fn retention_drops_expired_prefix_and_rebases_committed_offset() {
        use fraudguard_core::environment::Clock;

        struct FakeClock(std::sync::atomic::AtomicI64);
        impl Clock for FakeClock {
            fn now(&self) -> chrono::DateTime<chrono::Utc> {
                chrono::DateTime::from_timestamp_millis(self.0.load(std::sync::atomic::Ordering::SeqCst))
                    .unwrap_or_default()
            }
        }

        let clock = Arc::new(FakeClock(std::sync::atomic::AtomicI64::new(0)));
        let engine = StreamingEngine::new(Arc::new(BroadcastEventBus::default()), clock.clone());
        engine.create_topic("t", 1, 1000);
        engine.create_consumer_group("g", "t").unwrap();
        engine.add_consumer("g", "c").unwrap();

        engine.produce("t", "k", serde_json::json!(1)).await.unwrap();
        engine.poll("g", "c", 10).unwrap();

        clock.0.store(5000, std::sync::atomic::Ordering::SeqCst);
        engine.produce("t", "k", serde_json::json!(2)).await.unwrap();
        engine.run_retention_sweep();

        let lag = engine.lag("g").unwrap();
        assert_eq!(lag.len(), 1);
        assert!(lag[0].committed_offset <= lag[0].high_water_mark);
    }
}
