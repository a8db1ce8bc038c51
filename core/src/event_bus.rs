//! The internal event bus.
//!
//! This is distinct from the partitioned, offset-tracked log in
//! `fraudguard-streaming`. It is the lightweight fan-out every risk-bearing
//! event travels over on its way to the risk profile engine, subscribing
//! autonomous agents, and the WebSocket bridge. The streaming engine
//! forwards every message here under the topic's mapped canonical event
//! name; nothing downstream needs to know about partitions or offsets to
//! subscribe.
//!
//! The trait is dyn-compatible via `Pin<Box<dyn Future>>` rather than
//! `async fn`, so every component can hold an `Arc<dyn EventBus>` without
//! knowing the concrete backing implementation.

use futures::Stream;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::{Classify, ErrorKind};

/// Errors raised by an `EventBus` implementation.
#[derive(Error, Debug, Clone)]
pub enum EventBusError {
    /// Publish failed for the given topic.
    #[error("publish failed for topic '{topic}': {reason}")]
    PublishFailed {
        /// Topic that failed.
        topic: String,
        /// Underlying reason.
        reason: String,
    },
    /// Subscription failed for the given topics.
    #[error("subscription failed for topics {topics:?}: {reason}")]
    SubscriptionFailed {
        /// Topics that failed to subscribe.
        topics: Vec<String>,
        /// Underlying reason.
        reason: String,
    },
}

impl Classify for EventBusError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::PublishFailed { .. } | Self::SubscriptionFailed { .. } => ErrorKind::Internal,
        }
    }
}

/// A single event delivered over the bus.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BusEvent {
    /// Canonical topic/event name this event was published under.
    pub topic: String,
    /// Producer-supplied partition key, if any (absent for events that are
    /// not also streaming-engine messages).
    pub key: Option<String>,
    /// Opaque JSON payload.
    pub payload: Value,
    /// Epoch-ms publish time.
    pub timestamp: i64,
}

/// Stream of events from a subscription.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<BusEvent, EventBusError>> + Send>>;

/// Trait for event bus implementations.
///
/// # Dyn compatibility
///
/// Uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn` so
/// that `Arc<dyn EventBus>` can be passed around uniformly to every engine
/// and agent without generic parameters leaking everywhere.
pub trait EventBus: Send + Sync {
    /// Publish an event to a topic. At-least-once delivery to subscribers.
    fn publish(
        &self,
        event: BusEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), EventBusError>> + Send + '_>>;

    /// Subscribe to one or more topics, receiving a merged stream of events.
    fn subscribe(
        &self,
        topics: &[&str],
    ) -> Pin<Box<dyn Future<Output = Result<EventStream, EventBusError>> + Send + '_>>;
}

type ChannelMap = RwLock<HashMap<String, broadcast::Sender<BusEvent>>>;

/// Broadcast-channel backed `EventBus`.
///
/// One `tokio::sync::broadcast` channel per topic, created lazily on first
/// publish or subscribe. A lagging subscriber drops the oldest buffered
/// events rather than blocking the publisher; this is deliberately lossy
/// backpressure.
#[derive(Clone)]
pub struct BroadcastEventBus {
    channels: Arc<ChannelMap>,
    capacity: usize,
}

impl BroadcastEventBus {
    /// Create a new bus. `capacity` bounds the per-topic broadcast buffer.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    fn sender_for(&self, topic: &str) -> broadcast::Sender<BusEvent> {
        if let Some(tx) = self
            .channels
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(topic)
        {
            return tx.clone();
        }
        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus for BroadcastEventBus {
    fn publish(
        &self,
        event: BusEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), EventBusError>> + Send + '_>> {
        Box::pin(async move {
            let sender = self.sender_for(&event.topic);
            // No receivers is not an error: the bus has fire-and-forget semantics.
            let _ = sender.send(event);
            Ok(())
        })
    }

    fn subscribe(
        &self,
        topics: &[&str],
    ) -> Pin<Box<dyn Future<Output = Result<EventStream, EventBusError>> + Send + '_>> {
        let topics: Vec<String> = topics.iter().map(|t| (*t).to_string()).collect();
        Box::pin(async move {
            let receivers: Vec<broadcast::Receiver<BusEvent>> = topics
                .iter()
                .map(|topic| self.sender_for(topic).subscribe())
                .collect();

            let streams = receivers.into_iter().map(|rx| {
                Box::pin(async_stream::stream! {
                    let mut rx = rx;
                    loop {
                        match rx.recv().await {
                            Ok(event) => yield Ok(event),
                            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                warn!(skipped, "event bus subscriber lagged, dropping oldest events");
                                continue;
                            }
                            Err(broadcast::error::RecvError::Closed) => {
                                debug!("event bus channel closed");
                                break;
                            }
                        }
                    }
                }) as Pin<Box<dyn Stream<Item = Result<BusEvent, EventBusError>> + Send>>
            });

            Ok(Box::pin(futures::stream::select_all(streams)) as EventStream)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn event(topic: &str, n: i64) -> BusEvent {
        BusEvent {
            topic: topic.to_string(),
            key: None,
            payload: serde_json::json!({ "n": n }),
            timestamp: n,
        }
    }

    #[tokio::test]
    async fn publish_then_subscribe_delivers_events() {
        let bus = BroadcastEventBus::new(16);
        let mut stream = bus.subscribe(&["risk.events"]).await.unwrap();
        bus.publish(event("risk.events", 1)).await.unwrap();
        let received = stream.next().await.unwrap().unwrap();
        assert_eq!(received.timestamp, 1);
    }

    #[tokio::test]
    async fn subscribers_to_other_topics_do_not_receive() {
        let bus = BroadcastEventBus::new(16);
        let mut stream = bus.subscribe(&["alerts.created"]).await.unwrap();
        bus.publish(event("risk.events", 1)).await.unwrap();
        let result =
            tokio::time::timeout(std::time::Duration::from_millis(20), stream.next()).await;
        assert!(
            result.is_err(),
            "subscriber to a different topic should not receive"
        );
    }

    #[tokio::test]
    async fn merged_subscription_receives_from_all_topics() {
        let bus = BroadcastEventBus::new(16);
        let mut stream = bus.subscribe(&["a", "b"]).await.unwrap();
        bus.publish(event("a", 1)).await.unwrap();
        bus.publish(event("b", 2)).await.unwrap();
        let mut seen = vec![stream.next().await.unwrap().unwrap().timestamp];
        seen.push(stream.next().await.unwrap().unwrap().timestamp);
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2]);
    }
}
