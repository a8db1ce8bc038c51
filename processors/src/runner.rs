use std::sync::Arc;

use fraudguard_streaming::{Message, StreamingEngine};
use tracing::{error, warn};

/// A long-running consumer that owns one consumer group and handles each
/// message it polls.
pub trait Processor: Send + Sync + 'static {
    /// Consumer group id (and consumer id, since each processor runs as a
    /// single consumer in its own group).
    fn group_id(&self) -> &str;
    /// Topic this processor consumes.
    fn topic(&self) -> &str;
    /// Handle one polled message. Errors are logged and the message is
    /// skipped (at-most-once for this processor), never retried.
    fn handle(&self, message: &Message);
}

/// Spawns the poll loop for `processor` against `engine`, ticking roughly
/// every second.
pub fn spawn<P: Processor>(engine: Arc<StreamingEngine>, processor: Arc<P>) -> tokio::task::JoinHandle<()> {
    let consumer_id = "primary".to_string();
    if let Err(err) = engine.create_consumer_group(processor.group_id(), processor.topic()) {
        error!(group = processor.group_id(), %err, "failed to create consumer group");
    }
    if let Err(err) = engine.add_consumer(processor.group_id(), &consumer_id) {
        error!(group = processor.group_id(), %err, "failed to register consumer");
    }

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_millis(1000));
        loop {
            interval.tick().await;
            match engine.poll(processor.group_id(), &consumer_id, 100) {
                Ok(messages) => {
                    for message in &messages {
                        processor.handle(message);
                    }
                }
                Err(err) => warn!(group = processor.group_id(), %err, "poll failed"),
            }
        }
    })
}
