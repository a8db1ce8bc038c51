use fraudguard_core::error::{Classify, ErrorKind};
use thiserror::Error;

/// Failure modes raised by the streaming engine.
#[derive(Error, Debug, Clone)]
pub enum StreamingError {
    /// `produce`/`poll`/introspection against a topic that was never created.
    #[error("topic '{0}' not found")]
    TopicNotFound(String),
    /// A consumer group id collides with an existing group on a different topic.
    #[error("consumer group '{0}' already exists on a different topic")]
    ConsumerGroupConflict(String),
    /// Committing an offset past the partition's high water mark.
    #[error("offset {offset} exceeds high water mark {hwm} for partition {partition}")]
    InvalidOffset {
        /// Partition index.
        partition: u32,
        /// Offset that was rejected.
        offset: u64,
        /// Current high water mark.
        hwm: u64,
    },
}

impl Classify for StreamingError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::TopicNotFound(_) => ErrorKind::NotFound,
            Self::ConsumerGroupConflict(_) => ErrorKind::Conflict,
            Self::InvalidOffset { .. } => ErrorKind::InvalidArgument,
        }
    }
}
