//! The scheduler crate's error taxonomy.

use fraudguard_core::error::{Classify, ErrorKind};
use thiserror::Error;

/// Errors raised while scheduling or running an agent's autonomous cycle.
#[derive(Error, Debug, Clone)]
pub enum SchedulerError {
    /// Subscribing to the configured topics failed.
    #[error("subscription to topics {topics:?} failed: {reason}")]
    SubscriptionFailed {
        /// Topics that failed to subscribe.
        topics: Vec<String>,
        /// Underlying reason.
        reason: String,
    },
}

impl Classify for SchedulerError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::SubscriptionFailed { .. } => ErrorKind::Unavailable,
        }
    }
}
