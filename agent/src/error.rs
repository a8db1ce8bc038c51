//! The agent crate's error taxonomy.

use fraudguard_core::error::{Classify, ErrorKind};
use thiserror::Error;

/// Errors raised by the agent runtime.
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    /// A help request timed out waiting for a response.
    #[error("help request '{correlation_id}' timed out after {timeout_ms}ms")]
    HelpRequestTimedOut {
        /// Correlation id of the abandoned request.
        correlation_id: String,
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// A unicast or delegation target is not a known recipient.
    #[error("unknown message recipient '{0}'")]
    UnknownRecipient(String),

    /// A tool invoked during the act step is not registered.
    #[error("tool '{0}' is not registered on this agent")]
    UnknownTool(String),

    /// The completion service failed during the think step.
    #[error("completion service failed: {0}")]
    CompletionFailed(String),
}

impl Classify for AgentError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::HelpRequestTimedOut { .. } => ErrorKind::Timeout,
            Self::UnknownRecipient(_) | Self::UnknownTool(_) => ErrorKind::NotFound,
            Self::CompletionFailed(_) => ErrorKind::Unavailable,
        }
    }
}
