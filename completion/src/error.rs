//! Errors for the completion/ML boundary (grounded on `anthropic/src/error.rs`).

use fraudguard_core::error::{Classify, ErrorKind};
use thiserror::Error;

/// Errors raised talking to a pluggable completion or ML-prediction service.
#[derive(Error, Debug, Clone)]
pub enum CompletionError {
    /// The service is unreachable or returned a server error.
    #[error("completion service unavailable: {0}")]
    Unavailable(String),
    /// The request timed out.
    #[error("completion request timed out")]
    Timeout,
    /// The service rejected the request as malformed.
    #[error("invalid completion request: {0}")]
    InvalidRequest(String),
}

impl Classify for CompletionError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable(_) => ErrorKind::Unavailable,
            Self::Timeout => ErrorKind::Timeout,
            Self::InvalidRequest(_) => ErrorKind::InvalidArgument,
        }
    }
}
