//! The orchestrator crate's error taxonomy.

use fraudguard_core::error::{Classify, ErrorKind};
use thiserror::Error;

/// Errors raised while registering agents, executing workflows, or routing
/// help requests.
#[derive(Error, Debug, Clone)]
pub enum OrchestratorError {
    /// A workflow step names an agent id/name not present in the registry.
    #[error("unknown agent: {0}")]
    UnknownAgent(String),
    /// An execution id was never started, or has since been forgotten.
    #[error("unknown workflow execution: {0}")]
    UnknownExecution(String),
    /// `resolve_escalation` was called on an execution that is not
    /// currently `AWAITING_HUMAN`.
    #[error("execution {0} is not awaiting human review")]
    NotAwaitingHuman(String),
}

impl Classify for OrchestratorError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAgent(_) | Self::UnknownExecution(_) => ErrorKind::NotFound,
            Self::NotAwaitingHuman(_) => ErrorKind::Conflict,
        }
    }
}
