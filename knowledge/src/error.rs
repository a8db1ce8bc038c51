use fraudguard_core::error::{Classify, ErrorKind};
use thiserror::Error;

/// Failure modes raised by the knowledge base.
#[derive(Error, Debug, Clone)]
pub enum KnowledgeError {
    /// A namespace outside the fixed enumeration.
    #[error("unknown namespace '{0}'")]
    UnknownNamespace(String),
    /// Lookup against an entry id that was never stored.
    #[error("entry '{0}' not found")]
    EntryNotFound(String),
}

impl Classify for KnowledgeError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownNamespace(_) => ErrorKind::InvalidArgument,
            Self::EntryNotFound(_) => ErrorKind::NotFound,
        }
    }
}
