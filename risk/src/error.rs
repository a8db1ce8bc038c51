use fraudguard_core::error::{Classify, ErrorKind};
use thiserror::Error;

/// Failure modes raised by the risk profile engine.
#[derive(Error, Debug, Clone)]
pub enum RiskError {
    /// No profile exists yet for this seller (no events have ever been emitted).
    #[error("no risk profile for seller '{0}'")]
    SellerNotFound(String),
    /// A manual override was requested with a tier outside the fixed enumeration.
    #[error("invalid tier override '{0}'")]
    InvalidTier(String),
}

impl Classify for RiskError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::SellerNotFound(_) => ErrorKind::NotFound,
            Self::InvalidTier(_) => ErrorKind::InvalidArgument,
        }
    }
}
