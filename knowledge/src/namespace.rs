use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed enumeration of knowledge namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    /// Transaction records and summaries.
    Transactions,
    /// Seller onboarding decisions and notes.
    Onboarding,
    /// Past detection/review decisions.
    Decisions,
    /// Historical risk events.
    RiskEvents,
    /// Policy and rule text.
    Rules,
}

impl Namespace {
    /// All namespaces, in a fixed order.
    pub const ALL: [Self; 5] = [Self::Transactions, Self::Onboarding, Self::Decisions, Self::RiskEvents, Self::Rules];
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Transactions => "transactions",
            Self::Onboarding => "onboarding",
            Self::Decisions => "decisions",
            Self::RiskEvents => "risk-events",
            Self::Rules => "rules",
        };
        f.write_str(s)
    }
}

impl FromStr for Namespace {
    type Err = crate::error::KnowledgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transactions" => Ok(Self::Transactions),
            "onboarding" => Ok(Self::Onboarding),
            "decisions" => Ok(Self::Decisions),
            "risk-events" => Ok(Self::RiskEvents),
            "rules" => Ok(Self::Rules),
            other => Err(crate::error::KnowledgeError::UnknownNamespace(other.to_string())),
        }
    }
}
