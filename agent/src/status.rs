//! Agent status and capability advertisement.

use serde::{Deserialize, Serialize};

/// An agent's current position in the reasoning cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    /// Idle, available to accept a help request.
    Idle,
    /// Running the think step.
    Thinking,
    /// Running the plan step.
    Planning,
    /// Running the act step.
    Executing,
    /// Running a multi-hop graph investigation as part of act/observe.
    Investigating,
}

impl AgentStatus {
    /// Whether an agent in this status can accept a routed help request.
    ///
    /// The orchestrator's help-request router prefers `Idle` agents but
    /// falls back to any agent advertising the capability; this helper only
    /// answers the preference question, not eligibility.
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}
