//! The object-safe view of an agent the scheduler drives, hiding the
//! concrete agent type behind a trait so one scheduler implementation
//! drives either of `fraudguard-agent`'s concrete agents.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use fraudguard_agent::{CrossDomainAgent, InvestigationReport, Messenger, PolicyEvolutionAgent, SharedMessenger};

/// An agent the scheduler can drive through one autonomous cycle at a time.
pub trait AutonomousCycle: Send + Sync {
    /// The agent's name, used as the `*` in the `*:detection` event topic.
    fn agent_name(&self) -> &str;

    /// Run one reasoning cycle for `subject_id`.
    fn run_cycle<'a>(&'a self, subject_id: &'a str) -> Pin<Box<dyn Future<Output = InvestigationReport> + Send + 'a>>;

    /// The shared messenger, for broadcasting a post-cycle summary.
    fn messenger(&self) -> &SharedMessenger;
}

impl AutonomousCycle for CrossDomainAgent {
    fn agent_name(&self) -> &str {
        self.base().name()
    }

    fn run_cycle<'a>(&'a self, subject_id: &'a str) -> Pin<Box<dyn Future<Output = InvestigationReport> + Send + 'a>> {
        Box::pin(self.scan(subject_id))
    }

    fn messenger(&self) -> &SharedMessenger {
        self.base().messenger()
    }
}

impl AutonomousCycle for PolicyEvolutionAgent {
    fn agent_name(&self) -> &str {
        self.base().name()
    }

    fn run_cycle<'a>(&'a self, subject_id: &'a str) -> Pin<Box<dyn Future<Output = InvestigationReport> + Send + 'a>> {
        Box::pin(self.scan(subject_id))
    }

    fn messenger(&self) -> &SharedMessenger {
        self.base().messenger()
    }
}

/// A minimal test/mock agent, handy for exercising the scheduler without a
/// full `BaseAgent` wiring.
pub struct MockCycle {
    /// Name reported by `agent_name`.
    pub name: String,
    /// Shared messenger this mock broadcasts through.
    pub messenger: SharedMessenger,
}

impl AutonomousCycle for MockCycle {
    fn agent_name(&self) -> &str {
        &self.name
    }

    fn run_cycle<'a>(&'a self, subject_id: &'a str) -> Pin<Box<dyn Future<Output = InvestigationReport> + Send + 'a>> {
        let subject_id = subject_id.to_string();
        Box::pin(async move {
            InvestigationReport {
                subject_id,
                understanding: String::new(),
                actions: Vec::new(),
                recommendation: fraudguard_agent::Recommendation::Approve,
                composite_score: 0.0,
                contributions: Vec::new(),
                calibrated_confidence: 0.5,
                chain_of_thought: serde_json::Value::Null,
            }
        })
    }

    fn messenger(&self) -> &SharedMessenger {
        &self.messenger
    }
}

/// Convenience: a messenger shared by nothing else, for a standalone mock.
#[must_use]
pub fn standalone_messenger() -> SharedMessenger {
    Arc::new(Messenger::new())
}
