//! The object-safe view of an agent the orchestrator addresses by id, role,
//! or name and invokes with a single string input — mirroring how the
//! worker-registry pattern addresses workers by type and hands each a
//! string input, generalized from a fixed worker-type key to a full agent
//! identity (id/role/name/capabilities/status).

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use fraudguard_agent::{AgentStatus, CrossDomainAgent, InvestigationReport, PolicyEvolutionAgent, SharedMessenger};

/// An agent the orchestrator can look up, ask about, and invoke.
pub trait OrchestratedAgent: Send + Sync {
    /// Stable identifier, unique within a registry.
    fn id(&self) -> &str;
    /// Human-readable name, also unique within a registry.
    fn name(&self) -> &str;
    /// Role this agent plays (e.g. `"cross-domain"`, `"policy-evolution"`).
    fn role(&self) -> &str;
    /// Capabilities this agent advertises for help-request routing.
    fn capabilities(&self) -> &HashSet<String>;
    /// Current position in the reasoning cycle.
    fn status(&self) -> AgentStatus;
    /// The messenger this agent shares with every other registered agent.
    fn messenger(&self) -> &SharedMessenger;
    /// Run one reasoning cycle against `input`.
    fn invoke<'a>(&'a self, input: &'a str) -> Pin<Box<dyn Future<Output = InvestigationReport> + Send + 'a>>;
}

impl OrchestratedAgent for CrossDomainAgent {
    fn id(&self) -> &str {
        self.base().agent_id()
    }

    fn name(&self) -> &str {
        self.base().name()
    }

    fn role(&self) -> &str {
        self.base().role()
    }

    fn capabilities(&self) -> &HashSet<String> {
        self.base().capabilities()
    }

    fn status(&self) -> AgentStatus {
        self.base().status()
    }

    fn messenger(&self) -> &SharedMessenger {
        self.base().messenger()
    }

    fn invoke<'a>(&'a self, input: &'a str) -> Pin<Box<dyn Future<Output = InvestigationReport> + Send + 'a>> {
        Box::pin(self.scan(input))
    }
}

impl OrchestratedAgent for PolicyEvolutionAgent {
    fn id(&self) -> &str {
        self.base().agent_id()
    }

    fn name(&self) -> &str {
        self.base().name()
    }

    fn role(&self) -> &str {
        self.base().role()
    }

    fn capabilities(&self) -> &HashSet<String> {
        self.base().capabilities()
    }

    fn status(&self) -> AgentStatus {
        self.base().status()
    }

    fn messenger(&self) -> &SharedMessenger {
        self.base().messenger()
    }

    fn invoke<'a>(&'a self, input: &'a str) -> Pin<Box<dyn Future<Output = InvestigationReport> + Send + 'a>> {
        Box::pin(self.scan(input))
    }
}

/// A minimal test/mock agent, for exercising registry/workflow/collaboration
/// logic without wiring a full `BaseAgent`.
pub struct MockOrchestratedAgent {
    /// Stable id, unique within a registry.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role label.
    pub role: String,
    /// Advertised capabilities.
    pub capabilities: HashSet<String>,
    /// Status reported by `status()`.
    pub status: AgentStatus,
    /// Shared messenger.
    pub messenger: SharedMessenger,
    /// Recommendation the mock's `invoke` always returns.
    pub recommendation: fraudguard_agent::Recommendation,
}

impl OrchestratedAgent for MockOrchestratedAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> &str {
        &self.role
    }

    fn capabilities(&self) -> &HashSet<String> {
        &self.capabilities
    }

    fn status(&self) -> AgentStatus {
        self.status
    }

    fn messenger(&self) -> &SharedMessenger {
        &self.messenger
    }

    fn invoke<'a>(&'a self, input: &'a str) -> Pin<Box<dyn Future<Output = InvestigationReport> + Send + 'a>> {
        let subject_id = input.to_string();
        let recommendation = self.recommendation;
        Box::pin(async move {
            InvestigationReport {
                subject_id,
                understanding: String::new(),
                actions: Vec::new(),
                recommendation,
                composite_score: 0.0,
                contributions: Vec::new(),
                calibrated_confidence: 0.5,
                chain_of_thought: serde_json::Value::Null,
            }
        })
    }
}
