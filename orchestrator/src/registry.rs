//! Registry of agents keyed by id, role, or name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::agent::OrchestratedAgent;

/// Holds every agent the orchestrator can address, indexed for lookup by
/// id, by name, or by role.
#[derive(Default)]
pub struct AgentRegistry {
    by_id: HashMap<String, Arc<dyn OrchestratedAgent>>,
    by_name: HashMap<String, Arc<dyn OrchestratedAgent>>,
}

impl AgentRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent under both its id and its name.
    pub fn register(&mut self, agent: Arc<dyn OrchestratedAgent>) {
        self.by_id.insert(agent.id().to_string(), agent.clone());
        self.by_name.insert(agent.name().to_string(), agent);
    }

    /// Look an agent up by id, falling back to name.
    #[must_use]
    pub fn get(&self, id_or_name: &str) -> Option<&Arc<dyn OrchestratedAgent>> {
        self.by_id.get(id_or_name).or_else(|| self.by_name.get(id_or_name))
    }

    /// Every registered agent advertising `role`.
    #[must_use]
    pub fn by_role(&self, role: &str) -> Vec<&Arc<dyn OrchestratedAgent>> {
        self.by_id.values().filter(|agent| agent.role() == role).collect()
    }

    /// Every registered agent advertising `capability`.
    #[must_use]
    pub fn by_capability(&self, capability: &str) -> Vec<&Arc<dyn OrchestratedAgent>> {
        self.by_id.values().filter(|agent| agent.capabilities().contains(capability)).collect()
    }

    /// Number of distinct registered agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the registry has no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
