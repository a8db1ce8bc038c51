//! The two concrete agents wired up by the server's scan endpoints.

use std::collections::HashSet;

use serde_json::json;

use crate::base_agent::{AgentDependencies, BaseAgent, InvestigationReport, ReasoningContext};

/// Investigates a single seller across every risk domain at once: pulls the
/// graph neighborhood, the current risk profile, transaction velocity, and
/// precedent cases, then scores the combined evidence.
pub struct CrossDomainAgent {
    base: BaseAgent,
}

impl CrossDomainAgent {
    /// Construct the agent, registering it with the shared messenger.
    #[must_use]
    pub fn new(deps: AgentDependencies) -> Self {
        let base = BaseAgent::new(
            "cross-domain-agent",
            "cross-domain",
            "cross-domain fraud investigator",
            HashSet::from(["cross-domain-investigation".to_string(), "graph-investigation".to_string()]),
            true,
            deps,
        );
        Self { base }
    }

    /// The shared reasoning base, for status/messaging/detection access.
    #[must_use]
    pub fn base(&self) -> &BaseAgent {
        &self.base
    }

    /// Run a single autonomous cycle for `seller_id`, matching the
    /// `POST /agents/cross-domain/scan` trigger endpoint.
    pub async fn scan(&self, seller_id: &str) -> InvestigationReport {
        let input = json!({ "sellerId": seller_id, "trigger": "cross-domain-scan" });
        self.base.reason(input, &ReasoningContext { subject_id: seller_id }).await
    }
}

/// Reviews recent decisions and detections across sellers to look for
/// systemic policy drift (e.g. a rule that consistently under- or
/// over-triggers), rather than investigating a single seller in isolation.
pub struct PolicyEvolutionAgent {
    base: BaseAgent,
}

impl PolicyEvolutionAgent {
    /// Construct the agent, registering it with the shared messenger.
    #[must_use]
    pub fn new(deps: AgentDependencies) -> Self {
        let base = BaseAgent::new(
            "policy-evolution-agent",
            "policy-evolution",
            "policy evolution reviewer",
            HashSet::from(["policy-evolution".to_string()]),
            false,
            deps,
        );
        Self { base }
    }

    /// The shared reasoning base, for status/messaging/detection access.
    #[must_use]
    pub fn base(&self) -> &BaseAgent {
        &self.base
    }

    /// Run a single autonomous cycle reviewing `scope` (e.g. a domain name
    /// or `"all"`), matching the `POST /agents/policy-evolution/scan`
    /// trigger endpoint.
    pub async fn scan(&self, scope: &str) -> InvestigationReport {
        let input = json!({ "scope": scope, "trigger": "policy-evolution-scan" });
        self.base.reason(input, &ReasoningContext { subject_id: scope }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudguard_completion::MockCompletionService;
    use fraudguard_core::environment::{SystemClock, UuidGenerator};
    use fraudguard_knowledge::KnowledgeBase;
    use fraudguard_tools::ToolRegistry;
    use std::sync::Arc;

    fn deps() -> AgentDependencies {
        let clock = Arc::new(SystemClock);
        let id_generator = Arc::new(UuidGenerator);
        AgentDependencies {
            tools: ToolRegistry::new(),
            completion: Arc::new(MockCompletionService),
            knowledge: Arc::new(KnowledgeBase::new(clock.clone(), id_generator.clone())),
            messenger: Arc::new(crate::messenger::Messenger::new()),
            clock,
            id_generator,
        }
    }

    #[tokio::test]
    async fn cross_domain_agent_scan_returns_a_report_for_the_seller() {
        let agent = CrossDomainAgent::new(deps());
        let report = agent.scan("S1").await;
        assert_eq!(report.subject_id, "S1");
    }

    #[tokio::test]
    async fn policy_evolution_agent_scan_does_not_force_ml_query() {
        let agent = PolicyEvolutionAgent::new(deps());
        let report = agent.scan("ato").await;
        assert!(!report.actions.iter().any(|a| a.tool == "ml_query"));
    }
}
