//! Collaboration strategies for running a panel of agents against the same
//! input: sequential (each sees the prior result), parallel (fan-out/
//! fan-in), and consensus (majority vote by string-equality).

use std::sync::Arc;

use fraudguard_agent::{InvestigationReport, Messenger};
use futures::future::join_all;

use crate::agent::OrchestratedAgent;

/// Runs `agents` one after another; every agent after the first receives
/// the prior agent's serialized report as its input, so later agents can
/// build on earlier findings.
pub async fn sequential(agents: &[Arc<dyn OrchestratedAgent>], seed_input: &str) -> Vec<InvestigationReport> {
    let mut reports = Vec::with_capacity(agents.len());
    let mut input = seed_input.to_string();
    for agent in agents {
        let report = agent.invoke(&input).await;
        input = serde_json::to_string(&report).unwrap_or(input);
        reports.push(report);
    }
    reports
}

/// Fans the same input out to every agent concurrently and waits for all
/// of them.
pub async fn parallel(agents: &[Arc<dyn OrchestratedAgent>], input: &str) -> Vec<InvestigationReport> {
    join_all(agents.iter().map(|agent| agent.invoke(input))).await
}

/// Runs every agent concurrently and returns both their reports and the
/// majority-vote recommendation by string-equality (`None` on a tie or an
/// empty panel).
pub async fn consensus(agents: &[Arc<dyn OrchestratedAgent>], input: &str) -> (Vec<InvestigationReport>, Option<String>) {
    let reports = parallel(agents, input).await;
    let decisions: Vec<String> = reports.iter().map(|report| format!("{:?}", report.recommendation)).collect();
    let decision = Messenger::tally_consensus(&decisions);
    (reports, decision)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use fraudguard_agent::{AgentStatus, Recommendation};

    use super::*;
    use crate::agent::MockOrchestratedAgent;

    fn agent(name: &str, recommendation: Recommendation) -> Arc<dyn OrchestratedAgent> {
        Arc::new(MockOrchestratedAgent {
            id: name.to_string(),
            name: name.to_string(),
            role: "test".to_string(),
            capabilities: HashSet::new(),
            status: AgentStatus::Idle,
            messenger: Arc::new(Messenger::new()),
            recommendation,
        })
    }

    #[tokio::test]
    async fn sequential_threads_prior_report_as_next_input() {
        let agents = vec![agent("a1", Recommendation::Monitor), agent("a2", Recommendation::Approve)];
        let reports = sequential(&agents, "S1").await;
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].subject_id, "S1");
        assert!(reports[1].subject_id.contains("MONITOR"));
    }

    #[tokio::test]
    async fn parallel_runs_every_agent_against_the_same_input() {
        let agents = vec![agent("a1", Recommendation::Approve), agent("a2", Recommendation::Approve)];
        let reports = parallel(&agents, "S1").await;
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.subject_id == "S1"));
    }

    #[tokio::test]
    async fn consensus_picks_the_majority_recommendation() {
        let agents = vec![agent("a1", Recommendation::Block), agent("a2", Recommendation::Block), agent("a3", Recommendation::Approve)];
        let (reports, decision) = consensus(&agents, "S1").await;
        assert_eq!(reports.len(), 3);
        assert_eq!(decision, Some("Block".to_string()));
    }

    #[tokio::test]
    async fn consensus_returns_none_on_an_even_split() {
        let agents = vec![agent("a1", Recommendation::Block), agent("a2", Recommendation::Approve)];
        let (_, decision) = consensus(&agents, "S1").await;
        assert_eq!(decision, None);
    }
}
