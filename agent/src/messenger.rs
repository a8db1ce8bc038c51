//! Inter-agent messaging: unicast, broadcast, help-request/response with
//! timeout, task delegation, and consensus voting.
//!
//! Grounded on the worker-registry/subtask shape of the orchestrator-workers
//! pattern: agents are addressed by name the way workers are addressed by
//! `worker_type`, and a help request is a subtask routed to whichever
//! registered agent can serve it rather than a fixed worker.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::warn;

use crate::error::AgentError;

/// A message delivered to exactly one named agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnicastMessage {
    /// Sending agent's name.
    pub from: String,
    /// Receiving agent's name.
    pub to: String,
    /// Free-form payload.
    pub payload: serde_json::Value,
}

/// A message delivered to every registered agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastMessage {
    /// Sending agent's name.
    pub from: String,
    /// Free-form payload.
    pub payload: serde_json::Value,
}

/// A pending request for help with some capability, awaiting orchestrator
/// routing to a capable agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpRequest {
    /// Correlates the eventual response back to this request.
    pub correlation_id: String,
    /// Requesting agent's name.
    pub from: String,
    /// The capability being requested (e.g. `"graph-investigation"`).
    pub capability: String,
    /// Free-form payload describing the help needed.
    pub payload: serde_json::Value,
}

/// A response to a previously routed help request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpResponse {
    /// The correlation id of the request this answers.
    pub correlation_id: String,
    /// Whether the responding agent could help.
    pub success: bool,
    /// Free-form response payload.
    pub payload: serde_json::Value,
}

/// A task handed from one agent to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delegation {
    /// Delegating agent's name.
    pub from: String,
    /// Delegate agent's name.
    pub to: String,
    /// The task description.
    pub task: String,
    /// Task input.
    pub input: serde_json::Value,
}

struct Inner {
    inboxes: HashMap<String, VecDeque<serde_json::Value>>,
    pending_help: VecDeque<HelpRequest>,
    waiters: HashMap<String, oneshot::Sender<HelpResponse>>,
}

/// Shared messaging hub every agent and the orchestrator hold an `Arc` to.
///
/// Unicast/broadcast delivery is a per-agent bounded queue (drained by the
/// agent's own reasoning cycle); help requests are queued separately for the
/// orchestrator's routing loop to drain every 100ms.
pub struct Messenger {
    inner: Mutex<Inner>,
}

impl Messenger {
    /// Create an empty messenger hub.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner { inboxes: HashMap::new(), pending_help: VecDeque::new(), waiters: HashMap::new() }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an agent so it can receive unicast/broadcast deliveries.
    pub fn register(&self, agent_name: &str) {
        self.lock().inboxes.entry(agent_name.to_string()).or_default();
    }

    /// Send a message to exactly one named agent.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownRecipient`] if `to` was never registered.
    pub fn unicast(&self, from: &str, to: &str, payload: serde_json::Value) -> Result<(), AgentError> {
        let mut inner = self.lock();
        let inbox = inner.inboxes.get_mut(to).ok_or_else(|| AgentError::UnknownRecipient(to.to_string()))?;
        inbox.push_back(serde_json::json!({ "from": from, "payload": payload }));
        Ok(())
    }

    /// Send a message to every registered agent other than the sender.
    pub fn broadcast(&self, from: &str, payload: serde_json::Value) {
        let mut inner = self.lock();
        for (name, inbox) in &mut inner.inboxes {
            if name != from {
                inbox.push_back(serde_json::json!({ "from": from, "payload": payload.clone() }));
            }
        }
    }

    /// Delegate a task to another agent; delivered as a unicast envelope
    /// tagged `"kind": "delegation"`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownRecipient`] if `to` was never registered.
    pub fn delegate(&self, delegation: Delegation) -> Result<(), AgentError> {
        self.unicast(
            &delegation.from.clone(),
            &delegation.to.clone(),
            serde_json::json!({ "kind": "delegation", "task": delegation.task, "input": delegation.input }),
        )
    }

    /// Drain every message queued for `agent_name`, oldest first.
    pub fn drain_inbox(&self, agent_name: &str) -> Vec<serde_json::Value> {
        let mut inner = self.lock();
        inner.inboxes.get_mut(agent_name).map(std::mem::take).map(Vec::from).unwrap_or_default()
    }

    /// Queue a help request for the orchestrator's routing loop and return a
    /// future that resolves to the eventual response, or times out.
    pub fn request_help(
        &self,
        from: &str,
        capability: &str,
        payload: serde_json::Value,
        correlation_id: String,
        timeout: Duration,
    ) -> impl std::future::Future<Output = Result<HelpResponse, AgentError>> {
        let (tx, rx) = oneshot::channel();
        {
            let mut inner = self.lock();
            inner.waiters.insert(correlation_id.clone(), tx);
            inner.pending_help.push_back(HelpRequest {
                correlation_id: correlation_id.clone(),
                from: from.to_string(),
                capability: capability.to_string(),
                payload,
            });
        }

        async move {
            match tokio::time::timeout(timeout, rx).await {
                Ok(Ok(response)) => Ok(response),
                _ => Err(AgentError::HelpRequestTimedOut {
                    correlation_id,
                    timeout_ms: timeout.as_millis() as u64,
                }),
            }
        }
    }

    /// Drain every pending help request, for the orchestrator's routing loop.
    pub fn drain_help_requests(&self) -> Vec<HelpRequest> {
        let mut inner = self.lock();
        std::mem::take(&mut inner.pending_help).into()
    }

    /// Deliver a response to a previously queued help request. Returns
    /// `false` if no waiter is registered for the correlation id (already
    /// timed out or unknown).
    pub fn deliver_help_response(&self, response: HelpResponse) -> bool {
        let mut inner = self.lock();
        match inner.waiters.remove(&response.correlation_id) {
            Some(tx) => tx.send(response).is_ok(),
            None => {
                warn!(correlation_id = %response.correlation_id, "help response for unknown or expired request");
                false
            }
        }
    }

    /// Majority vote by string-equality on the decisions cast. Returns
    /// `None` on an empty vote or an exact tie among more than one value.
    #[must_use]
    pub fn tally_consensus(decisions: &[String]) -> Option<String> {
        if decisions.is_empty() {
            return None;
        }
        let mut tally: HashMap<&str, usize> = HashMap::new();
        for decision in decisions {
            *tally.entry(decision.as_str()).or_insert(0) += 1;
        }
        let max_count = *tally.values().max()?;
        let winners: Vec<&&str> = tally.iter().filter(|(_, count)| **count == max_count).map(|(d, _)| d).collect();
        if winners.len() == 1 {
            Some((*winners[0]).to_string())
        } else {
            None
        }
    }
}

impl Default for Messenger {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle type used by agents and the orchestrator alike.
pub type SharedMessenger = Arc<Messenger>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicast_delivers_only_to_the_named_recipient() {
        let messenger = Messenger::new();
        messenger.register("a");
        messenger.register("b");
        messenger.unicast("a", "b", serde_json::json!({"hello": true})).unwrap();

        assert_eq!(messenger.drain_inbox("b").len(), 1);
        assert!(messenger.drain_inbox("a").is_empty());
    }

    #[test]
    fn unicast_to_unknown_recipient_errors() {
        let messenger = Messenger::new();
        let result = messenger.unicast("a", "ghost", serde_json::json!({}));
        assert!(matches!(result, Err(AgentError::UnknownRecipient(_))));
    }

    #[test]
    fn broadcast_skips_the_sender() {
        let messenger = Messenger::new();
        messenger.register("a");
        messenger.register("b");
        messenger.register("c");
        messenger.broadcast("a", serde_json::json!({"n": 1}));

        assert!(messenger.drain_inbox("a").is_empty());
        assert_eq!(messenger.drain_inbox("b").len(), 1);
        assert_eq!(messenger.drain_inbox("c").len(), 1);
    }

    #[tokio::test]
    async fn help_request_resolves_when_response_delivered() {
        let messenger = Arc::new(Messenger::new());
        let m = messenger.clone();
        let waiting = tokio::spawn(async move {
            m.request_help("a", "graph-investigation", serde_json::json!({}), "corr-1".into(), Duration::from_secs(1)).await
        });

        tokio::task::yield_now().await;
        let requests = messenger.drain_help_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].capability, "graph-investigation");

        messenger.deliver_help_response(HelpResponse {
            correlation_id: "corr-1".into(),
            success: true,
            payload: serde_json::json!({"answer": 42}),
        });

        let response = waiting.await.unwrap().unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn help_request_times_out_without_a_response() {
        let messenger = Messenger::new();
        let result = messenger
            .request_help("a", "cap", serde_json::json!({}), "corr-2".into(), Duration::from_millis(20))
            .await;
        assert!(matches!(result, Err(AgentError::HelpRequestTimedOut { .. })));
    }

    #[test]
    fn tally_consensus_picks_the_majority_decision() {
        let decisions = vec!["BLOCK".to_string(), "BLOCK".to_string(), "REVIEW".to_string()];
        assert_eq!(Messenger::tally_consensus(&decisions), Some("BLOCK".to_string()));
    }

    #[test]
    fn tally_consensus_returns_none_on_a_tie() {
        let decisions = vec!["BLOCK".to_string(), "REVIEW".to_string()];
        assert_eq!(Messenger::tally_consensus(&decisions), None);
    }
}
