//! Help-request routing: every 100ms, drain pending help requests from the
//! messenger and route each to an agent advertising the requested
//! capability, preferring an idle one.

use std::sync::Arc;
use std::time::Duration;

use fraudguard_agent::{HelpRequest, HelpResponse, SharedMessenger};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::registry::AgentRegistry;

/// How often the routing loop drains the messenger's pending help requests.
pub const ROUTING_INTERVAL_MS: u64 = 100;

/// Routes help requests queued on a shared messenger to capable agents.
pub struct HelpRouter {
    registry: Arc<AgentRegistry>,
    messenger: SharedMessenger,
}

impl HelpRouter {
    /// Construct a router over `registry`'s agents, draining `messenger`.
    #[must_use]
    pub fn new(registry: Arc<AgentRegistry>, messenger: SharedMessenger) -> Self {
        Self { registry, messenger }
    }

    /// Drain and route every currently pending help request once.
    pub fn route_pending(&self) {
        for request in self.messenger.drain_help_requests() {
            self.route_one(request);
        }
    }

    fn route_one(&self, request: HelpRequest) {
        let candidates = self.registry.by_capability(&request.capability);
        let chosen = candidates.iter().find(|agent| agent.status().is_idle()).or_else(|| candidates.first());

        let Some(agent) = chosen else {
            warn!(capability = %request.capability, "no agent advertises the requested capability");
            self.messenger.deliver_help_response(HelpResponse {
                correlation_id: request.correlation_id,
                success: false,
                payload: serde_json::json!({"error": "no capable agent"}),
            });
            return;
        };

        let delivery = self.messenger.unicast(
            "orchestrator",
            agent.name(),
            serde_json::json!({
                "kind": "helpRequest",
                "correlationId": request.correlation_id,
                "from": request.from,
                "capability": request.capability,
                "payload": request.payload,
            }),
        );

        if let Err(err) = delivery {
            warn!(%err, agent = agent.name(), "failed to route help request");
            self.messenger.deliver_help_response(HelpResponse {
                correlation_id: request.correlation_id,
                success: false,
                payload: serde_json::json!({"error": err.to_string()}),
            });
        }
    }

    /// Run the routing loop until `shutdown` reports true.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(Duration::from_millis(ROUTING_INTERVAL_MS));
        info!("help-request routing loop running");
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    self.route_pending();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use fraudguard_agent::{AgentStatus, Messenger, Recommendation};

    use super::*;
    use crate::agent::MockOrchestratedAgent;

    fn build(status: AgentStatus, messenger: SharedMessenger) -> Arc<AgentRegistry> {
        let mut registry = AgentRegistry::new();
        registry.register(Arc::new(MockOrchestratedAgent {
            id: "a1".to_string(),
            name: "helper".to_string(),
            role: "cross-domain".to_string(),
            capabilities: HashSet::from(["graph-investigation".to_string()]),
            status,
            messenger: messenger.clone(),
            recommendation: Recommendation::Approve,
        }));
        messenger.register("helper");
        Arc::new(registry)
    }

    #[test]
    fn routes_to_a_capable_agent() {
        let messenger = Arc::new(Messenger::new());
        let registry = build(AgentStatus::Idle, messenger.clone());
        let router = HelpRouter::new(registry, messenger.clone());

        messenger.register("requester");
        let _ = messenger.request_help("requester", "graph-investigation", serde_json::json!({}), "c1".to_string(), Duration::from_millis(50));
        router.route_pending();

        let inbox = messenger.drain_inbox("helper");
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0]["payload"]["correlationId"], "c1");
    }

    #[tokio::test]
    async fn no_capable_agent_delivers_a_failed_response() {
        let messenger = Arc::new(Messenger::new());
        let registry = Arc::new(AgentRegistry::new());
        let router = HelpRouter::new(registry, messenger.clone());

        messenger.register("requester");
        let waiting = messenger.request_help("requester", "unknown-capability", serde_json::json!({}), "c1".to_string(), Duration::from_millis(200));
        router.route_pending();

        let response = waiting.await.expect("router delivers a response instead of timing out");
        assert!(!response.success);
    }
}
