//! Application state: the dependency-injection container every handler
//! reads from via `axum::extract::State`.
//!
//! Everything here is an `Arc`, built once at startup by
//! [`crate::startup::run`] and cheaply cloned per request.

use std::sync::Arc;

use fraudguard_agent::{CrossDomainAgent, Messenger, PolicyEvolutionAgent, SharedMessenger};
use fraudguard_completion::resilient::{ResilientCompletionService, ResilientMlPredictor};
use fraudguard_completion::{CompletionService, MlPredictor, MockCompletionService, MockMlPredictor};
use fraudguard_core::environment::{Clock, IdGenerator, SystemClock, UuidGenerator};
use fraudguard_core::event_bus::{BroadcastEventBus, EventBus};
use fraudguard_features::FeatureStore;
use fraudguard_graph::GraphEngine;
use fraudguard_knowledge::KnowledgeBase;
use fraudguard_orchestrator::AgentRegistry;
use fraudguard_risk::RiskProfileEngine;
use fraudguard_runtime::circuit_breaker::CircuitBreakerConfig;
use fraudguard_runtime::health::SystemHealthCheck;
use fraudguard_runtime::metrics::MetricsServer;
use fraudguard_runtime::retry::RetryPolicy;
use fraudguard_runtime::AppConfig;
use fraudguard_scheduler::AgentScheduler;
use fraudguard_streaming::StreamingEngine;
use fraudguard_tools::ToolRegistry;
use std::time::Duration;
use tokio::sync::Mutex;

/// Everything a handler might need, shared behind `Arc`s.
pub struct AppStateInner {
    /// Resolved environment configuration.
    pub config: AppConfig,
    /// Shared internal event bus every engine/agent publishes onto.
    pub event_bus: Arc<dyn EventBus>,
    /// The partitioned streaming log.
    pub streaming: Arc<StreamingEngine>,
    /// Online/offline feature store.
    pub features: Arc<FeatureStore>,
    /// Seller/identifier property graph.
    pub graph: Arc<GraphEngine>,
    /// Per-seller composite risk profile engine.
    pub risk: Arc<RiskProfileEngine>,
    /// Fraud-investigation knowledge base.
    pub knowledge: Arc<KnowledgeBase>,
    /// Tool registry shared by every agent.
    pub tools: ToolRegistry,
    /// Messenger shared by every registered agent.
    pub messenger: SharedMessenger,
    /// Cross-domain investigation agent, for `POST /agents/cross-domain/scan`.
    pub cross_domain_agent: Arc<CrossDomainAgent>,
    /// Policy evolution agent, for `POST /agents/policy-evolution/scan`.
    pub policy_evolution_agent: Arc<PolicyEvolutionAgent>,
    /// Registry both agents are addressable through.
    pub registry: Arc<AgentRegistry>,
    /// Autonomous schedulers driving each agent's background cycle.
    pub schedulers: Vec<Arc<AgentScheduler>>,
    /// Aggregated Kubernetes-style health check.
    pub health: Arc<SystemHealthCheck>,
    /// Prometheus metrics recorder, guarded for the rare concurrent-start case.
    pub metrics: Arc<Mutex<MetricsServer>>,
}

/// Cheaply-cloneable handle to [`AppStateInner`], the type every Axum
/// handler extracts via `State<AppState>`.
#[derive(Clone)]
pub struct AppState(Arc<AppStateInner>);

impl AppState {
    /// Wires up every engine and agent against `config`, ready to be handed
    /// to [`crate::routes::build_router`].
    #[must_use]
    pub fn bootstrap(config: AppConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let id_generator: Arc<dyn IdGenerator> = Arc::new(UuidGenerator);

        let event_bus: Arc<dyn EventBus> = Arc::new(BroadcastEventBus::default());
        let streaming = Arc::new(StreamingEngine::new(event_bus.clone(), clock.clone()));
        let features = Arc::new(FeatureStore::new(clock.clone()));
        let graph = Arc::new(GraphEngine::new());
        let risk = Arc::new(RiskProfileEngine::new(clock.clone(), id_generator.clone()));
        let knowledge = Arc::new(KnowledgeBase::new(clock.clone(), id_generator.clone()));

        let breaker_config = CircuitBreakerConfig {
            failure_threshold: config.resilience.circuit_breaker_threshold,
            timeout: config.resilience.circuit_breaker_timeout(),
            success_threshold: 2,
        };
        let retry_policy = RetryPolicy {
            max_retries: config.resilience.max_retries,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        };
        let completion: Arc<dyn CompletionService> =
            Arc::new(ResilientCompletionService::new(MockCompletionService, breaker_config.clone(), retry_policy.clone()));
        let ml_predictor: Arc<dyn MlPredictor> = Arc::new(ResilientMlPredictor::new(MockMlPredictor, breaker_config, retry_policy));

        let tools = ToolRegistry::new();
        let (tool, executor) = fraudguard_tools::feature_lookup_tool(features.clone());
        tools.register(tool, executor);
        let (tool, executor) = fraudguard_tools::graph_query_tool(graph.clone());
        tools.register(tool, executor);
        let (tool, executor) = fraudguard_tools::ml_query_tool(ml_predictor.clone());
        tools.register(tool, executor);
        let (tool, executor) = fraudguard_tools::risk_history_tool(risk.clone());
        tools.register(tool, executor);
        let (tool, executor) = fraudguard_tools::sequence_match_tool(risk.clone());
        tools.register(tool, executor);
        let (tool, executor) = fraudguard_tools::velocity_check_tool(features.clone());
        tools.register(tool, executor);
        let (tool, executor) = fraudguard_tools::similar_case_lookup_tool(knowledge.clone());
        tools.register(tool, executor);

        let messenger: SharedMessenger = Arc::new(Messenger::new());

        let cross_domain_agent = Arc::new(CrossDomainAgent::new(fraudguard_agent::AgentDependencies {
            tools: tools.clone(),
            completion: completion.clone(),
            knowledge: knowledge.clone(),
            messenger: messenger.clone(),
            clock: clock.clone(),
            id_generator: id_generator.clone(),
        }));
        let policy_evolution_agent = Arc::new(PolicyEvolutionAgent::new(fraudguard_agent::AgentDependencies {
            tools: tools.clone(),
            completion: completion.clone(),
            knowledge: knowledge.clone(),
            messenger: messenger.clone(),
            clock: clock.clone(),
            id_generator: id_generator.clone(),
        }));

        let mut registry = AgentRegistry::new();
        registry.register(cross_domain_agent.clone());
        registry.register(policy_evolution_agent.clone());
        let registry = Arc::new(registry);

        let scheduler_config = |topics: Vec<String>| fraudguard_scheduler::SchedulerConfig {
            scan_interval_ms: config.scheduler.scan_interval_ms,
            event_acceleration_threshold: config.scheduler.event_acceleration_threshold,
            subscribed_topics: topics,
        };
        let schedulers = vec![
            AgentScheduler::new(
                scheduler_config(vec!["risk.events".to_string()]),
                cross_domain_agent.clone(),
                event_bus.clone(),
                knowledge.clone(),
                clock.clone(),
            ),
            AgentScheduler::new(
                scheduler_config(vec!["alerts.created".to_string()]),
                policy_evolution_agent.clone(),
                event_bus.clone(),
                knowledge.clone(),
                clock.clone(),
            ),
        ];

        let mut health = SystemHealthCheck::new();
        health.add_check(Arc::new(EventBusHealthCheck));
        let health = Arc::new(health);

        let metrics = Arc::new(Mutex::new(MetricsServer::new(
            format!("0.0.0.0:{}", config.server.metrics_port).parse().unwrap_or_else(|_| ([0, 0, 0, 0], 9090).into()),
        )));

        Self(Arc::new(AppStateInner {
            config,
            event_bus,
            streaming,
            features,
            graph,
            risk,
            knowledge,
            tools,
            messenger,
            cross_domain_agent,
            policy_evolution_agent,
            registry,
            schedulers,
            health,
            metrics,
        }))
    }
}

impl std::ops::Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Trivially healthy placeholder: the event bus has no failure mode of its
/// own to report (a lagging subscriber drops messages, it never errors).
struct EventBusHealthCheck;

#[async_trait::async_trait]
impl fraudguard_runtime::health::HealthCheckable for EventBusHealthCheck {
    async fn check_health(&self) -> fraudguard_runtime::health::ComponentHealth {
        fraudguard_runtime::health::ComponentHealth::healthy("event bus is in-process and always reachable")
    }

    fn component_name(&self) -> &str {
        "event_bus"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_wires_every_engine_without_panicking() {
        let state = AppState::bootstrap(AppConfig::default());
        assert_eq!(state.registry.len(), 2);
        assert_eq!(state.schedulers.len(), 2);
    }

    #[test]
    fn app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
