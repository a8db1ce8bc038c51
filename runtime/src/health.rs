//! Kubernetes-ready health check aggregation: liveness and readiness probes
//! over a registry of health-checkable components.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

/// Health status for a single component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Fully operational
    Healthy,
    /// Degraded but still able to serve (e.g. high latency)
    Degraded,
    /// Not operational
    Unhealthy,
}

impl HealthStatus {
    /// Healthy or degraded components can still accept traffic.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Healthy | Self::Degraded)
    }

    #[must_use]
    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// One component's health check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    pub message: String,
    pub last_check: SystemTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

impl ComponentHealth {
    #[must_use]
    pub fn healthy(message: impl Into<String>) -> Self {
        Self { status: HealthStatus::Healthy, message: message.into(), last_check: SystemTime::now(), details: None }
    }

    #[must_use]
    pub fn degraded(message: impl Into<String>) -> Self {
        Self { status: HealthStatus::Degraded, message: message.into(), last_check: SystemTime::now(), details: None }
    }

    #[must_use]
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self { status: HealthStatus::Unhealthy, message: message.into(), last_check: SystemTime::now(), details: None }
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.get_or_insert_with(HashMap::new).insert(key.into(), value.into());
        self
    }
}

/// Implemented by components that report health: the event bus, each
/// autonomous scheduler, the help-router, the completion/ML boundary.
#[async_trait]
pub trait HealthCheckable: Send + Sync {
    /// Should complete quickly; callers wrap this with a timeout.
    async fn check_health(&self) -> ComponentHealth;

    fn component_name(&self) -> &str;
}

/// Aggregates health across every registered component.
pub struct SystemHealthCheck {
    checks: Vec<Arc<dyn HealthCheckable>>,
}

impl SystemHealthCheck {
    #[must_use]
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn add_check(&mut self, check: Arc<dyn HealthCheckable>) {
        self.checks.push(check);
    }

    /// Run every registered check concurrently.
    pub async fn check_all(&self) -> HashMap<String, ComponentHealth> {
        let futures = self.checks.iter().map(|check| async move {
            (check.component_name().to_string(), check.check_health().await)
        });
        futures::future::join_all(futures).await.into_iter().collect()
    }

    /// Unhealthy if any component is unhealthy, degraded if any is
    /// degraded, healthy only if all components are healthy.
    pub async fn overall_health(&self) -> HealthStatus {
        let results = self.check_all().await;
        if results.values().any(|h| h.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if results.values().any(|h| h.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}

impl Default for SystemHealthCheck {
    fn default() -> Self {
        Self::new()
    }
}

/// Kubernetes-style liveness/readiness endpoints over a `SystemHealthCheck`.
#[derive(Clone)]
pub struct K8sHealthEndpoints {
    system_health: Arc<SystemHealthCheck>,
}

impl K8sHealthEndpoints {
    #[must_use]
    pub fn new(system_health: Arc<SystemHealthCheck>) -> Self {
        Self { system_health }
    }

    /// Is the process alive? Only fails if this function can't execute.
    #[allow(clippy::unused_async)]
    pub async fn liveness(&self) -> (u16, &'static str) {
        (200, "alive")
    }

    /// Can the process accept traffic?
    pub async fn readiness(&self) -> (u16, String) {
        match self.system_health.overall_health().await {
            HealthStatus::Healthy => (200, "ready".to_string()),
            HealthStatus::Degraded => (200, "degraded".to_string()),
            HealthStatus::Unhealthy => (503, "not ready".to_string()),
        }
    }

    /// Full per-component breakdown, for a debugging/dashboard endpoint.
    pub async fn health_detailed(&self) -> HashMap<String, ComponentHealth> {
        self.system_health.check_all().await
    }
}

/// Wraps any `HealthCheckable` with a timeout so a hung dependency can't
/// block the probe.
pub struct TimeoutHealthCheck {
    inner: Arc<dyn HealthCheckable>,
    timeout: Duration,
}

impl TimeoutHealthCheck {
    #[must_use]
    pub fn new(inner: Arc<dyn HealthCheckable>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl HealthCheckable for TimeoutHealthCheck {
    async fn check_health(&self) -> ComponentHealth {
        let start = Instant::now();
        match tokio::time::timeout(self.timeout, self.inner.check_health()).await {
            Ok(health) => {
                let duration = start.elapsed();
                health.with_detail("checkDurationMs", i64::try_from(duration.as_millis()).unwrap_or(i64::MAX))
            }
            Err(_) => ComponentHealth::unhealthy(format!("health check timed out after {:?}", self.timeout))
                .with_detail("timeoutMs", i64::try_from(self.timeout.as_millis()).unwrap_or(i64::MAX)),
        }
    }

    fn component_name(&self) -> &str {
        self.inner.component_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockHealthCheck {
        name: String,
        status: HealthStatus,
    }

    #[async_trait]
    impl HealthCheckable for MockHealthCheck {
        async fn check_health(&self) -> ComponentHealth {
            match self.status {
                HealthStatus::Healthy => ComponentHealth::healthy("ok"),
                HealthStatus::Degraded => ComponentHealth::degraded("slow"),
                HealthStatus::Unhealthy => ComponentHealth::unhealthy("down"),
            }
        }

        fn component_name(&self) -> &str {
            &self.name
        }
    }

    #[tokio::test]
    async fn overall_health_is_worst_of_its_components() {
        let mut system = SystemHealthCheck::new();
        system.add_check(Arc::new(MockHealthCheck { name: "event-bus".to_string(), status: HealthStatus::Healthy }));
        system.add_check(Arc::new(MockHealthCheck { name: "scheduler".to_string(), status: HealthStatus::Degraded }));
        assert_eq!(system.overall_health().await, HealthStatus::Degraded);
    }

    #[tokio::test]
    async fn readiness_reports_503_when_any_component_is_unhealthy() {
        let mut system = SystemHealthCheck::new();
        system.add_check(Arc::new(MockHealthCheck { name: "event-bus".to_string(), status: HealthStatus::Unhealthy }));
        let k8s = K8sHealthEndpoints::new(Arc::new(system));
        let (status, body) = k8s.readiness().await;
        assert_eq!(status, 503);
        assert_eq!(body, "not ready");
    }

    #[tokio::test]
    async fn liveness_never_fails() {
        let k8s = K8sHealthEndpoints::new(Arc::new(SystemHealthCheck::new()));
        let (status, _) = k8s.liveness().await;
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn timeout_health_check_reports_unhealthy_past_its_deadline() {
        struct SlowCheck;

        #[async_trait]
        impl HealthCheckable for SlowCheck {
            async fn check_health(&self) -> ComponentHealth {
                tokio::time::sleep(Duration::from_secs(10)).await;
                ComponentHealth::healthy("too slow to matter")
            }

            fn component_name(&self) -> &str {
                "slow"
            }
        }

        let wrapped = TimeoutHealthCheck::new(Arc::new(SlowCheck), Duration::from_millis(50));
        let result = wrapped.check_health().await;
        assert_eq!(result.status, HealthStatus::Unhealthy);
        assert!(result.message.contains("timed out"));
    }
}
