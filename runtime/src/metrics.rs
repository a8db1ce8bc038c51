//! Prometheus metrics for observability and monitoring.
//!
//! Metric collection for the ambient runtime stack plus the domain
//! components that emit through it: the event bus, autonomous-agent
//! scheduling cycles, orchestrator workflows, circuit breakers and retries.
//!
//! # Example
//!
//! ```rust,no_run
//! use fraudguard_runtime::metrics::MetricsServer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! // Metrics available at http://localhost:9090/metrics
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub use metrics::{counter, gauge, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus metrics server.
///
/// Exposes metrics on an HTTP endpoint for Prometheus scraping.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a new metrics server bound to `addr`.
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Register metric descriptions and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram buckets cannot be built, or the
    /// exporter cannot be installed (a recorder already installed elsewhere
    /// in the process is tolerated and logged, not treated as fatal).
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!(addr = %self.addr, "metrics server started");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("metrics recorder already initialized, skipping");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// The installed recorder handle, if `start` has run.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

fn register_metrics() {
    describe_counter!("event_bus_messages_published_total", "Total messages published to the event bus");
    describe_counter!("event_bus_messages_consumed_total", "Total messages consumed from the event bus");
    describe_counter!("event_bus_publish_errors_total", "Total publish errors on the event bus");
    describe_histogram!("event_bus_publish_duration_seconds", "Time taken to publish a message");

    describe_counter!("scheduler_cycles_run_total", "Total autonomous agent cycles run");
    describe_counter!("scheduler_cycles_panicked_total", "Total autonomous agent cycles that panicked");
    describe_histogram!("scheduler_cycle_duration_seconds", "Time taken to run one autonomous agent cycle");

    describe_counter!("workflow_executions_started_total", "Total workflow executions started");
    describe_counter!("workflow_executions_completed_total", "Total workflow executions completed");
    describe_counter!("workflow_executions_escalated_total", "Total workflow executions suspended awaiting a human decision");

    describe_gauge!("circuit_breaker_state", "Current circuit breaker state (0=closed, 1=half-open, 2=open)");
    describe_counter!("circuit_breaker_calls_total", "Total calls through a circuit breaker");
    describe_counter!("circuit_breaker_successes_total", "Total successful calls");
    describe_counter!("circuit_breaker_failures_total", "Total failed calls");
    describe_counter!("circuit_breaker_rejections_total", "Total rejected calls (circuit open)");

    describe_counter!("retry_attempts_total", "Total retry attempts");
    describe_counter!("retry_successes_total", "Total successful retries");
    describe_counter!("retry_exhausted_total", "Total retry sequences that exhausted their max retries");
}

/// Event bus metrics recorder.
pub struct EventBusMetrics;

impl EventBusMetrics {
    /// Record a successful publish.
    pub fn record_publish(duration: Duration) {
        counter!("event_bus_messages_published_total").increment(1);
        histogram!("event_bus_publish_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a consumption (one `EventStream` item yielded).
    pub fn record_consume() {
        counter!("event_bus_messages_consumed_total").increment(1);
    }

    /// Record a publish error.
    pub fn record_publish_error() {
        counter!("event_bus_publish_errors_total").increment(1);
    }
}

/// Autonomous-scheduler metrics recorder.
pub struct SchedulerMetrics;

impl SchedulerMetrics {
    /// Record one completed cycle.
    pub fn record_cycle(duration: Duration) {
        counter!("scheduler_cycles_run_total").increment(1);
        histogram!("scheduler_cycle_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a cycle that panicked and was caught.
    pub fn record_panic() {
        counter!("scheduler_cycles_panicked_total").increment(1);
    }
}

/// Orchestrator workflow metrics recorder.
pub struct WorkflowMetrics;

impl WorkflowMetrics {
    /// Record a workflow execution starting.
    pub fn record_started() {
        counter!("workflow_executions_started_total").increment(1);
    }

    /// Record a workflow execution completing.
    pub fn record_completed() {
        counter!("workflow_executions_completed_total").increment(1);
    }

    /// Record a workflow execution suspending for human escalation.
    pub fn record_escalated() {
        counter!("workflow_executions_escalated_total").increment(1);
    }
}

/// Circuit breaker metrics recorder.
pub struct CircuitBreakerMetrics;

impl CircuitBreakerMetrics {
    /// Record circuit breaker state: 0 = Closed, 1 = `HalfOpen`, 2 = Open.
    pub fn record_state(state: f64) {
        gauge!("circuit_breaker_state").set(state);
    }

    /// Record a call attempt.
    pub fn record_call() {
        counter!("circuit_breaker_calls_total").increment(1);
    }

    /// Record a successful call.
    pub fn record_success() {
        counter!("circuit_breaker_successes_total").increment(1);
    }

    /// Record a failed call.
    pub fn record_failure() {
        counter!("circuit_breaker_failures_total").increment(1);
    }

    /// Record a rejected call (circuit open).
    pub fn record_rejection() {
        counter!("circuit_breaker_rejections_total").increment(1);
    }
}

/// Retry metrics recorder.
pub struct RetryMetrics;

impl RetryMetrics {
    /// Record a retry attempt.
    pub fn record_attempt() {
        counter!("retry_attempts_total").increment(1);
    }

    /// Record a successful retry.
    pub fn record_success() {
        counter!("retry_successes_total").increment(1);
    }

    /// Record exhausted retries.
    pub fn record_exhausted() {
        counter!("retry_exhausted_total").increment(1);
    }
}
