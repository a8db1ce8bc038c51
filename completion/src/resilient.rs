//! Resilience decorators for the completion/ML boundary: retry with
//! exponential backoff plus a circuit breaker, both from `fraudguard-runtime`.

use async_trait::async_trait;
use fraudguard_runtime::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};
use fraudguard_runtime::retry::{retry_with_backoff, RetryPolicy};
use serde_json::Value;
use tracing::warn;

use crate::client::{CompletionRequest, CompletionResponse, CompletionService};
use crate::error::CompletionError;
use crate::predictor::{MlPrediction, MlPredictor};

/// Wraps any `CompletionService` with retry-with-backoff inside a circuit
/// breaker: repeated failures open the circuit and subsequent calls fail
/// fast instead of retrying against a backend that's already down.
pub struct ResilientCompletionService<S> {
    inner: S,
    breaker: CircuitBreaker,
    retry_policy: RetryPolicy,
}

impl<S> ResilientCompletionService<S> {
    #[must_use]
    pub fn new(inner: S, breaker_config: CircuitBreakerConfig, retry_policy: RetryPolicy) -> Self {
        Self { inner, breaker: CircuitBreaker::new(breaker_config), retry_policy }
    }

    async fn call_resilient<T, F, Fut>(&self, operation: F) -> Result<T, CompletionError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, CompletionError>>,
    {
        let retry_policy = self.retry_policy.clone();
        let result = self
            .breaker
            .call(|| retry_with_backoff(retry_policy, &operation))
            .await;

        match result {
            Ok(value) => Ok(value),
            Err(CircuitBreakerError::Open) => {
                warn!("completion circuit breaker is open, failing fast");
                Err(CompletionError::Unavailable("circuit breaker open".to_string()))
            }
            Err(CircuitBreakerError::Inner(err)) => Err(err),
        }
    }
}

#[async_trait]
impl<S: CompletionService + Sync> CompletionService for ResilientCompletionService<S> {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, CompletionError> {
        self.call_resilient(|| self.inner.complete(request.clone())).await
    }

    async fn get_prompt(&self, name: &str) -> Result<String, CompletionError> {
        self.call_resilient(|| self.inner.get_prompt(name)).await
    }
}

/// Same decorator for the ML-prediction boundary.
pub struct ResilientMlPredictor<P> {
    inner: P,
    breaker: CircuitBreaker,
    retry_policy: RetryPolicy,
}

impl<P> ResilientMlPredictor<P> {
    #[must_use]
    pub fn new(inner: P, breaker_config: CircuitBreakerConfig, retry_policy: RetryPolicy) -> Self {
        Self { inner, breaker: CircuitBreaker::new(breaker_config), retry_policy }
    }
}

#[async_trait]
impl<P: MlPredictor + Sync> MlPredictor for ResilientMlPredictor<P> {
    async fn predict(&self, model_name: &str, features: Value) -> Result<MlPrediction, CompletionError> {
        let retry_policy = self.retry_policy.clone();
        let result = self
            .breaker
            .call(|| retry_with_backoff(retry_policy, || self.inner.predict(model_name, features.clone())))
            .await;

        match result {
            Ok(value) => Ok(value),
            Err(CircuitBreakerError::Open) => {
                warn!(model = model_name, "ml predictor circuit breaker is open, failing fast");
                Err(CompletionError::Unavailable("circuit breaker open".to_string()))
            }
            Err(CircuitBreakerError::Inner(err)) => Err(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct ScriptedCompletionService {
        always_fails: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CompletionService for ScriptedCompletionService {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.always_fails {
                Err(CompletionError::Unavailable("down".to_string()))
            } else {
                Ok(CompletionResponse { understanding: "ok".to_string(), strategy: vec![] })
            }
        }

        async fn get_prompt(&self, name: &str) -> Result<String, CompletionError> {
            Ok(format!("prompt:{name}"))
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest { system_prompt: String::new(), input: String::new(), available_tools: vec![] }
    }

    #[tokio::test]
    async fn wraps_a_healthy_backend_transparently() {
        let inner = ScriptedCompletionService { always_fails: false, calls: Arc::new(AtomicUsize::new(0)) };
        let resilient = ResilientCompletionService::new(
            inner,
            CircuitBreakerConfig::builder().failure_threshold(3).build(),
            RetryPolicy::builder().max_retries(1).initial_delay(Duration::from_millis(1)).build(),
        );

        let response = resilient.complete(request()).await.unwrap();
        assert_eq!(response.understanding, "ok");
    }

    #[tokio::test]
    async fn opens_the_circuit_after_repeated_failures() {
        let inner = ScriptedCompletionService { always_fails: true, calls: Arc::new(AtomicUsize::new(0)) };
        let resilient = ResilientCompletionService::new(
            inner,
            CircuitBreakerConfig::builder().failure_threshold(1).build(),
            RetryPolicy::builder().max_retries(0).initial_delay(Duration::from_millis(1)).build(),
        );

        let _ = resilient.complete(request()).await;
        let second = resilient.complete(request()).await;
        assert!(matches!(second, Err(CompletionError::Unavailable(msg)) if msg == "circuit breaker open"));
    }
}
