//! Kubernetes-style liveness/readiness probes, plus a detailed breakdown
//! for dashboards, over [`fraudguard_runtime::health::SystemHealthCheck`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fraudguard_runtime::health::{ComponentHealth, K8sHealthEndpoints};
use std::collections::HashMap;

use crate::state::AppState;

/// `GET /health/live`.
pub async fn liveness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let (status, body) = K8sHealthEndpoints::new(state.health.clone()).liveness().await;
    (StatusCode::from_u16(status).unwrap_or(StatusCode::OK), body)
}

/// `GET /health/ready`.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, String) {
    let (status, body) = K8sHealthEndpoints::new(state.health.clone()).readiness().await;
    (StatusCode::from_u16(status).unwrap_or(StatusCode::SERVICE_UNAVAILABLE), body)
}

/// `GET /health`: the same as `/health/ready`, for callers that don't
/// distinguish the two probes.
pub async fn health_check(state: State<AppState>) -> (StatusCode, String) {
    readiness(state).await
}

/// `GET /health/detailed`: per-component breakdown.
pub async fn detailed(State(state): State<AppState>) -> Json<HashMap<String, ComponentHealth>> {
    Json(K8sHealthEndpoints::new(state.health.clone()).health_detailed().await)
}
