//! Wires every handler into one [`Router`].

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{agents, health, risk_profile, streaming, websocket};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;

/// Builds the full application router over `state`.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/risk-profile/event", post(risk_profile::emit_event))
        .route("/risk-profile/:sellerId/history", get(risk_profile::history))
        .route("/risk-profile/:sellerId/override", patch(risk_profile::set_override))
        .route("/streaming/topics", get(streaming::topics))
        .route("/streaming/consumer-groups", get(streaming::consumer_groups))
        .route("/streaming/feature-store/:entity", get(streaming::feature_store_entity))
        .route("/streaming/feature-store/:entity/:group", get(streaming::feature_store_entity_group))
        .route("/agents/cross-domain/scan", post(agents::cross_domain_scan))
        .route("/agents/policy-evolution/scan", post(agents::policy_evolution_scan))
        .route("/ws", get(websocket::upgrade))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health/detailed", get(health::detailed))
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}
