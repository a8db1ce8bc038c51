//! `/agents/*/scan`: trigger a single autonomous reasoning cycle
//! synchronously, outside the scheduler's own timer.

use axum::extract::State;
use axum::Json;
use fraudguard_agent::InvestigationReport;
use serde::Deserialize;

use crate::state::AppState;

/// Body shared by both scan endpoints.
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    subject: String,
}

/// `POST /agents/cross-domain/scan`.
pub async fn cross_domain_scan(State(state): State<AppState>, Json(request): Json<ScanRequest>) -> Json<InvestigationReport> {
    let report = state.cross_domain_agent.scan(&request.subject).await;
    Json(report)
}

/// `POST /agents/policy-evolution/scan`.
pub async fn policy_evolution_scan(State(state): State<AppState>, Json(request): Json<ScanRequest>) -> Json<InvestigationReport> {
    let report = state.policy_evolution_agent.scan(&request.subject).await;
    Json(report)
}
