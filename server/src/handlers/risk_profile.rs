//! `/risk-profile/*`: emit a risk event, read a seller's trajectory, and
//! set or clear a manual tier override.

use axum::extract::{Path, State};
use axum::Json;
use fraudguard_core::domain::Domain;
use fraudguard_risk::{HistoryPoint, SellerProfile, Tier};
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;
use crate::WebResult;

/// Body of `POST /risk-profile/event`.
#[derive(Debug, Deserialize)]
pub struct EmitEventRequest {
    seller_id: String,
    domain: Domain,
    event_type: String,
    risk_score: f64,
    #[serde(default = "default_metadata")]
    metadata: Value,
}

fn default_metadata() -> Value {
    Value::Object(serde_json::Map::new())
}

/// `POST /risk-profile/event`: records the event and returns the seller's
/// recomputed profile.
pub async fn emit_event(
    State(state): State<AppState>,
    Json(request): Json<EmitEventRequest>,
) -> WebResult<Json<SellerProfile>> {
    let profile = state.risk.emit_risk_event(
        &request.seller_id,
        request.domain,
        &request.event_type,
        request.risk_score,
        request.metadata,
    );
    Ok(Json(profile))
}

/// `GET /risk-profile/:sellerId/history`: the seller's full trajectory,
/// replayed causally from its own event history.
///
/// # Errors
///
/// Returns 404 if the seller has no recorded events.
pub async fn history(
    State(state): State<AppState>,
    Path(seller_id): Path<String>,
) -> WebResult<Json<Vec<HistoryPoint>>> {
    let history = state.risk.get_history(&seller_id);
    if history.is_empty() {
        return Err(AppError::not_found("seller risk profile", &seller_id));
    }
    Ok(Json(history))
}

/// Body of `PATCH /risk-profile/:sellerId/override`.
#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    tier: Option<Tier>,
    reason: Option<String>,
    overridden_by: Option<String>,
}

/// `PATCH /risk-profile/:sellerId/override`: sets or clears (`tier: null`)
/// the seller's manual tier override.
///
/// `reason`/`overriddenBy` have no storage slot on the computed profile;
/// they're audit context, so they're logged rather than persisted on it.
pub async fn set_override(
    State(state): State<AppState>,
    Path(seller_id): Path<String>,
    Json(request): Json<OverrideRequest>,
) -> WebResult<Json<SellerProfile>> {
    tracing::info!(
        seller_id = %seller_id,
        tier = ?request.tier,
        reason = request.reason.as_deref().unwrap_or(""),
        overridden_by = request.overridden_by.as_deref().unwrap_or(""),
        "manual tier override requested"
    );
    let profile = state.risk.set_manual_override(&seller_id, request.tier);
    Ok(Json(profile))
}
