//! `/streaming/*`: read-only introspection over topics, consumer groups,
//! and the feature store.

use axum::extract::{Path, State};
use axum::Json;
use fraudguard_core::domain::FeatureGroup;
use fraudguard_streaming::{ConsumerGroupSummary, TopicSummary};
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;
use crate::WebResult;

/// `GET /streaming/topics`.
pub async fn topics(State(state): State<AppState>) -> Json<Vec<TopicSummary>> {
    Json(state.streaming.topics())
}

/// `GET /streaming/consumer-groups`.
pub async fn consumer_groups(State(state): State<AppState>) -> Json<Vec<ConsumerGroupSummary>> {
    Json(state.streaming.consumer_groups())
}

fn parse_group(name: &str) -> Option<FeatureGroup> {
    match name {
        "seller_profile" => Some(FeatureGroup::SellerProfile),
        "transaction_velocity" => Some(FeatureGroup::TransactionVelocity),
        "device_trust" => Some(FeatureGroup::DeviceTrust),
        "network_risk" => Some(FeatureGroup::NetworkRisk),
        _ => None,
    }
}

/// `GET /streaming/feature-store/:entity`: every feature group materialized
/// for `entity`, keyed by group name.
pub async fn feature_store_entity(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> Json<std::collections::HashMap<String, Value>> {
    let mut out = std::collections::HashMap::new();
    for group in [
        FeatureGroup::SellerProfile,
        FeatureGroup::TransactionVelocity,
        FeatureGroup::DeviceTrust,
        FeatureGroup::NetworkRisk,
    ] {
        if let Some(value) = state.features.get_features(&entity, group) {
            out.insert(group.to_string(), value);
        }
    }
    Json(out)
}

/// `GET /streaming/feature-store/:entity/:group`: a single materialized
/// feature group for `entity`.
///
/// # Errors
///
/// Returns 400 for an unrecognized group name, 404 if no value is
/// materialized (or it has expired past its TTL).
pub async fn feature_store_entity_group(
    State(state): State<AppState>,
    Path((entity, group)): Path<(String, String)>,
) -> WebResult<Json<Value>> {
    let group = parse_group(&group).ok_or_else(|| AppError::bad_request(format!("unknown feature group: {group}")))?;
    state
        .features
        .get_features(&entity, group)
        .map(Json)
        .ok_or_else(|| AppError::not_found("feature group", format!("{entity}:{group}")))
}
