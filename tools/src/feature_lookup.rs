//! `feature_lookup`: read a materialized feature group for an entity.

use std::sync::Arc;

use fraudguard_core::domain::FeatureGroup;
use fraudguard_features::FeatureStore;
use serde_json::json;

use crate::types::{Tool, ToolError, ToolExecutorFn};

fn parse_group(name: &str) -> Option<FeatureGroup> {
    match name {
        "seller_profile" => Some(FeatureGroup::SellerProfile),
        "transaction_velocity" => Some(FeatureGroup::TransactionVelocity),
        "device_trust" => Some(FeatureGroup::DeviceTrust),
        "network_risk" => Some(FeatureGroup::NetworkRisk),
        _ => None,
    }
}

/// Builds the `feature_lookup` tool against a shared feature store.
#[must_use]
pub fn feature_lookup_tool(store: Arc<FeatureStore>) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: "feature_lookup".to_string(),
        description: "Fetch a materialized feature group for an entity from the online feature store".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "entityId": {"type": "string"},
                "group": {"type": "string", "enum": ["seller_profile", "transaction_velocity", "device_trust", "network_risk"]},
            },
            "required": ["entityId", "group"],
        }),
    };

    let executor = Arc::new(move |input: String| {
        let store = store.clone();
        Box::pin(async move {
            let parsed: serde_json::Value =
                serde_json::from_str(&input).map_err(|e| ToolError { message: format!("invalid input JSON: {e}") })?;
            let entity_id =
                parsed["entityId"].as_str().ok_or_else(|| ToolError { message: "missing 'entityId' field".to_string() })?;
            let group_name =
                parsed["group"].as_str().ok_or_else(|| ToolError { message: "missing 'group' field".to_string() })?;
            let group = parse_group(group_name).ok_or_else(|| ToolError { message: format!("unknown group '{group_name}'") })?;

            let features = store.get_features(entity_id, group);
            Ok(json!({"entityId": entity_id, "group": group_name, "features": features}).to_string())
        })
    });

    (tool, executor)
}
