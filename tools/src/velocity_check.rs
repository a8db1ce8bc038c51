//! `velocity_check`: direct shortcut to an entity's transaction-velocity
//! feature group, the tool investigator agents reach for most often.

use std::sync::Arc;

use fraudguard_core::domain::FeatureGroup;
use fraudguard_features::FeatureStore;
use serde_json::json;

use crate::types::{Tool, ToolError, ToolExecutorFn};

/// Builds the `velocity_check` tool against a shared feature store.
#[must_use]
pub fn velocity_check_tool(store: Arc<FeatureStore>) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: "velocity_check".to_string(),
        description: "Fetch an entity's transaction velocity features (1h/24h counts, amounts)".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {"entityId": {"type": "string"}},
            "required": ["entityId"],
        }),
    };

    let executor = Arc::new(move |input: String| {
        let store = store.clone();
        Box::pin(async move {
            let parsed: serde_json::Value =
                serde_json::from_str(&input).map_err(|e| ToolError { message: format!("invalid input JSON: {e}") })?;
            let entity_id =
                parsed["entityId"].as_str().ok_or_else(|| ToolError { message: "missing 'entityId' field".to_string() })?;

            let features = store.get_features(entity_id, FeatureGroup::TransactionVelocity);
            Ok(json!({"entityId": entity_id, "features": features}).to_string())
        })
    });

    (tool, executor)
}
