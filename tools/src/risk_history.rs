//! `risk_history`: current risk profile or full point-in-time trajectory
//! for a seller.

use std::sync::Arc;

use fraudguard_risk::RiskProfileEngine;
use serde_json::json;

use crate::types::{Tool, ToolError, ToolExecutorFn};

/// Builds the `risk_history` tool against a shared risk profile engine.
#[must_use]
pub fn risk_history_tool(engine: Arc<RiskProfileEngine>) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: "risk_history".to_string(),
        description: "Fetch a seller's current risk profile or its full point-in-time trajectory".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "sellerId": {"type": "string"},
                "mode": {"type": "string", "enum": ["profile", "history"]},
            },
            "required": ["sellerId"],
        }),
    };

    let executor = Arc::new(move |input: String| {
        let engine = engine.clone();
        Box::pin(async move {
            let parsed: serde_json::Value =
                serde_json::from_str(&input).map_err(|e| ToolError { message: format!("invalid input JSON: {e}") })?;
            let seller_id =
                parsed["sellerId"].as_str().ok_or_else(|| ToolError { message: "missing 'sellerId' field".to_string() })?;
            let mode = parsed["mode"].as_str().unwrap_or("profile");

            match mode {
                "history" => {
                    let history = engine.get_history(seller_id);
                    Ok(json!({"sellerId": seller_id, "history": history}).to_string())
                }
                _ => {
                    let profile = engine.get_profile(seller_id);
                    Ok(json!({"sellerId": seller_id, "profile": profile}).to_string())
                }
            }
        })
    });

    (tool, executor)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fraudguard_core::domain::Domain;
    use fraudguard_core::environment::{SystemClock, UuidGenerator};

    #[tokio::test]
    async fn profile_mode_returns_none_for_unknown_seller() {
        let engine = Arc::new(RiskProfileEngine::new(Arc::new(SystemClock), Arc::new(UuidGenerator)));
        let (_tool, executor) = risk_history_tool(engine);
        let result = executor(json!({"sellerId": "ghost"}).to_string()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert!(value["profile"].is_null());
    }

    #[tokio::test]
    async fn history_mode_returns_trajectory() {
        let engine = Arc::new(RiskProfileEngine::new(Arc::new(SystemClock), Arc::new(UuidGenerator)));
        engine.emit_risk_event("S1", Domain::Ato, "ATO_ATTEMPT", 50.0, json!({}));

        let (_tool, executor) = risk_history_tool(engine);
        let result = executor(json!({"sellerId": "S1", "mode": "history"}).to_string()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(value["history"].as_array().unwrap().len(), 1);
    }
}
