//! `sequence_match`: match a seller's risk-event history against every
//! known sequence pattern (e.g. `BUST_OUT`).

use std::sync::Arc;

use fraudguard_risk::RiskProfileEngine;
use serde_json::json;

use crate::types::{Tool, ToolError, ToolExecutorFn};

/// Builds the `sequence_match` tool against a shared risk profile engine.
#[must_use]
pub fn sequence_match_tool(engine: Arc<RiskProfileEngine>) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: "sequence_match".to_string(),
        description: "Match a seller's risk-event history against known fraud sequence patterns (e.g. BUST_OUT)".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "sellerId": {"type": "string"},
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

            let events = engine.events_for(seller_id);
            let matches = fraudguard_risk::match_all(&events);
            Ok(json!({"sellerId": seller_id, "matches": matches}).to_string())
        })
    });

    (tool, executor)
}
