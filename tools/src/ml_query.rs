//! `ml_query`: score a feature vector against a named model. Every
//! investigator-class agent plan appends one call to this tool.

use std::sync::Arc;

use fraudguard_completion::MlPredictor;
use serde_json::json;

use crate::types::{Tool, ToolError, ToolExecutorFn};

/// Builds the `ml_query` tool against a shared `MlPredictor`.
#[must_use]
pub fn ml_query_tool(predictor: Arc<dyn MlPredictor>) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: "ml_query".to_string(),
        description: "Score a feature vector against a named fraud-scoring model".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "modelName": {"type": "string"},
                "features": {"type": "object"},
            },
            "required": ["modelName", "features"],
        }),
    };

    let executor = Arc::new(move |input: String| {
        let predictor = predictor.clone();
        Box::pin(async move {
            let parsed: serde_json::Value =
                serde_json::from_str(&input).map_err(|e| ToolError { message: format!("invalid input JSON: {e}") })?;
            let model_name =
                parsed["modelName"].as_str().ok_or_else(|| ToolError { message: "missing 'modelName' field".to_string() })?;
            let features = parsed["features"].clone();

            let prediction = predictor
                .predict(model_name, features)
                .await
                .map_err(|e| ToolError { message: e.to_string() })?;
            Ok(serde_json::to_string(&prediction).map_err(|e| ToolError { message: e.to_string() })?)
        })
    });

    (tool, executor)
}
