//! Deterministic stand-ins for the completion/ML boundary, used by default
//! wiring and by tests. Unavailable or unconfigured real backends degrade
//! to these rather than failing the whole scan.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{CompletionRequest, CompletionResponse, CompletionService};
use crate::error::CompletionError;
use crate::predictor::{MlPrediction, MlPredictor};

/// Returns every available tool, in order, as the strategy, with a canned
/// understanding string. Enough for the reasoning cycle to exercise its
/// plan/act/observe machinery without a live model.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionService;

#[async_trait]
impl CompletionService for MockCompletionService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, CompletionError> {
        Ok(CompletionResponse {
            understanding: format!("observed input of {} chars", request.input.len()),
            strategy: request.available_tools,
        })
    }

    async fn get_prompt(&self, name: &str) -> Result<String, CompletionError> {
        Ok(format!("[prompt:{name}] no prompt registry configured"))
    }
}

/// Deterministically derives a score from the feature payload's string
/// length so tests stay reproducible without a real model in the loop.
#[derive(Debug, Clone, Default)]
pub struct MockMlPredictor;

#[async_trait]
impl MlPredictor for MockMlPredictor {
    async fn predict(&self, model_name: &str, features: Value) -> Result<MlPrediction, CompletionError> {
        let serialized = features.to_string();
        let score = (serialized.len() % 100) as f64 / 100.0;
        Ok(MlPrediction {
            model_name: model_name.to_string(),
            score,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_completion_echoes_available_tools() {
        let svc = MockCompletionService;
        let response = svc
            .complete(CompletionRequest {
                system_prompt: "sys".into(),
                input: "hello".into(),
                available_tools: vec!["ml_query".into(), "similar_case_lookup".into()],
            })
            .await
            .unwrap();
        assert_eq!(response.strategy, vec!["ml_query", "similar_case_lookup"]);
    }

    #[tokio::test]
    async fn mock_predictor_is_deterministic() {
        let predictor = MockMlPredictor;
        let a = predictor
            .predict("fraud-v1", serde_json::json!({"a": 1}))
            .await
            .unwrap();
        let b = predictor
            .predict("fraud-v1", serde_json::json!({"a": 1}))
            .await
            .unwrap();
        assert!((a.score - b.score).abs() < f64::EPSILON);
    }
}
