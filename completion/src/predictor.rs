//! `MlPredictor`: the pluggable ML inference/training registry boundary.
//!
//! Investigator-class agents append an ML-query tool call to their plan;
//! that tool is backed by this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CompletionError;

/// A prediction returned by the ML registry for a given feature vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlPrediction {
    /// Name of the model that produced this score.
    pub model_name: String,
    /// Predicted fraud probability/score in `[0, 1]`.
    pub score: f64,
}

/// Pluggable ML inference boundary.
#[async_trait]
pub trait MlPredictor: Send + Sync {
    /// Score a feature vector against the named model.
    async fn predict(&self, model_name: &str, features: Value) -> Result<MlPrediction, CompletionError>;
}
