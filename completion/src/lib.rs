//! # FraudGuard Completion
//!
//! The pluggable completion, prompt-registry, and ML-inference boundary.
//! `fraudguard-agent` depends only on the traits in this crate
//! ([`CompletionService`], [`MlPredictor`]); the concrete backend is wired
//! in at startup by `fraudguard-server` and can be swapped for a mock in
//! tests without touching any agent code.

pub mod client;
pub mod error;
pub mod mock;
pub mod predictor;
pub mod resilient;

pub use client::{CompletionRequest, CompletionResponse, CompletionService, HttpCompletionService};
pub use error::CompletionError;
pub use mock::{MockCompletionService, MockMlPredictor};
pub use predictor::{MlPrediction, MlPredictor};
pub use resilient::{ResilientCompletionService, ResilientMlPredictor};
