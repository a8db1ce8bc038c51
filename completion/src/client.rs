//! `CompletionService`: the pluggable LLM completion + prompt-registry
//! boundary.
//!
//! The agent core (`fraudguard-agent`) only ever talks to this trait. The
//! concrete backend — a real hosted completion call, a fine-tuned in-house
//! model, or (in tests) a canned response — is an implementation detail
//! injected at startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

use crate::error::CompletionError;

/// A request for the agent's "think" step: free-form context plus the tool
/// names available to choose from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System/developer framing for the request.
    pub system_prompt: String,
    /// The observation/input the agent is reasoning about.
    pub input: String,
    /// Names of tools the model may choose to invoke.
    pub available_tools: Vec<String>,
}

/// The model's proposed strategy: an ordered list of tool names to call.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompletionResponse {
    /// Free-form narrative understanding of the input.
    pub understanding: String,
    /// Tool names to call, in order.
    pub strategy: Vec<String>,
}

/// Pluggable completion + prompt-registry service.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Ask the model for an understanding + tool-call strategy.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, CompletionError>;

    /// Retrieve a named prompt template from the registry.
    async fn get_prompt(&self, name: &str) -> Result<String, CompletionError>;
}

/// Thin HTTP-backed implementation.
///
/// Talks to a single configurable completion endpoint that is expected to
/// accept `CompletionRequest` as JSON and return `CompletionResponse` as
/// JSON. Deliberately narrow: the concrete completion backend only needs
/// to satisfy this contract, not any particular vendor's full API surface.
#[derive(Clone)]
pub struct HttpCompletionService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCompletionService {
    /// Create a client pointed at `base_url` (e.g. `http://localhost:9000`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CompletionService for HttpCompletionService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, CompletionError> {
        let response = self
            .client
            .post(format!("{}/complete", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CompletionError::Unavailable(format!(
                "completion backend returned {}",
                response.status()
            )));
        }

        response
            .json::<CompletionResponse>()
            .await
            .map_err(|e| CompletionError::InvalidRequest(e.to_string()))
    }

    async fn get_prompt(&self, name: &str) -> Result<String, CompletionError> {
        let response = self
            .client
            .get(format!("{}/prompts/{name}", self.base_url))
            .send()
            .await
            .map_err(|e| CompletionError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CompletionError::Unavailable(format!(
                "prompt registry returned {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| CompletionError::InvalidRequest(e.to_string()))
    }
}

/// Boxed future alias for call sites that need one explicitly.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
