//! The tool contract: a JSON-schema description plus a boxed async
//! executor, shared by every tool in this crate and by the registry.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A tool description, including its JSON input schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tool {
    /// Unique tool name, used for dispatch.
    pub name: String,
    /// Human/model-facing description of what the tool does.
    pub description: String,
    /// JSON Schema describing the tool's input.
    pub input_schema: serde_json::Value,
}

/// Tool execution failure. Tools never panic; every failure is converted
/// into this shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolError {
    /// Human-readable failure reason.
    pub message: String,
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ToolError {}

/// Result of a tool call: the raw JSON-encoded output, or a `ToolError`.
pub type ToolResult = Result<String, ToolError>;

/// A boxed, clonable async tool executor: JSON input in, `ToolResult` out.
pub type ToolExecutorFn = Arc<dyn Fn(String) -> Pin<Box<dyn Future<Output = ToolResult> + Send>> + Send + Sync>;
