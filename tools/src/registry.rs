//! Tool registry for dynamic tool management
//!
//! The registry provides:
//! - Dynamic tool registration
//! - Thread-safe tool storage
//! - Tool execution by name
//! - Tool listing and introspection

use crate::types::{Tool, ToolError, ToolExecutorFn, ToolResult};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe tool registry.
///
/// The registry stores tools and their executors, allowing dynamic
/// registration and execution by name.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Arc<RwLock<HashMap<String, (Tool, ToolExecutorFn)>>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    #[must_use]
    pub fn new() -> Self {
        Self { tools: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Register a tool with its executor.
    ///
    /// If a tool with the same name already exists, it is replaced and this
    /// returns `true`. Otherwise, returns `false`.
    pub fn register(&self, tool: Tool, executor: ToolExecutorFn) -> bool {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        tools.insert(tool.name.clone(), (tool, executor)).is_some()
    }

    /// Execute a tool by name.
    ///
    /// # Errors
    ///
    /// Returns `ToolError` if the tool is not registered or execution fails.
    pub async fn execute(&self, name: &str, input: String) -> ToolResult {
        let executor = {
            let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
            tools.get(name).map(|(_, executor)| executor.clone())
        };

        match executor {
            Some(executor) => executor(input).await,
            None => Err(ToolError { message: format!("Tool not found: {name}") }),
        }
    }

    /// All registered tool names, sorted alphabetically.
    #[must_use]
    pub fn list_tools(&self) -> Vec<String> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// All registered `Tool` definitions, sorted by name.
    #[must_use]
    pub fn get_tools(&self) -> Vec<Tool> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        let mut tool_list: Vec<Tool> = tools.values().map(|(tool, _)| tool.clone()).collect();
        tool_list.sort_by(|a, b| a.name.cmp(&b.name));
        tool_list
    }

    /// A specific tool's definition, if registered.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<Tool> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.get(name).map(|(tool, _)| tool.clone())
    }

    /// Remove a tool. Returns `true` if it was present.
    pub fn unregister(&self, name: &str) -> bool {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        tools.remove(name).is_some()
    }

    /// Remove every registered tool.
    pub fn clear(&self) {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        tools.clear();
    }

    /// Number of registered tools.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tools.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::{memory_search_tool, web_search_tool};
    use serde_json::json;

    #[test]
    fn test_registry_new() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_registry_register() {
        let registry = ToolRegistry::new();
        let (tool, executor) = memory_search_tool();

        let replaced = registry.register(tool, executor);
        assert!(!replaced);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_registry_register_replace() {
        let registry = ToolRegistry::new();
        let (tool1, executor1) = memory_search_tool();
        let (tool2, executor2) = memory_search_tool();

        registry.register(tool1, executor1);
        let replaced = registry.register(tool2, executor2);
        assert!(replaced);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_registry_list_tools() {
        let registry = ToolRegistry::new();
        let (tool1, executor1) = memory_search_tool();
        let (tool2, executor2) = web_search_tool();

        registry.register(tool1, executor1);
        registry.register(tool2, executor2);

        let tools = registry.list_tools();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0], "memory_search");
        assert_eq!(tools[1], "web_search");
    }

    #[test]
    fn test_registry_get_tools() {
        let registry = ToolRegistry::new();
        let (tool1, executor1) = memory_search_tool();
        let (tool2, executor2) = web_search_tool();

        registry.register(tool1, executor1);
        registry.register(tool2, executor2);

        let tools = registry.get_tools();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "memory_search");
        assert_eq!(tools[1].name, "web_search");
    }

    #[test]
    fn test_registry_get_tool() {
        let registry = ToolRegistry::new();
        let (tool, executor) = memory_search_tool();

        registry.register(tool, executor);

        let retrieved = registry.get_tool("memory_search");
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().name, "memory_search");

        let not_found = registry.get_tool("nonexistent");
        assert!(not_found.is_none());
    }

    #[tokio::test]
    async fn test_registry_execute() {
        let registry = ToolRegistry::new();
        let (tool, executor) = memory_search_tool();

        registry.register(tool, executor);

        let result = registry.execute("memory_search", json!({"query": "weather"}).to_string()).await;

        assert!(result.is_ok());
        let output: serde_json::Value = serde_json::from_str(&result.unwrap()).unwrap();
        assert_eq!(output["query"], "weather");
    }

    #[tokio::test]
    async fn test_registry_execute_not_found() {
        let registry = ToolRegistry::new();

        let result = registry.execute("nonexistent", json!({"query": "test"}).to_string()).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("Tool not found"));
    }

    #[test]
    fn test_registry_unregister() {
        let registry = ToolRegistry::new();
        let (tool, executor) = memory_search_tool();

        registry.register(tool, executor);
        assert_eq!(registry.count(), 1);

        let removed = registry.unregister("memory_search");
        assert!(removed);
        assert_eq!(registry.count(), 0);

        let not_removed = registry.unregister("nonexistent");
        assert!(!not_removed);
    }

    #[test]
    fn test_registry_clear() {
        let registry = ToolRegistry::new();
        let (tool1, executor1) = memory_search_tool();
        let (tool2, executor2) = web_search_tool();

        registry.register(tool1, executor1);
        registry.register(tool2, executor2);
        assert_eq!(registry.count(), 2);

        registry.clear();
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_registry_default() {
        let registry = ToolRegistry::default();
        assert_eq!(registry.count(), 0);
    }
}
