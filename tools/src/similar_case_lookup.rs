//! `similar_case_lookup`: weighted-Jaccard + recency search over the
//! knowledge base, for investigator-class agents to pull precedent cases.

use std::sync::Arc;

use fraudguard_knowledge::{KnowledgeBase, Namespace, SearchFilters};
use serde_json::json;

use crate::types::{Tool, ToolError, ToolExecutorFn};

/// Builds the `similar_case_lookup` tool against a shared knowledge base.
#[must_use]
pub fn similar_case_lookup_tool(kb: Arc<KnowledgeBase>) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: "similar_case_lookup".to_string(),
        description: "Search the knowledge base for precedent cases similar to a free-text query".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "namespace": {"type": "string", "enum": ["transactions", "onboarding", "decisions", "risk-events", "rules"]},
                "query": {"type": "string"},
                "sellerId": {"type": "string"},
                "domain": {"type": "string"},
                "outcome": {"type": "string"},
                "category": {"type": "string"},
                "topK": {"type": "integer"},
            },
            "required": ["namespace", "query"],
        }),
    };

    let executor = Arc::new(move |input: String| {
        let kb = kb.clone();
        Box::pin(async move {
            let parsed: serde_json::Value =
                serde_json::from_str(&input).map_err(|e| ToolError { message: format!("invalid input JSON: {e}") })?;
            let namespace_name =
                parsed["namespace"].as_str().ok_or_else(|| ToolError { message: "missing 'namespace' field".to_string() })?;
            let namespace: Namespace = namespace_name
                .parse()
                .map_err(|_| ToolError { message: format!("unknown namespace '{namespace_name}'") })?;
            let query = parsed["query"].as_str().unwrap_or("");
            let top_k = parsed["topK"].as_u64().unwrap_or(5) as usize;

            let filters = SearchFilters {
                seller_id: parsed["sellerId"].as_str().map(str::to_string),
                domain: parsed["domain"].as_str().map(str::to_string),
                outcome: parsed["outcome"].as_str().map(str::to_string),
                category: parsed["category"].as_str().map(str::to_string),
            };

            let results = kb.search(namespace, query, &filters, top_k);
            Ok(json!({"results": results}).to_string())
        })
    });

    (tool, executor)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fraudguard_core::environment::{SystemClock, UuidGenerator};

    #[tokio::test]
    async fn finds_matching_case_by_free_text() {
        let kb = Arc::new(KnowledgeBase::new(Arc::new(SystemClock), Arc::new(UuidGenerator)));
        kb.add_knowledge(Namespace::Decisions, "seller blocked for velocity spike fraud", json!({}));

        let (_tool, executor) = similar_case_lookup_tool(kb);
        let result = executor(json!({"namespace": "decisions", "query": "velocity spike"}).to_string()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert!(!value["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_namespace() {
        let kb = Arc::new(KnowledgeBase::new(Arc::new(SystemClock), Arc::new(UuidGenerator)));
        let (_tool, executor) = similar_case_lookup_tool(kb);
        let result = executor(json!({"namespace": "bogus", "query": "x"}).to_string()).await;
        assert!(result.is_err());
    }
}
