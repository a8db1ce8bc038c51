//! `graph_query`: neighbor discovery and multi-hop investigation over the
//! property graph.

use std::sync::Arc;

use fraudguard_graph::GraphEngine;
use serde_json::json;

use crate::types::{Tool, ToolError, ToolExecutorFn};

/// Builds the `graph_query` tool against a shared graph engine.
#[must_use]
pub fn graph_query_tool(graph: Arc<GraphEngine>) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: "graph_query".to_string(),
        description: "Query the relationship graph: neighbors within a hop radius, or a multi-hop investigation".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "operation": {"type": "string", "enum": ["neighbors", "investigate"]},
                "sellerId": {"type": "string"},
                "depth": {"type": "integer"},
                "maxHops": {"type": "integer"},
                "minWeight": {"type": "number"},
                "edgeTypes": {"type": "array", "items": {"type": "string"}},
            },
            "required": ["operation", "sellerId"],
        }),
    };

    let executor = Arc::new(move |input: String| {
        let graph = graph.clone();
        Box::pin(async move {
            let parsed: serde_json::Value =
                serde_json::from_str(&input).map_err(|e| ToolError { message: format!("invalid input JSON: {e}") })?;
            let operation =
                parsed["operation"].as_str().ok_or_else(|| ToolError { message: "missing 'operation' field".to_string() })?;
            let seller_id =
                parsed["sellerId"].as_str().ok_or_else(|| ToolError { message: "missing 'sellerId' field".to_string() })?;

            match operation {
                "neighbors" => {
                    let depth = parsed["depth"].as_u64().unwrap_or(1) as u32;
                    let edge_types: Option<Vec<String>> =
                        parsed["edgeTypes"].as_array().map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect());
                    let (nodes, edges) = graph.get_neighbors(seller_id, depth, edge_types.as_deref());
                    Ok(json!({"nodes": nodes, "edges": edges}).to_string())
                }
                "investigate" => {
                    let max_hops = parsed["maxHops"].as_u64().unwrap_or(3) as u32;
                    let min_weight = parsed["minWeight"].as_f64().unwrap_or(0.6);
                    let evidence = graph.investigate(seller_id, max_hops, min_weight);
                    Ok(json!({"evidence": evidence}).to_string())
                }
                other => Err(ToolError { message: format!("unknown operation '{other}'") }),
            }
        })
    });

    (tool, executor)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn neighbors_operation_returns_induced_subgraph() {
        let graph = Arc::new(GraphEngine::new());
        graph.add_seller("S1", HashMap::from([("email".to_string(), json!("x@y"))]));
        graph.add_seller("S2", HashMap::from([("email".to_string(), json!("x@y"))]));

        let (_tool, executor) = graph_query_tool(graph);
        let result = executor(json!({"operation": "neighbors", "sellerId": "S1", "depth": 1}).to_string()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rejects_unknown_operation() {
        let graph = Arc::new(GraphEngine::new());
        let (_tool, executor) = graph_query_tool(graph);
        let result = executor(json!({"operation": "bogus", "sellerId": "S1"}).to_string()).await;
        assert!(result.is_err());
    }
}
