//! # FraudGuard Property Graph
//!
//! An in-memory undirected property graph over sellers and the identifiers
//! they share (email, phone, device fingerprint, ...), used to discover
//! rings, propagate risk across shared identifiers, and drive multi-hop
//! investigations.

pub mod engine;
pub mod model;

pub use engine::{Cluster, GraphEngine, InvestigationEvidence, PropagatedRisk};
pub use model::{GraphEdge, GraphNode};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, serde_json::Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), json!(v))).collect()
    }

    #[test]
    fn shared_email_creates_weighted_edge() {
        let graph = GraphEngine::new();
        graph.add_seller("S3", props(&[("email", "x@y")]));
        let created = graph.add_seller("S4", props(&[("email", "x@y")]));

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].edge_type, "SHARED_EMAIL");
        assert!((created[0].weight - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn ring_discovery_via_shared_email_then_shared_phone() {
        let graph = GraphEngine::new();
        graph.add_seller("S3", props(&[("email", "x@y"), ("phone", "555-0100")]));
        graph.add_seller("S4", props(&[("email", "x@y")]));
        graph.add_seller("S5", props(&[("phone", "555-0100")]));

        let (neighbors, _) = graph.get_neighbors("S3", 2, None);
        assert_eq!(neighbors, vec!["S3".to_string(), "S4".to_string(), "S5".to_string()]);
    }

    #[test]
    fn normalization_matches_case_and_whitespace_insensitively() {
        let graph = GraphEngine::new();
        graph.add_seller("S1", props(&[("email", "  X@Y  ")]));
        let created = graph.add_seller("S2", props(&[("email", "x@y")]));
        assert_eq!(created.len(), 1);
    }

    #[test]
    fn propagate_risk_decays_with_hop_distance() {
        let graph = GraphEngine::new();
        graph.add_seller("A", props(&[("email", "shared@ring")]));
        graph.add_seller("B", props(&[("email", "shared@ring")]));
        graph.add_node("C", "seller", HashMap::new());
        graph.add_edge("B", "C", "SHARED_DEVICE", 0.8, HashMap::new());

        let propagated = graph.propagate_risk("A", 100.0);
        let b = propagated.get("B").unwrap();
        let c = propagated.get("C").unwrap();
        assert_eq!(b.hop, 1);
        assert_eq!(c.hop, 2);
        assert!(c.score < b.score);
    }

    #[test]
    fn detect_clusters_groups_connected_sellers() {
        let graph = GraphEngine::new();
        graph.add_seller("S1", props(&[("email", "ring@a")]));
        graph.add_seller("S2", props(&[("email", "ring@a")]));
        graph.add_node("S3", "seller", HashMap::new());

        let clusters = graph.detect_clusters();
        assert_eq!(clusters.len(), 2);
        let sizes: Vec<usize> = {
            let mut s: Vec<usize> = clusters.iter().map(|c| c.size).collect();
            s.sort_unstable();
            s
        };
        assert_eq!(sizes, vec![1, 2]);
    }

    #[test]
    fn investigate_filters_by_min_weight_and_derives_signals() {
        let graph = GraphEngine::new();
        graph.add_seller("S1", props(&[("email", "ring@a")]));
        graph.add_node("S2", "seller", props(&[("riskScore", "80")]));
        // riskScore needs to be numeric, not string, for the signal to trigger
        graph.add_node("S2", "seller", HashMap::from([("riskScore".to_string(), json!(80))]));
        graph.add_seller("S2", props(&[("email", "ring@a")]));
        graph.add_node("S5", "seller", HashMap::new());
        graph.add_edge("S1", "S5", "SIMILAR_ADDRESS", 0.5, HashMap::new());

        let evidence = graph.investigate("S1", 3, 0.6);
        let ids: Vec<&str> = evidence.iter().map(|e| e.node_id.as_str()).collect();
        assert!(ids.contains(&"S2"));
        assert!(!ids.contains(&"S5"), "low-weight edge should be filtered out");

        let s2 = evidence.iter().find(|e| e.node_id == "S2").unwrap();
        assert!(s2.triggered_signals.contains(&"high-risk-score".to_string()));
    }

    #[test]
    fn pagerank_favors_more_connected_nodes() {
        let graph = GraphEngine::new();
        graph.add_node("hub", "seller", HashMap::new());
        for leaf in ["L1", "L2", "L3"] {
            graph.add_node(leaf, "seller", HashMap::new());
            graph.add_edge("hub", leaf, "SHARED_EMAIL", 0.9, HashMap::new());
        }

        let ranks = graph.pagerank();
        let hub_rank = ranks["hub"];
        for leaf in ["L1", "L2", "L3"] {
            assert!(hub_rank >= ranks[leaf]);
        }
    }
}
