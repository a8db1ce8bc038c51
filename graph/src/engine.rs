use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{PoisonError, RwLock};

use serde_json::Value;
use tracing::debug;

use crate::model::{canonical_pair, edge_id, normalize, weight_for_property, GraphEdge, GraphNode, INDEXED_PROPERTIES};

/// A decayed-risk contribution reaching a node through propagation.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct PropagatedRisk {
    /// Hops from the source node.
    pub hop: u32,
    /// Propagated risk score.
    pub score: f64,
}

/// One weakly connected component.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Cluster {
    /// Member node ids.
    pub nodes: Vec<String>,
    /// Mean of members' numeric `riskScore` property (missing treated as 0).
    pub avg_risk: f64,
    /// Member count.
    pub size: usize,
}

/// One hop of an investigation BFS.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InvestigationEvidence {
    /// Reached node id.
    pub node_id: String,
    /// Hops from the start node.
    pub hop: u32,
    /// Edge type traversed to reach this node.
    pub relationship: String,
    /// Signals derived from the node's properties.
    pub triggered_signals: Vec<String>,
}

/// Per-hop multiplicative dampening applied during risk propagation, shared
/// with PageRank's damping factor.
const DECAY_FACTOR: f64 = 0.85;
const PAGERANK_ITERATIONS: u32 = 30;

/// The property graph: nodes, undirected weighted edges, adjacency lists,
/// and property indexes for co-occurrence discovery.
#[derive(Default)]
pub struct GraphEngine {
    nodes: RwLock<HashMap<String, GraphNode>>,
    edges: RwLock<HashMap<String, GraphEdge>>,
    adjacency: RwLock<HashMap<String, HashSet<String>>>,
    property_index: RwLock<HashMap<String, HashMap<String, HashSet<String>>>>,
}

impl GraphEngine {
    /// Builds an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, merging properties if it already exists (a no-op on
    /// structure when called twice with identical args), re-indexing any
    /// indexed properties that changed.
    pub fn add_node(&self, id: &str, node_type: &str, properties: HashMap<String, Value>) -> GraphNode {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        let old_indexed: HashMap<String, String> = nodes
            .get(id)
            .map(|n| {
                INDEXED_PROPERTIES
                    .iter()
                    .filter_map(|p| n.properties.get(*p).and_then(Value::as_str).map(|v| ((*p).to_string(), normalize(v))))
                    .collect()
            })
            .unwrap_or_default();

        let node = nodes
            .entry(id.to_string())
            .and_modify(|n| n.properties.extend(properties.clone()))
            .or_insert_with(|| GraphNode { id: id.to_string(), node_type: node_type.to_string(), properties: properties.clone() })
            .clone();
        drop(nodes);

        self.reindex_node(id, &old_indexed, &node.properties);
        node
    }

    fn reindex_node(&self, id: &str, old_indexed: &HashMap<String, String>, properties: &HashMap<String, Value>) {
        let mut index = self.property_index.write().unwrap_or_else(PoisonError::into_inner);
        for property in INDEXED_PROPERTIES {
            let new_value = properties.get(*property).and_then(Value::as_str).map(normalize);
            let old_value = old_indexed.get(*property);
            if old_value == new_value.as_ref() {
                continue;
            }
            if let Some(old) = old_value {
                if let Some(bucket) = index.get_mut(*property).and_then(|m| m.get_mut(old)) {
                    bucket.remove(id);
                }
            }
            if let Some(new) = &new_value {
                index
                    .entry((*property).to_string())
                    .or_default()
                    .entry(new.clone())
                    .or_default()
                    .insert(id.to_string());
            }
        }
    }

    /// Fetches a node by id.
    #[must_use]
    pub fn get_node(&self, id: &str) -> Option<GraphNode> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).get(id).cloned()
    }

    /// Creates (or returns, if already present) the canonical edge between
    /// `a` and `b` of `edge_type`.
    pub fn add_edge(&self, a: &str, b: &str, edge_type: &str, weight: f64, properties: HashMap<String, Value>) -> GraphEdge {
        let (src, dst) = canonical_pair(a, b);
        let id = edge_id(a, b, edge_type);
        let mut edges = self.edges.write().unwrap_or_else(PoisonError::into_inner);
        let edge = edges
            .entry(id.clone())
            .or_insert_with(|| GraphEdge {
                id: id.clone(),
                source: src.to_string(),
                target: dst.to_string(),
                edge_type: edge_type.to_string(),
                properties,
                weight,
            })
            .clone();
        drop(edges);

        let mut adjacency = self.adjacency.write().unwrap_or_else(PoisonError::into_inner);
        adjacency.entry(src.to_string()).or_default().insert(id.clone());
        adjacency.entry(dst.to_string()).or_default().insert(id);
        edge
    }

    /// Adds a seller node and, for each indexed property it carries, creates
    /// relationship edges to every node already sharing that normalized
    /// value, using the fixed type/weight table.
    pub fn add_seller(&self, id: &str, properties: HashMap<String, Value>) -> Vec<GraphEdge> {
        self.add_node(id, "seller", properties.clone());

        let mut created = Vec::new();
        for property in INDEXED_PROPERTIES {
            let Some(value) = properties.get(*property).and_then(Value::as_str) else { continue };
            let Some((edge_type, weight)) = weight_for_property(property) else { continue };
            let normalized = normalize(value);

            let co_occurring: Vec<String> = {
                let index = self.property_index.read().unwrap_or_else(PoisonError::into_inner);
                index
                    .get(*property)
                    .and_then(|m| m.get(&normalized))
                    .map(|set| set.iter().filter(|other| other.as_str() != id).cloned().collect())
                    .unwrap_or_default()
            };

            for other in co_occurring {
                let edge = self.add_edge(id, &other, edge_type, weight, HashMap::new());
                debug!(seller = id, other = %edge.target, edge_type, "incremental relationship discovered");
                created.push(edge);
            }
        }
        created
    }

    fn edges_of(&self, node_id: &str) -> Vec<GraphEdge> {
        let adjacency = self.adjacency.read().unwrap_or_else(PoisonError::into_inner);
        let Some(edge_ids) = adjacency.get(node_id) else { return Vec::new() };
        let edges = self.edges.read().unwrap_or_else(PoisonError::into_inner);
        edge_ids.iter().filter_map(|id| edges.get(id).cloned()).collect()
    }

    fn other_end<'a>(edge: &'a GraphEdge, node_id: &str) -> &'a str {
        if edge.source == node_id {
            &edge.target
        } else {
            &edge.source
        }
    }

    /// BFS induced subgraph reachable from `id` within `depth` hops,
    /// optionally restricted to `edge_types`.
    #[must_use]
    pub fn get_neighbors(&self, id: &str, depth: u32, edge_types: Option<&[String]>) -> (Vec<String>, Vec<GraphEdge>) {
        let mut visited = HashSet::from([id.to_string()]);
        let mut queue = VecDeque::from([(id.to_string(), 0u32)]);
        let mut result_edges = Vec::new();

        while let Some((current, hop)) = queue.pop_front() {
            if hop >= depth {
                continue;
            }
            for edge in self.edges_of(&current) {
                if let Some(types) = edge_types {
                    if !types.iter().any(|t| t == &edge.edge_type) {
                        continue;
                    }
                }
                let next = Self::other_end(&edge, &current).to_string();
                result_edges.push(edge);
                if visited.insert(next.clone()) {
                    queue.push_back((next, hop + 1));
                }
            }
        }
        visited.remove(id);
        let mut nodes: Vec<String> = visited.into_iter().collect();
        nodes.push(id.to_string());
        nodes.sort_unstable();
        (nodes, result_edges)
    }

    /// Propagates `source_risk` out from `source_id` via BFS, dampening by
    /// `DECAY_FACTOR` per hop on top of the traversed edges' weights. Ties
    /// (same hop) are broken in favor of the larger score.
    #[must_use]
    pub fn propagate_risk(&self, source_id: &str, source_risk: f64) -> HashMap<String, PropagatedRisk> {
        let mut best: HashMap<String, PropagatedRisk> = HashMap::new();
        let mut queue = VecDeque::from([(source_id.to_string(), source_risk, 0u32)]);
        let mut visited_at_hop: HashMap<String, u32> = HashMap::from([(source_id.to_string(), 0)]);

        while let Some((current, score, hop)) = queue.pop_front() {
            for edge in self.edges_of(&current) {
                let next = Self::other_end(&edge, &current).to_string();
                if next == source_id {
                    continue;
                }
                let candidate = score * edge.weight * DECAY_FACTOR;
                let next_hop = hop + 1;

                let already_visited_at_this_hop = visited_at_hop.get(&next).copied() == Some(next_hop);
                let unvisited = !visited_at_hop.contains_key(&next);

                if unvisited {
                    visited_at_hop.insert(next.clone(), next_hop);
                    best.insert(next.clone(), PropagatedRisk { hop: next_hop, score: candidate });
                    queue.push_back((next, candidate, next_hop));
                } else if already_visited_at_this_hop {
                    if let Some(existing) = best.get_mut(&next) {
                        if candidate > existing.score {
                            existing.score = candidate;
                        }
                    }
                }
            }
        }
        best
    }

    /// Weakly connected components via union-find, each annotated with the
    /// mean of members' numeric `riskScore` property.
    #[must_use]
    pub fn detect_clusters(&self) -> Vec<Cluster> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        let edges = self.edges.read().unwrap_or_else(PoisonError::into_inner);

        let mut parent: HashMap<String, String> = nodes.keys().map(|id| (id.clone(), id.clone())).collect();

        fn find(parent: &mut HashMap<String, String>, x: &str) -> String {
            let p = parent.get(x).cloned().unwrap_or_else(|| x.to_string());
            if p == x {
                p
            } else {
                let root = find(parent, &p);
                parent.insert(x.to_string(), root.clone());
                root
            }
        }

        for edge in edges.values() {
            let root_a = find(&mut parent, &edge.source);
            let root_b = find(&mut parent, &edge.target);
            if root_a != root_b {
                parent.insert(root_a, root_b);
            }
        }

        let mut groups: HashMap<String, Vec<String>> = HashMap::new();
        for id in nodes.keys() {
            let root = find(&mut parent, id);
            groups.entry(root).or_default().push(id.clone());
        }

        groups
            .into_values()
            .map(|members| {
                let total: f64 = members
                    .iter()
                    .filter_map(|id| nodes.get(id))
                    .map(|n| n.properties.get("riskScore").and_then(Value::as_f64).unwrap_or(0.0))
                    .sum();
                let size = members.len();
                Cluster { avg_risk: if size == 0 { 0.0 } else { total / size as f64 }, nodes: members, size }
            })
            .collect()
    }

    fn triggered_signals(properties: &HashMap<String, Value>) -> Vec<String> {
        let mut signals = Vec::new();
        if properties.get("riskScore").and_then(Value::as_f64).is_some_and(|s| s >= 70.0) {
            signals.push("high-risk-score".to_string());
        }
        if properties.get("fraudHistory").and_then(Value::as_bool) == Some(true) {
            signals.push("fraud-history".to_string());
        }
        if properties.get("watchlistMatch").and_then(Value::as_bool) == Some(true) {
            signals.push("watchlist-match".to_string());
        }
        if properties.get("status").and_then(Value::as_str) == Some("REJECTED") {
            signals.push("rejected-entity".to_string());
        }
        signals
    }

    /// BFS up to `max_hops`, traversing only edges with `weight >= min_weight`,
    /// skipping the start node from the results.
    #[must_use]
    pub fn investigate(&self, start_id: &str, max_hops: u32, min_weight: f64) -> Vec<InvestigationEvidence> {
        let mut visited = HashSet::from([start_id.to_string()]);
        let mut queue = VecDeque::from([(start_id.to_string(), 0u32)]);
        let mut evidence = Vec::new();

        while let Some((current, hop)) = queue.pop_front() {
            if hop >= max_hops {
                continue;
            }
            for edge in self.edges_of(&current) {
                if edge.weight < min_weight {
                    continue;
                }
                let next = Self::other_end(&edge, &current).to_string();
                if !visited.insert(next.clone()) {
                    continue;
                }
                let properties = self.get_node(&next).map(|n| n.properties).unwrap_or_default();
                evidence.push(InvestigationEvidence {
                    node_id: next.clone(),
                    hop: hop + 1,
                    relationship: edge.edge_type.clone(),
                    triggered_signals: Self::triggered_signals(&properties),
                });
                queue.push_back((next, hop + 1));
            }
        }
        evidence
    }

    /// Standard iterative PageRank (damping 0.85, 30 iterations, uniform
    /// teleport) over a snapshot of the current adjacency, so the write lock
    /// is never held for the duration of the iteration.
    #[must_use]
    pub fn pagerank(&self) -> HashMap<String, f64> {
        let adjacency: HashMap<String, HashSet<String>> =
            self.adjacency.read().unwrap_or_else(PoisonError::into_inner).clone();
        let node_ids: Vec<String> = self.nodes.read().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect();
        let n = node_ids.len();
        if n == 0 {
            return HashMap::new();
        }

        let edges: HashMap<String, GraphEdge> = self.edges.read().unwrap_or_else(PoisonError::into_inner).clone();
        let neighbors_of = |id: &str| -> Vec<String> {
            adjacency
                .get(id)
                .map(|edge_ids| edge_ids.iter().filter_map(|eid| edges.get(eid)).map(|e| Self::other_end(e, id).to_string()).collect())
                .unwrap_or_default()
        };

        let mut rank: HashMap<String, f64> = node_ids.iter().map(|id| (id.clone(), 1.0 / n as f64)).collect();
        for _ in 0..PAGERANK_ITERATIONS {
            let mut next: HashMap<String, f64> = node_ids.iter().map(|id| (id.clone(), (1.0 - DECAY_FACTOR) / n as f64)).collect();
            for id in &node_ids {
                let out_neighbors = neighbors_of(id);
                if out_neighbors.is_empty() {
                    continue;
                }
                let share = rank[id] * DECAY_FACTOR / out_neighbors.len() as f64;
                for neighbor in out_neighbors {
                    *next.entry(neighbor).or_insert(0.0) += share;
                }
            }
            rank = next;
        }
        rank
    }
}
