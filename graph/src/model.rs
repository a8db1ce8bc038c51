use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Node property names that are indexed for co-occurrence discovery.
pub const INDEXED_PROPERTIES: &[&str] =
    &["email", "phone", "ipAddress", "accountNumber", "taxId", "deviceFingerprint", "address"];

/// A typed node with arbitrary properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Node id.
    pub id: String,
    /// Node type (e.g. `"seller"`).
    #[serde(rename = "type")]
    pub node_type: String,
    /// Arbitrary properties.
    pub properties: HashMap<String, serde_json::Value>,
}

/// An undirected, weighted edge. `id` is computed as
/// `"E-<src>-<dst>-<type>"` with endpoints in canonical (lexicographically
/// smaller first) order, so one edge exists per `(pair, type)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Canonical edge id.
    pub id: String,
    /// Canonically-ordered source endpoint.
    pub source: String,
    /// Canonically-ordered target endpoint.
    pub target: String,
    /// Relationship type (e.g. `"SHARED_EMAIL"`).
    #[serde(rename = "type")]
    pub edge_type: String,
    /// Arbitrary edge properties.
    pub properties: HashMap<String, serde_json::Value>,
    /// Edge strength in `(0, 1]`.
    pub weight: f64,
}

/// Normalizes an indexed property value for co-occurrence lookup: trim then
/// lowercase.
#[must_use]
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Canonical (source, target) ordering: lexicographically smaller id first.
#[must_use]
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Builds the canonical edge id for `(a, b, edge_type)`.
#[must_use]
pub fn edge_id(a: &str, b: &str, edge_type: &str) -> String {
    let (src, dst) = canonical_pair(a, b);
    format!("E-{src}-{dst}-{edge_type}")
}

/// The fixed weight table for relationships discovered via shared indexed
/// properties.
#[must_use]
pub const fn weight_for_property(property: &str) -> Option<(&'static str, f64)> {
    match property.as_bytes() {
        b"accountNumber" => Some(("SHARED_BANK", 0.95)),
        b"taxId" => Some(("SHARED_TAX_ID", 0.95)),
        b"email" => Some(("SHARED_EMAIL", 0.9)),
        b"phone" => Some(("SHARED_PHONE", 0.85)),
        b"deviceFingerprint" => Some(("SHARED_DEVICE", 0.8)),
        b"ipAddress" => Some(("SHARED_IP", 0.7)),
        b"address" => Some(("SIMILAR_ADDRESS", 0.6)),
        _ => None,
    }
}
