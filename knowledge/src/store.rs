use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use fraudguard_core::environment::{Clock, IdGenerator};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::chunker::chunk_document;
use crate::namespace::Namespace;
use crate::tokenizer::{tokenize, weighted_jaccard};

/// A stored knowledge entry: either a standalone record or one chunk of a
/// larger document.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeEntry {
    /// Unique id.
    pub id: String,
    /// Namespace this entry belongs to.
    pub namespace: Namespace,
    /// Raw text.
    pub text: String,
    /// Token frequencies, computed once at insert time.
    #[serde(skip)]
    pub tokens: HashMap<String, u32>,
    /// Arbitrary metadata, including the optional `sellerId`/`domain`/`outcome`/`category` filter fields.
    pub metadata: Value,
    /// Set when this entry is a chunk of a larger document.
    pub parent_document_id: Option<String>,
    /// Zero-based chunk index, set alongside `parent_document_id`.
    pub chunk_index: Option<usize>,
    /// Total chunk count for the parent document.
    pub total_chunks: Option<usize>,
    /// Epoch-ms insertion time.
    pub created_at: i64,
}

/// Optional equality filters applied before scoring.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Restrict to entries whose metadata `sellerId` matches.
    pub seller_id: Option<String>,
    /// Restrict to entries whose metadata `domain` matches.
    pub domain: Option<String>,
    /// Restrict to entries whose metadata `outcome` matches.
    pub outcome: Option<String>,
    /// Restrict to entries whose metadata `category` matches.
    pub category: Option<String>,
}

impl SearchFilters {
    fn matches(&self, metadata: &Value) -> bool {
        let field_matches = |field: &Option<String>, key: &str| {
            field.as_ref().is_none_or(|want| metadata.get(key).and_then(Value::as_str) == Some(want.as_str()))
        };
        field_matches(&self.seller_id, "sellerId")
            && field_matches(&self.domain, "domain")
            && field_matches(&self.outcome, "outcome")
            && field_matches(&self.category, "category")
    }
}

/// A scored search hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// The matched entry.
    pub entry: KnowledgeEntry,
    /// `0.7 * similarity + 0.3 * recencyBoost` (or just `recencyBoost` for an empty query).
    pub score: f64,
}

const RECENCY_HALF_LIFE_DAYS: f64 = 7.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

fn recency_boost(now: i64, created_at: i64) -> f64 {
    let days_since = (now - created_at).max(0) as f64 / MILLIS_PER_DAY;
    0.5_f64.powf(days_since / RECENCY_HALF_LIFE_DAYS)
}

/// Namespaced store of tokenized entries, searchable by weighted Jaccard
/// similarity boosted by recency.
pub struct KnowledgeBase {
    entries: RwLock<HashMap<String, KnowledgeEntry>>,
    by_namespace: RwLock<HashMap<Namespace, Vec<String>>>,
    clock: Arc<dyn Clock>,
    id_generator: Arc<dyn IdGenerator>,
}

impl KnowledgeBase {
    /// Builds an empty knowledge base.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, id_generator: Arc<dyn IdGenerator>) -> Self {
        Self { entries: RwLock::new(HashMap::new()), by_namespace: RwLock::new(HashMap::new()), clock, id_generator }
    }

    fn insert(&self, namespace: Namespace, text: String, metadata: Value, parent_document_id: Option<String>, chunk_index: Option<usize>, total_chunks: Option<usize>) -> KnowledgeEntry {
        let entry = KnowledgeEntry {
            id: self.id_generator.next_id(),
            namespace,
            tokens: tokenize(&text),
            text,
            metadata,
            parent_document_id,
            chunk_index,
            total_chunks,
            created_at: self.clock.now_millis(),
        };

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut by_namespace = self.by_namespace.write().unwrap_or_else(PoisonError::into_inner);
        by_namespace.entry(namespace).or_default().push(entry.id.clone());
        entries.insert(entry.id.clone(), entry.clone());
        debug!(namespace = %namespace, entry_id = %entry.id, "knowledge entry added");
        entry
    }

    /// Tokenizes and stores a single record.
    pub fn add_knowledge(&self, namespace: Namespace, text: impl Into<String>, metadata: Value) -> KnowledgeEntry {
        self.insert(namespace, text.into(), metadata, None, None, None)
    }

    /// Stores the full parent document plus its adaptive chunks, each
    /// chunk carrying `parentDocumentId`/`chunkIndex`/`totalChunks`.
    pub fn add_document_with_chunks(&self, namespace: Namespace, text: impl Into<String>, metadata: Value) -> (KnowledgeEntry, Vec<KnowledgeEntry>) {
        let text = text.into();
        let parent = self.insert(namespace, text.clone(), metadata.clone(), None, None, None);

        let chunks = chunk_document(&parent.id, &text);
        let total = chunks.len();
        let stored = chunks
            .into_iter()
            .map(|chunk| {
                let mut chunk_metadata = metadata.clone();
                if let Some(obj) = chunk_metadata.as_object_mut() {
                    obj.insert("parentDocumentId".to_string(), Value::String(parent.id.clone()));
                    obj.insert("chunkIndex".to_string(), Value::from(chunk.chunk_index));
                    obj.insert("totalChunks".to_string(), Value::from(total));
                }
                self.insert(namespace, chunk.text, chunk_metadata, Some(parent.id.clone()), Some(chunk.chunk_index), Some(total))
            })
            .collect();
        (parent, stored)
    }

    /// Weighted-Jaccard + recency-boosted search within a namespace. Empty
    /// queries return the most recent matching entries instead of scoring.
    #[must_use]
    pub fn search(&self, namespace: Namespace, query: &str, filters: &SearchFilters, top_k: usize) -> Vec<SearchResult> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let by_namespace = self.by_namespace.read().unwrap_or_else(PoisonError::into_inner);
        let Some(ids) = by_namespace.get(&namespace) else { return Vec::new() };

        let candidates: Vec<&KnowledgeEntry> =
            ids.iter().filter_map(|id| entries.get(id)).filter(|e| filters.matches(&e.metadata)).collect();

        let now = self.clock.now_millis();

        if query.trim().is_empty() {
            let mut recent: Vec<&KnowledgeEntry> = candidates;
            recent.sort_by_key(|e| std::cmp::Reverse(e.created_at));
            return recent
                .into_iter()
                .take(top_k)
                .map(|entry| SearchResult { entry: entry.clone(), score: recency_boost(now, entry.created_at) })
                .collect();
        }

        let query_tokens = tokenize(query);
        let mut scored: Vec<SearchResult> = candidates
            .into_iter()
            .map(|entry| {
                let similarity = weighted_jaccard(&query_tokens, &entry.tokens);
                let score = 0.7 * similarity + 0.3 * recency_boost(now, entry.created_at);
                SearchResult { entry: entry.clone(), score }
            })
            .filter(|result| result.score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        scored
    }

    /// Fetches a single entry by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<KnowledgeEntry> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).get(id).cloned()
    }
}
