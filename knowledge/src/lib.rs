//! # FraudGuard Knowledge Base
//!
//! A namespaced, in-memory store of fraud-investigation notes, decisions,
//! and rule text. Search ranks by weighted Jaccard token similarity boosted
//! by recency, so a fresh near-duplicate outranks a stale exact match.

pub mod chunker;
pub mod error;
pub mod namespace;
pub mod store;
pub mod tokenizer;

pub use chunker::{chunk_document, Chunk};
pub use error::KnowledgeError;
pub use namespace::Namespace;
pub use store::{KnowledgeBase, KnowledgeEntry, SearchFilters, SearchResult};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use fraudguard_core::environment::{Clock, IdGenerator};
    use serde_json::json;
    use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
    use std::sync::Arc;

    struct FakeClock(AtomicI64);

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.timestamp_millis_opt(self.0.load(Ordering::SeqCst)).single().unwrap()
        }
        fn now_millis(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl FakeClock {
        fn advance_days(&self, days: i64) {
            self.0.fetch_add(days * 86_400_000, Ordering::SeqCst);
        }
    }

    struct FakeIdGenerator(AtomicU64);

    impl IdGenerator for FakeIdGenerator {
        fn next_id(&self) -> String {
            format!("kb-{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn kb() -> (Arc<FakeClock>, KnowledgeBase) {
        let clock = Arc::new(FakeClock(AtomicI64::new(0)));
        let kb = KnowledgeBase::new(clock.clone(), Arc::new(FakeIdGenerator(AtomicU64::new(0))));
        (clock, kb)
    }

    #[test]
    fn search_ranks_by_weighted_jaccard_similarity() {
        let (_clock, kb) = kb();
        kb.add_knowledge(Namespace::Decisions, "seller account flagged for velocity spike", json!({}));
        kb.add_knowledge(Namespace::Decisions, "shipping carrier delayed the package", json!({}));

        let results = kb.search(Namespace::Decisions, "velocity spike on seller account", &SearchFilters::default(), 5);
        assert!(!results.is_empty());
        assert!(results[0].entry.text.contains("velocity spike"));
    }

    #[test]
    fn empty_query_returns_most_recent() {
        let (clock, kb) = kb();
        kb.add_knowledge(Namespace::Rules, "old rule text", json!({}));
        clock.advance_days(1);
        kb.add_knowledge(Namespace::Rules, "new rule text", json!({}));

        let results = kb.search(Namespace::Rules, "", &SearchFilters::default(), 1);
        assert_eq!(results.len(), 1);
        assert!(results[0].entry.text.contains("new rule"));
    }

    #[test]
    fn filters_restrict_candidates_before_scoring() {
        let (_clock, kb) = kb();
        kb.add_knowledge(Namespace::Decisions, "velocity spike", json!({"sellerId": "S1"}));
        kb.add_knowledge(Namespace::Decisions, "velocity spike", json!({"sellerId": "S2"}));

        let filters = SearchFilters { seller_id: Some("S1".to_string()), ..Default::default() };
        let results = kb.search(Namespace::Decisions, "velocity spike", &filters, 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.metadata["sellerId"], "S1");
    }

    #[test]
    fn document_with_chunks_stores_parent_and_chunk_entries() {
        let (_clock, kb) = kb();
        let long_text = "The seller opened a new account. ".repeat(100);
        let (parent, chunks) = kb.add_document_with_chunks(Namespace::Onboarding, long_text, json!({}));

        assert!(chunks.len() > 1);
        for (index, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.parent_document_id.as_deref(), Some(parent.id.as_str()));
            assert_eq!(chunk.chunk_index, Some(index));
            assert_eq!(chunk.total_chunks, Some(chunks.len()));
        }
    }

    #[test]
    fn disjoint_query_scores_zero_and_is_excluded() {
        let (_clock, kb) = kb();
        kb.add_knowledge(Namespace::Rules, "shipping carrier policy", json!({}));
        let results = kb.search(Namespace::Rules, "unrelated velocity fraud terms", &SearchFilters::default(), 5);
        assert!(results.is_empty());
    }
}
