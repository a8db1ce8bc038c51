use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use fraudguard_core::domain::{Domain, FeatureGroup, RiskEvent};
use fraudguard_features::FeatureStore;
use fraudguard_streaming::Message;
use tracing::warn;

use crate::runner::Processor;

#[derive(Debug, Default, Clone, Copy)]
struct DomainTally {
    count: u64,
    max: f64,
    sum: f64,
}

#[derive(Debug, Default)]
struct SellerAccumulator {
    total_signals: u64,
    max_severity: f64,
    domains: HashSet<Domain>,
    first_seen: Option<i64>,
    last_seen: Option<i64>,
    per_domain: HashMap<Domain, DomainTally>,
}

impl SellerAccumulator {
    fn record(&mut self, event: &RiskEvent) {
        self.total_signals += 1;
        self.max_severity = self.max_severity.max(event.risk_score);
        self.domains.insert(event.domain);
        self.first_seen = Some(self.first_seen.map_or(event.created_at, |t| t.min(event.created_at)));
        self.last_seen = Some(self.last_seen.map_or(event.created_at, |t| t.max(event.created_at)));

        let tally = self.per_domain.entry(event.domain).or_default();
        tally.count += 1;
        tally.max = tally.max.max(event.risk_score);
        tally.sum += event.risk_score;
    }

    fn to_payload(&self) -> serde_json::Value {
        let per_domain: serde_json::Map<String, serde_json::Value> = self
            .per_domain
            .iter()
            .map(|(domain, tally)| {
                (
                    domain.to_string(),
                    serde_json::json!({
                        "count": tally.count,
                        "max_severity": tally.max,
                        "avg_severity": if tally.count == 0 { 0.0 } else { tally.sum / tally.count as f64 },
                    }),
                )
            })
            .collect();

        serde_json::json!({
            "total_signals": self.total_signals,
            "max_severity": self.max_severity,
            "distinct_domains": self.domains.len(),
            "first_seen": self.first_seen,
            "last_seen": self.last_seen,
            "per_domain": per_domain,
        })
    }
}

/// Maintains per-seller risk-signal accumulators and materializes them into
/// the `network_risk` feature group.
pub struct RiskSignalAggregator {
    accumulators: RwLock<HashMap<String, SellerAccumulator>>,
    feature_store: Arc<FeatureStore>,
}

impl RiskSignalAggregator {
    /// Builds the processor against a shared feature store.
    #[must_use]
    pub fn new(feature_store: Arc<FeatureStore>) -> Self {
        Self { accumulators: RwLock::new(HashMap::new()), feature_store }
    }
}

impl Processor for RiskSignalAggregator {
    fn group_id(&self) -> &str {
        "processor:risk-signal-aggregator"
    }

    fn topic(&self) -> &str {
        "risk.events"
    }

    fn handle(&self, message: &Message) {
        let event: RiskEvent = match serde_json::from_value(message.value.clone()) {
            Ok(event) => event,
            Err(err) => {
                warn!(%err, "malformed risk event, skipping");
                return;
            }
        };

        let payload = {
            let mut accumulators = self.accumulators.write().unwrap_or_else(PoisonError::into_inner);
            let accumulator = accumulators.entry(event.seller_id.clone()).or_default();
            accumulator.record(&event);
            accumulator.to_payload()
        };

        self.feature_store.put_features(&event.seller_id, FeatureGroup::NetworkRisk, payload);
    }
}
