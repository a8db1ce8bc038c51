use std::sync::Arc;

use fraudguard_core::domain::FeatureGroup;
use fraudguard_core::environment::Clock;
use fraudguard_features::FeatureStore;
use fraudguard_streaming::Message;
use tracing::warn;

use crate::runner::Processor;
use crate::window::WindowedAggregator;

const ONE_HOUR_MS: i64 = 60 * 60 * 1000;
const ONE_DAY_MS: i64 = 24 * ONE_HOUR_MS;

/// Maintains per-seller 1h/24h tumbling windows of transaction amounts and
/// materializes the combined aggregate into the `transaction_velocity`
/// feature group.
pub struct TransactionVelocityProcessor {
    hourly: WindowedAggregator<String>,
    daily: WindowedAggregator<String>,
    feature_store: Arc<FeatureStore>,
    clock: Arc<dyn Clock>,
}

impl TransactionVelocityProcessor {
    /// Builds the processor against a shared feature store.
    #[must_use]
    pub fn new(feature_store: Arc<FeatureStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            hourly: WindowedAggregator::new(ONE_HOUR_MS, ONE_HOUR_MS),
            daily: WindowedAggregator::new(ONE_DAY_MS, ONE_DAY_MS),
            feature_store,
            clock,
        }
    }
}

impl Processor for TransactionVelocityProcessor {
    fn group_id(&self) -> &str {
        "processor:transaction-velocity"
    }

    fn topic(&self) -> &str {
        "transactions.decided"
    }

    fn handle(&self, message: &Message) {
        let Some(seller_id) = message.value.get("sellerId").and_then(|v| v.as_str()) else {
            warn!("transaction message missing sellerId, skipping");
            return;
        };
        let Some(amount) = message.value.get("amount").and_then(serde_json::Value::as_f64) else {
            warn!(seller_id, "transaction message missing amount, skipping");
            return;
        };

        self.hourly.add(seller_id.to_string(), amount, message.timestamp);
        self.daily.add(seller_id.to_string(), amount, message.timestamp);

        let now = self.clock.now_millis();
        let hour = self.hourly.current(&seller_id.to_string(), now);
        let day = self.daily.current(&seller_id.to_string(), now);

        self.feature_store.put_features(
            seller_id,
            FeatureGroup::TransactionVelocity,
            serde_json::json!({
                "transactions_1h": hour.count,
                "amount_1h": hour.sum,
                "avg_amount_1h": hour.avg(),
                "min_amount_1h": hour.min,
                "max_amount_1h": hour.max,
                "transactions_24h": day.count,
                "amount_24h": day.sum,
                "avg_amount_24h": day.avg(),
                "min_amount_24h": day.min,
                "max_amount_24h": day.max,
            }),
        );
    }
}
