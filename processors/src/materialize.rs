use std::sync::Arc;

use fraudguard_core::domain::FeatureGroup;
use fraudguard_core::environment::Clock;
use fraudguard_features::FeatureStore;
use fraudguard_streaming::Message;
use tracing::warn;

use crate::runner::Processor;

fn parse_group(name: &str) -> Option<FeatureGroup> {
    match name {
        "seller_profile" => Some(FeatureGroup::SellerProfile),
        "transaction_velocity" => Some(FeatureGroup::TransactionVelocity),
        "device_trust" => Some(FeatureGroup::DeviceTrust),
        "network_risk" => Some(FeatureGroup::NetworkRisk),
        _ => None,
    }
}

/// Direct passthrough: reads `{entityId, group, features}` and writes it to
/// the feature store with a `materialized_at` stamp added. At-most-once:
/// malformed messages are logged and dropped, never retried.
pub struct FeatureMaterializationProcessor {
    feature_store: Arc<FeatureStore>,
    clock: Arc<dyn Clock>,
}

impl FeatureMaterializationProcessor {
    /// Builds the processor against a shared feature store.
    #[must_use]
    pub fn new(feature_store: Arc<FeatureStore>, clock: Arc<dyn Clock>) -> Self {
        Self { feature_store, clock }
    }
}

impl Processor for FeatureMaterializationProcessor {
    fn group_id(&self) -> &str {
        "processor:feature-materialization"
    }

    fn topic(&self) -> &str {
        "features.materialized"
    }

    fn handle(&self, message: &Message) {
        let Some(entity_id) = message.value.get("entityId").and_then(|v| v.as_str()) else {
            warn!("features.materialized message missing entityId, skipping");
            return;
        };
        let Some(group_name) = message.value.get("group").and_then(|v| v.as_str()) else {
            warn!(entity_id, "features.materialized message missing group, skipping");
            return;
        };
        let Some(group) = parse_group(group_name) else {
            warn!(entity_id, group = group_name, "unknown feature group, skipping");
            return;
        };
        let Some(features) = message.value.get("features").cloned() else {
            warn!(entity_id, "features.materialized message missing features, skipping");
            return;
        };

        let mut payload = features;
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("materialized_at".to_string(), serde_json::json!(self.clock.now_millis()));
        }

        self.feature_store.put_features(entity_id, group, payload);
    }
}
