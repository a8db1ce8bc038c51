//! Domain primitives shared by more than one component.
//!
//! Types that belong to exactly one component (graph nodes, seller
//! profiles, agent state...) live in that component's own crate. This
//! module only holds the handful of types that cross crate boundaries:
//! the risk-event domain enumeration, the risk event itself, and the
//! feature-group enumeration with its fixed TTLs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed enumeration of risk domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Seller onboarding.
    Onboarding,
    /// Account takeover.
    Ato,
    /// Payout processing.
    Payout,
    /// Listing management.
    Listing,
    /// Shipping.
    Shipping,
    /// Transactions.
    Transaction,
    /// Account setup.
    AccountSetup,
    /// Item setup.
    ItemSetup,
    /// Pricing.
    Pricing,
    /// Profile updates.
    ProfileUpdates,
    /// Returns.
    Returns,
}

impl Domain {
    /// All domains, in a fixed order (used to iterate the weight table).
    pub const ALL: [Self; 11] = [
        Self::Onboarding,
        Self::Ato,
        Self::Payout,
        Self::Listing,
        Self::Shipping,
        Self::Transaction,
        Self::AccountSetup,
        Self::ItemSetup,
        Self::Pricing,
        Self::ProfileUpdates,
        Self::Returns,
    ];
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Onboarding => "onboarding",
            Self::Ato => "ato",
            Self::Payout => "payout",
            Self::Listing => "listing",
            Self::Shipping => "shipping",
            Self::Transaction => "transaction",
            Self::AccountSetup => "account_setup",
            Self::ItemSetup => "item_setup",
            Self::Pricing => "pricing",
            Self::ProfileUpdates => "profile_updates",
            Self::Returns => "returns",
        };
        f.write_str(s)
    }
}

/// An immutable risk event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskEvent {
    /// Unique event id.
    pub event_id: String,
    /// Seller this event is about.
    pub seller_id: String,
    /// Risk domain.
    pub domain: Domain,
    /// Free-form event type within the domain (e.g. `"VELOCITY_SPIKE"`).
    pub event_type: String,
    /// Raw score in `[-100, 100]`.
    pub risk_score: f64,
    /// Arbitrary metadata.
    pub metadata: serde_json::Value,
    /// Epoch-ms creation time.
    pub created_at: i64,
}

/// The fixed feature-group enumeration with its per-group TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    /// Seller profile features, TTL 5 minutes.
    SellerProfile,
    /// Transaction velocity features, TTL 1 minute.
    TransactionVelocity,
    /// Device trust features, TTL 2 minutes.
    DeviceTrust,
    /// Network risk features, TTL 5 minutes.
    NetworkRisk,
}

impl FeatureGroup {
    /// The group's TTL in milliseconds.
    #[must_use]
    pub const fn ttl_millis(self) -> i64 {
        match self {
            Self::SellerProfile | Self::NetworkRisk => 5 * 60 * 1000,
            Self::TransactionVelocity => 60 * 1000,
            Self::DeviceTrust => 2 * 60 * 1000,
        }
    }
}

impl fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SellerProfile => "seller_profile",
            Self::TransactionVelocity => "transaction_velocity",
            Self::DeviceTrust => "device_trust",
            Self::NetworkRisk => "network_risk",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_group_ttls_are_fixed() {
        assert_eq!(FeatureGroup::SellerProfile.ttl_millis(), 300_000);
        assert_eq!(FeatureGroup::TransactionVelocity.ttl_millis(), 60_000);
        assert_eq!(FeatureGroup::DeviceTrust.ttl_millis(), 120_000);
        assert_eq!(FeatureGroup::NetworkRisk.ttl_millis(), 300_000);
    }

    #[test]
    fn domain_display_matches_wire_form() {
        assert_eq!(Domain::AccountSetup.to_string(), "account_setup");
        assert_eq!(Domain::Ato.to_string(), "ato");
    }
}
