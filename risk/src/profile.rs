use std::collections::HashMap;
use std::fmt;

use fraudguard_core::domain::Domain;
use serde::{Deserialize, Serialize};

/// Fixed per-domain weights, applied to clamped domain scores to form the
/// composite score. Sums to 1.0.
pub const DOMAIN_WEIGHTS: [(Domain, f64); 11] = [
    (Domain::Onboarding, 0.12),
    (Domain::Ato, 0.14),
    (Domain::Payout, 0.12),
    (Domain::Listing, 0.07),
    (Domain::Shipping, 0.10),
    (Domain::Transaction, 0.08),
    (Domain::AccountSetup, 0.08),
    (Domain::ItemSetup, 0.07),
    (Domain::Pricing, 0.08),
    (Domain::ProfileUpdates, 0.07),
    (Domain::Returns, 0.07),
];

#[must_use]
pub fn weight_for(domain: Domain) -> f64 {
    DOMAIN_WEIGHTS.iter().find(|(d, _)| *d == domain).map_or(0.0, |(_, w)| *w)
}

const HALF_LIFE_DAYS: f64 = 30.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Exponential decay with a 30-day half-life.
#[must_use]
pub fn decay(original_score: f64, now_millis: i64, event_millis: i64) -> f64 {
    let days_since = (now_millis - event_millis).max(0) as f64 / MILLIS_PER_DAY;
    original_score * 0.5_f64.powf(days_since / HALF_LIFE_DAYS)
}

/// Tier derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    /// `[0, 30]`.
    Low,
    /// `[31, 60]`.
    Medium,
    /// `[61, 85]`.
    High,
    /// `[86, 100]`.
    Critical,
}

impl Tier {
    /// Classifies a clamped `[0,100]` composite score.
    #[must_use]
    pub const fn from_score(score: f64) -> Self {
        if score > 85.0 {
            Self::Critical
        } else if score > 60.0 {
            Self::High
        } else if score > 30.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Actions derived solely from this tier.
    #[must_use]
    pub const fn active_actions(self) -> &'static [&'static str] {
        match self {
            Self::Critical => &["suspend_seller", "block_transactions", "hold_payouts", "suspend_listings"],
            Self::High => &["suspend_listings", "hold_payouts", "review_large_transactions"],
            Self::Medium => &["hold_large_payouts", "flag"],
            Self::Low => &[],
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Tier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(()),
        }
    }
}

/// A seller's current composite risk standing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerProfile {
    /// Seller id.
    pub seller_id: String,
    /// Clamped `[0,100]` decayed score per domain.
    pub domain_scores: HashMap<String, f64>,
    /// Weighted composite, rounded to 2 decimal places, clamped `[0,100]`.
    pub composite_score: f64,
    /// Tier implied by `composite_score` alone, ignoring hysteresis/override.
    pub raw_tier: Tier,
    /// Tier actually in effect, after hysteresis and manual override.
    pub effective_tier: Tier,
    /// Epoch ms of the last effective tier change.
    pub last_tier_change: i64,
    /// Manual override tier, if set; supersedes all computation.
    pub manual_override: Option<Tier>,
}

impl SellerProfile {
    /// Actions derived from the effective tier.
    #[must_use]
    pub const fn active_actions(&self) -> &'static [&'static str] {
        self.effective_tier.active_actions()
    }
}

/// Sums decayed scores per domain as of `as_of_millis`, clamping each domain
/// sum to `[0,100]`, then forms the rounded, clamped composite.
#[must_use]
pub fn compute_domain_and_composite(events: &[fraudguard_core::domain::RiskEvent], as_of_millis: i64) -> (HashMap<String, f64>, f64) {
    let mut sums: HashMap<Domain, f64> = HashMap::new();
    for event in events {
        if event.created_at > as_of_millis {
            continue;
        }
        let decayed = decay(event.risk_score, as_of_millis, event.created_at);
        *sums.entry(event.domain).or_insert(0.0) += decayed;
    }

    let mut domain_scores = HashMap::new();
    let mut composite = 0.0;
    for (domain, weight) in DOMAIN_WEIGHTS {
        let clamped = sums.get(&domain).copied().unwrap_or(0.0).clamp(0.0, 100.0);
        domain_scores.insert(domain.to_string(), clamped);
        composite += clamped * weight;
    }
    composite = (composite.clamp(0.0, 100.0) * 100.0).round() / 100.0;
    (domain_scores, composite)
}
