use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use fraudguard_core::domain::{Domain, RiskEvent};
use fraudguard_core::environment::{Clock, IdGenerator};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::profile::{compute_domain_and_composite, SellerProfile, Tier};

/// 48-hour de-escalation cooldown: a recomputation that would lower the
/// tier within this window of the last tier change is suppressed.
const COOLDOWN_MILLIS: i64 = 48 * 60 * 60 * 1000;

/// One point on a seller's risk trajectory, as replayed from `getHistory`.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPoint {
    /// The triggering event's timestamp.
    pub timestamp: i64,
    /// Composite score as of this event (decayed against this event's time, not now).
    pub composite_score: f64,
    /// Tier in effect as of this event, with hysteresis applied through the replay.
    pub tier: Tier,
    /// Clamped `[0,100]` decayed score per domain, as of this event.
    pub domain_scores: HashMap<String, f64>,
    /// The event that produced this point.
    pub trigger_event: RiskEvent,
}

struct SellerState {
    events: Vec<RiskEvent>,
    profile: SellerProfile,
}

impl SellerState {
    fn new(seller_id: &str, now: i64) -> Self {
        Self {
            events: Vec::new(),
            profile: SellerProfile {
                seller_id: seller_id.to_string(),
                domain_scores: HashMap::new(),
                composite_score: 0.0,
                raw_tier: Tier::Low,
                effective_tier: Tier::Low,
                last_tier_change: now,
                manual_override: None,
            },
        }
    }

    fn recompute(&mut self, now: i64) {
        let (domain_scores, composite) = compute_domain_and_composite(&self.events, now);
        let raw_tier = Tier::from_score(composite);

        let previous_effective = self.profile.effective_tier;
        let within_cooldown = now - self.profile.last_tier_change < COOLDOWN_MILLIS;
        let would_deescalate = raw_tier < previous_effective;

        let effective_tier = if would_deescalate && within_cooldown {
            previous_effective
        } else {
            raw_tier
        };

        if effective_tier != previous_effective {
            self.profile.last_tier_change = now;
        }

        self.profile.domain_scores = domain_scores;
        self.profile.composite_score = composite;
        self.profile.raw_tier = raw_tier;
        self.profile.effective_tier = self.profile.manual_override.unwrap_or(effective_tier);
    }
}

/// Per-seller composite risk scoring: domain-weighted, exponentially
/// decayed, tier-hysteresis gated. Every seller is guarded by its own lock
/// so concurrent events for different sellers never contend, while events
/// for the same seller recompute atomically.
pub struct RiskProfileEngine {
    sellers: RwLock<HashMap<String, Arc<Mutex<SellerState>>>>,
    clock: Arc<dyn Clock>,
    id_generator: Arc<dyn IdGenerator>,
}

impl RiskProfileEngine {
    /// Builds an empty engine.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, id_generator: Arc<dyn IdGenerator>) -> Self {
        Self { sellers: RwLock::new(HashMap::new()), clock, id_generator }
    }

    fn state_for(&self, seller_id: &str) -> Arc<Mutex<SellerState>> {
        {
            let sellers = self.sellers.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(state) = sellers.get(seller_id) {
                return state.clone();
            }
        }
        let mut sellers = self.sellers.write().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now_millis();
        sellers.entry(seller_id.to_string()).or_insert_with(|| Arc::new(Mutex::new(SellerState::new(seller_id, now)))).clone()
    }

    /// Persists a risk event and atomically re-derives the seller's profile
    /// from its full event history.
    pub fn emit_risk_event(&self, seller_id: &str, domain: Domain, event_type: &str, risk_score: f64, metadata: Value) -> SellerProfile {
        let state_arc = self.state_for(seller_id);
        let mut state = state_arc.lock().unwrap_or_else(PoisonError::into_inner);

        let now = self.clock.now_millis();
        let event = RiskEvent {
            event_id: self.id_generator.next_id(),
            seller_id: seller_id.to_string(),
            domain,
            event_type: event_type.to_string(),
            risk_score,
            metadata,
            created_at: now,
        };
        state.events.push(event);
        state.recompute(now);

        info!(seller_id, %domain, event_type, tier = %state.profile.effective_tier, "risk profile recomputed");
        state.profile.clone()
    }

    /// Sets (or clears, with `None`) a manual tier override, which
    /// supersedes all computation until cleared.
    pub fn set_manual_override(&self, seller_id: &str, tier: Option<Tier>) -> SellerProfile {
        let state_arc = self.state_for(seller_id);
        let mut state = state_arc.lock().unwrap_or_else(PoisonError::into_inner);
        state.profile.manual_override = tier;
        let now = self.clock.now_millis();
        state.recompute(now);
        state.profile.clone()
    }

    /// Current profile, if the seller has ever had an event.
    #[must_use]
    pub fn get_profile(&self, seller_id: &str) -> Option<SellerProfile> {
        let sellers = self.sellers.read().unwrap_or_else(PoisonError::into_inner);
        let state = sellers.get(seller_id)?;
        let state = state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.events.is_empty() {
            None
        } else {
            Some(state.profile.clone())
        }
    }

    /// Every event recorded for a seller, in chronological order. Empty if
    /// the seller has never had an event.
    #[must_use]
    pub fn events_for(&self, seller_id: &str) -> Vec<RiskEvent> {
        let sellers = self.sellers.read().unwrap_or_else(PoisonError::into_inner);
        let Some(state_arc) = sellers.get(seller_id) else { return Vec::new() };
        let state = state_arc.lock().unwrap_or_else(PoisonError::into_inner);
        let mut events = state.events.clone();
        events.sort_by_key(|e| e.created_at);
        events
    }

    /// Replays every event for a seller in chronological order, recomputing
    /// decayed domain sums as-of each event's own timestamp so the
    /// trajectory is causally faithful (never uses wall-clock "now").
    #[must_use]
    pub fn get_history(&self, seller_id: &str) -> Vec<HistoryPoint> {
        let sellers = self.sellers.read().unwrap_or_else(PoisonError::into_inner);
        let Some(state_arc) = sellers.get(seller_id) else { return Vec::new() };
        let state = state_arc.lock().unwrap_or_else(PoisonError::into_inner);

        let mut events = state.events.clone();
        events.sort_by_key(|e| e.created_at);
        drop(state);

        let mut history = Vec::with_capacity(events.len());
        let mut last_effective = Tier::Low;
        let mut last_tier_change = events.first().map_or(0, |e| e.created_at);

        for (index, event) in events.iter().enumerate() {
            let as_of = event.created_at;
            let (domain_scores, composite) = compute_domain_and_composite(&events[..=index], as_of);
            let raw_tier = Tier::from_score(composite);

            let within_cooldown = as_of - last_tier_change < COOLDOWN_MILLIS;
            let would_deescalate = raw_tier < last_effective;
            let effective = if would_deescalate && within_cooldown { last_effective } else { raw_tier };
            if effective != last_effective {
                last_tier_change = as_of;
            }
            last_effective = effective;

            history.push(HistoryPoint {
                timestamp: as_of,
                composite_score: composite,
                tier: effective,
                domain_scores,
                trigger_event: event.clone(),
            });
        }
        history
    }
}
