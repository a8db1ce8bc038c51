//! The fixed risk-factor table and recommendation thresholds used by the
//! `Observe` step of the reasoning cycle.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named, fixed-weight contributor to an investigation's composite score.
#[derive(Debug, Clone, Copy)]
pub struct RiskFactor {
    /// The factor's name, matched case-insensitively against signals found
    /// in gathered evidence (dashes and underscores are equivalent).
    pub name: &'static str,
    /// Points added to the composite score when this factor fires.
    pub points: f64,
    /// Whether this factor alone forces a BLOCK recommendation.
    pub critical: bool,
}

/// The fixed risk-factor table. Graph-investigation signal names
/// (`high-risk-score`, `fraud-history`, `watchlist-match`, `rejected-entity`)
/// are included alongside the named factors called out in the original
/// design (`impossible_travel`, `fraud_network_connection`,
/// `blocklist_match`) so that either vocabulary fires the same scoring path.
pub const RISK_FACTORS: &[RiskFactor] = &[
    RiskFactor { name: "impossible-travel", points: 35.0, critical: false },
    RiskFactor { name: "fraud-network-connection", points: 40.0, critical: false },
    RiskFactor { name: "blocklist-match", points: 45.0, critical: true },
    RiskFactor { name: "watchlist-match", points: 45.0, critical: true },
    RiskFactor { name: "fraud-history", points: 30.0, critical: false },
    RiskFactor { name: "rejected-entity", points: 25.0, critical: false },
    RiskFactor { name: "high-risk-score", points: 20.0, critical: false },
];

fn normalize(signal: &str) -> String {
    signal.to_lowercase().replace('_', "-")
}

fn factor_for(signal: &str) -> Option<&'static RiskFactor> {
    let normalized = normalize(signal);
    RISK_FACTORS.iter().find(|f| f.name == normalized)
}

/// Base points contributed by a seller's current effective risk tier, when a
/// `risk_history` tool result is among the gathered evidence.
fn tier_points(tier: &str) -> f64 {
    match tier {
        "CRITICAL" => 40.0,
        "HIGH" => 25.0,
        "MEDIUM" => 10.0,
        _ => 0.0,
    }
}

/// A named contribution to the composite score, kept for the structured
/// report assembled at the end of `Observe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreContribution {
    /// Human-readable source (a factor name, `"ml_query"`, or `"risk_tier"`).
    pub source: String,
    /// Points this source contributed.
    pub points: f64,
    /// Whether this contribution alone is a critical factor.
    pub critical: bool,
}

/// The final recommendation from a reasoning cycle's Observe step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    /// No action beyond standard monitoring.
    Approve,
    /// Flag for lightweight ongoing monitoring.
    Monitor,
    /// Escalate for manual review.
    Review,
    /// Block outright.
    Block,
}

impl Recommendation {
    /// Derive a recommendation from a composite score and whether any
    /// critical factor fired.
    #[must_use]
    pub fn from_score(composite_score: f64, any_critical: bool) -> Self {
        if composite_score > 85.0 || any_critical {
            Self::Block
        } else if composite_score > 60.0 {
            Self::Review
        } else if composite_score > 30.0 {
            Self::Monitor
        } else {
            Self::Approve
        }
    }
}

/// The result of scoring a set of gathered tool-call results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Composite score, clamped to `[0, 100]`.
    pub composite_score: f64,
    /// Whether any critical factor fired.
    pub any_critical: bool,
    /// Individual contributions, in the order they were found.
    pub contributions: Vec<ScoreContribution>,
    /// The derived recommendation.
    pub recommendation: Recommendation,
}

/// Recursively scans parsed tool-result JSON for risk-factor signals.
///
/// Recognizes a `"triggered_signals"` or `"signals"` array anywhere in the
/// value (as produced by `graph_query`'s investigation evidence), an
/// `"effective_tier"` string (as produced by `risk_history`'s profile mode),
/// and a top-level `"score"` number in `[0, 1]` (as produced by `ml_query`).
fn scan(value: &Value, contributions: &mut Vec<ScoreContribution>) {
    match value {
        Value::Object(map) => {
            for key in ["triggered_signals", "signals"] {
                if let Some(Value::Array(items)) = map.get(key) {
                    for item in items {
                        if let Some(signal) = item.as_str() {
                            if let Some(factor) = factor_for(signal) {
                                contributions.push(ScoreContribution {
                                    source: factor.name.to_string(),
                                    points: factor.points,
                                    critical: factor.critical,
                                });
                            }
                        }
                    }
                }
            }
            if let Some(tier) = map.get("effective_tier").and_then(Value::as_str) {
                let points = tier_points(tier);
                if points > 0.0 {
                    contributions.push(ScoreContribution {
                        source: "risk_tier".to_string(),
                        points,
                        critical: tier == "CRITICAL",
                    });
                }
            }
            if let Some(score) = map.get("score").and_then(Value::as_f64) {
                if (0.0..=1.0).contains(&score) {
                    contributions.push(ScoreContribution { source: "ml_query".to_string(), points: score * 45.0, critical: false });
                }
            }
            for nested in map.values() {
                scan(nested, contributions);
            }
        }
        Value::Array(items) => {
            for item in items {
                scan(item, contributions);
            }
        }
        _ => {}
    }
}

/// Scores a set of already-parsed tool-result JSON values and derives a
/// recommendation.
#[must_use]
pub fn score_evidence(results: &[Value]) -> ScoringResult {
    let mut contributions = Vec::new();
    for result in results {
        scan(result, &mut contributions);
    }

    let raw_total: f64 = contributions.iter().map(|c| c.points).sum();
    let composite_score = raw_total.clamp(0.0, 100.0);
    let any_critical = contributions.iter().any(|c| c.critical);
    let recommendation = Recommendation::from_score(composite_score, any_critical);

    ScoringResult { composite_score, any_critical, contributions, recommendation }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_thresholds_match_table() {
        assert_eq!(Recommendation::from_score(86.0, false), Recommendation::Block);
        assert_eq!(Recommendation::from_score(10.0, true), Recommendation::Block);
        assert_eq!(Recommendation::from_score(61.0, false), Recommendation::Review);
        assert_eq!(Recommendation::from_score(31.0, false), Recommendation::Monitor);
        assert_eq!(Recommendation::from_score(30.0, false), Recommendation::Approve);
    }

    #[test]
    fn scan_finds_triggered_signals_from_graph_evidence() {
        let evidence = serde_json::json!({
            "evidence": [
                { "node_id": "S2", "hop": 1, "relationship": "SHARED_EMAIL", "triggered_signals": ["watchlist-match"] }
            ]
        });
        let result = score_evidence(&[evidence]);
        assert!(result.any_critical);
        assert_eq!(result.recommendation, Recommendation::Block);
    }

    #[test]
    fn scan_combines_ml_score_and_risk_tier() {
        let ml = serde_json::json!({"model_name": "bust_out_v1", "score": 0.8});
        let profile = serde_json::json!({"sellerId": "S1", "profile": {"effective_tier": "HIGH"}});
        let result = score_evidence(&[ml, profile]);
        assert!((result.composite_score - (0.8 * 45.0 + 25.0)).abs() < 1e-9);
        assert_eq!(result.recommendation, Recommendation::Review);
    }

    #[test]
    fn empty_evidence_approves() {
        let result = score_evidence(&[]);
        assert_eq!(result.composite_score, 0.0);
        assert_eq!(result.recommendation, Recommendation::Approve);
    }

    #[test]
    fn signal_name_matching_is_case_and_separator_insensitive() {
        let evidence = serde_json::json!({"signals": ["FRAUD_NETWORK_CONNECTION"]});
        let result = score_evidence(&[evidence]);
        assert!((result.composite_score - 40.0).abs() < 1e-9);
    }
}
