//! Chain-of-thought builder: an ordered trace of reasoning steps owned by
//! exactly one reasoning cycle at a time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The kind of a single chain-of-thought step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepType {
    /// A raw observation about the input or gathered evidence.
    Observation,
    /// A candidate explanation awaiting validation.
    Hypothesis,
    /// A derived analysis over one or more prior steps.
    Analysis,
    /// Evidence supporting or contradicting a hypothesis.
    Evidence,
    /// A conclusion inferred from analyses and evidence.
    Inference,
    /// A final conclusion for the reasoning cycle.
    Conclusion,
    /// A tool invocation and its outcome.
    Action,
    /// The result of validating a hypothesis against its evidence.
    Validation,
}

/// A single step in a chain of thought.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Monotonically increasing id within this chain.
    pub step_id: u64,
    /// The step's kind.
    pub step_type: StepType,
    /// Free-form content.
    pub content: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Step ids this step supports.
    pub supports: Vec<u64>,
    /// Step ids this step contradicts.
    pub contradicts: Vec<u64>,
    /// Arbitrary structured metadata.
    pub metadata: serde_json::Value,
}

/// Result of validating a hypothesis against the evidence recorded so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The hypothesis step that was validated.
    pub hypothesis_step_id: u64,
    /// Sum of supporting evidence confidence.
    pub supporting_weight: f64,
    /// Sum of contradicting evidence confidence.
    pub contradicting_weight: f64,
    /// The hypothesis's confidence after adjustment.
    pub adjusted_confidence: f64,
}

const MAX_CONFIDENCE_ADJUSTMENT: f64 = 0.3;

/// Builds an ordered chain-of-thought trace for a single reasoning cycle.
///
/// Not `Clone`/`Send` by design: a chain belongs to the cycle that owns it
/// and is handed off to `Reflect` by value, never shared.
#[derive(Debug, Default)]
pub struct ChainOfThought {
    steps: Vec<Step>,
    next_id: u64,
}

impl ChainOfThought {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        &mut self,
        step_type: StepType,
        content: impl Into<String>,
        confidence: f64,
        supports: Vec<u64>,
        contradicts: Vec<u64>,
        metadata: serde_json::Value,
    ) -> u64 {
        let step_id = self.next_id;
        self.next_id += 1;
        self.steps.push(Step {
            step_id,
            step_type,
            content: content.into(),
            confidence: confidence.clamp(0.0, 1.0),
            supports,
            contradicts,
            metadata,
        });
        step_id
    }

    /// Record a raw observation.
    pub fn observe(&mut self, content: impl Into<String>, confidence: f64) -> u64 {
        self.push(StepType::Observation, content, confidence, vec![], vec![], serde_json::Value::Null)
    }

    /// Record a candidate hypothesis.
    pub fn hypothesize(&mut self, content: impl Into<String>, confidence: f64) -> u64 {
        self.push(StepType::Hypothesis, content, confidence, vec![], vec![], serde_json::Value::Null)
    }

    /// Record evidence that supports or contradicts a hypothesis.
    pub fn evidence(
        &mut self,
        content: impl Into<String>,
        weight: f64,
        supports: &[u64],
        contradicts: &[u64],
    ) -> u64 {
        self.push(
            StepType::Evidence,
            content,
            weight,
            supports.to_vec(),
            contradicts.to_vec(),
            serde_json::Value::Null,
        )
    }

    /// Record a derived analysis.
    pub fn analyze(&mut self, content: impl Into<String>, confidence: f64, based_on: &[u64]) -> u64 {
        self.push(StepType::Analysis, content, confidence, based_on.to_vec(), vec![], serde_json::Value::Null)
    }

    /// Record an inference.
    pub fn infer(&mut self, content: impl Into<String>, confidence: f64, based_on: &[u64]) -> u64 {
        self.push(StepType::Inference, content, confidence, based_on.to_vec(), vec![], serde_json::Value::Null)
    }

    /// Record the cycle's final conclusion.
    pub fn conclude(&mut self, content: impl Into<String>, confidence: f64, based_on: &[u64]) -> u64 {
        self.push(StepType::Conclusion, content, confidence, based_on.to_vec(), vec![], serde_json::Value::Null)
    }

    /// Record a tool invocation and its result.
    pub fn action(&mut self, content: impl Into<String>, metadata: serde_json::Value) -> u64 {
        self.push(StepType::Action, content, 1.0, vec![], vec![], metadata)
    }

    /// Validate a hypothesis by aggregating the confidence of every evidence
    /// step that names it in `supports` or `contradicts`, then nudging the
    /// hypothesis's own confidence by at most [`MAX_CONFIDENCE_ADJUSTMENT`] in
    /// the direction the evidence favors.
    pub fn validate_hypothesis(&mut self, hypothesis_step_id: u64) -> ValidationResult {
        let mut supporting_weight = 0.0;
        let mut contradicting_weight = 0.0;
        for step in &self.steps {
            if step.step_type != StepType::Evidence {
                continue;
            }
            if step.supports.contains(&hypothesis_step_id) {
                supporting_weight += step.confidence;
            }
            if step.contradicts.contains(&hypothesis_step_id) {
                contradicting_weight += step.confidence;
            }
        }

        let net = supporting_weight - contradicting_weight;
        let total = supporting_weight + contradicting_weight;
        let adjustment = if total > 0.0 {
            (net / total) * MAX_CONFIDENCE_ADJUSTMENT
        } else {
            0.0
        };

        let original = self
            .steps
            .iter()
            .find(|s| s.step_id == hypothesis_step_id)
            .map_or(0.5, |s| s.confidence);
        let adjusted = (original + adjustment).clamp(0.0, 1.0);

        if let Some(step) = self.steps.iter_mut().find(|s| s.step_id == hypothesis_step_id) {
            step.confidence = adjusted;
        }

        self.push(
            StepType::Validation,
            format!("validated hypothesis #{hypothesis_step_id}"),
            adjusted,
            vec![hypothesis_step_id],
            vec![],
            serde_json::json!({
                "supportingWeight": supporting_weight,
                "contradictingWeight": contradicting_weight,
            }),
        );

        ValidationResult {
            hypothesis_step_id,
            supporting_weight,
            contradicting_weight,
            adjusted_confidence: adjusted,
        }
    }

    /// The full ordered trace.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// A step by id, if present.
    #[must_use]
    pub fn step(&self, step_id: u64) -> Option<&Step> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    /// Serializes the trace to a persistable JSON blob, for handoff to
    /// `Reflect` (knowledge-base storage).
    #[must_use]
    pub fn to_trace_document(&self) -> serde_json::Value {
        serde_json::json!({ "steps": self.steps })
    }

    /// A flat tally of step types, useful for reporting.
    #[must_use]
    pub fn step_type_counts(&self) -> HashMap<&'static str, usize> {
        let mut counts = HashMap::new();
        for step in &self.steps {
            let key = match step.step_type {
                StepType::Observation => "observation",
                StepType::Hypothesis => "hypothesis",
                StepType::Analysis => "analysis",
                StepType::Evidence => "evidence",
                StepType::Inference => "inference",
                StepType::Conclusion => "conclusion",
                StepType::Action => "action",
                StepType::Validation => "validation",
            };
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_hypothesis_increases_confidence_when_evidence_supports() {
        let mut cot = ChainOfThought::new();
        let hypothesis = cot.hypothesize("seller is part of a collusion ring", 0.5);
        cot.evidence("shared device fingerprint with known ring member", 0.8, &[hypothesis], &[]);
        cot.evidence("shared payout account", 0.6, &[hypothesis], &[]);

        let result = cot.validate_hypothesis(hypothesis);
        assert!(result.adjusted_confidence > 0.5);
        assert!((result.supporting_weight - 1.4).abs() < 1e-9);
        assert_eq!(result.contradicting_weight, 0.0);
    }

    #[test]
    fn validate_hypothesis_decreases_confidence_when_evidence_contradicts() {
        let mut cot = ChainOfThought::new();
        let hypothesis = cot.hypothesize("account takeover in progress", 0.6);
        cot.evidence("login from a previously trusted device", 0.9, &[], &[hypothesis]);

        let result = cot.validate_hypothesis(hypothesis);
        assert!(result.adjusted_confidence < 0.6);
    }

    #[test]
    fn validate_hypothesis_without_evidence_leaves_confidence_unchanged() {
        let mut cot = ChainOfThought::new();
        let hypothesis = cot.hypothesize("no supporting signal yet", 0.4);
        let result = cot.validate_hypothesis(hypothesis);
        assert!((result.adjusted_confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn adjustment_never_exceeds_max_regardless_of_evidence_imbalance() {
        let mut cot = ChainOfThought::new();
        let hypothesis = cot.hypothesize("x", 0.5);
        for _ in 0..10 {
            cot.evidence("strong support", 1.0, &[hypothesis], &[]);
        }
        let result = cot.validate_hypothesis(hypothesis);
        assert!((result.adjusted_confidence - 0.8).abs() < 1e-9);
    }
}
