//! Self-correction log: records every prediction an agent makes so a later
//! pass can compare it against a ground-truth outcome and feed the result
//! back into the confidence calibrator.

use serde::{Deserialize, Serialize};

/// A single logged prediction, awaiting eventual outcome review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedPrediction {
    /// Unique id for this prediction.
    pub id: String,
    /// Subject the prediction was about (e.g. a seller id).
    pub subject_id: String,
    /// The recommendation predicted.
    pub recommendation: String,
    /// Confidence at prediction time, if known.
    pub predicted_confidence: Option<f64>,
    /// Epoch-ms time of the prediction.
    pub predicted_at: i64,
    /// Whether the prediction was later confirmed correct. `None` until
    /// reviewed.
    pub was_correct: Option<bool>,
    /// Epoch-ms time of review, if reviewed.
    pub reviewed_at: Option<i64>,
}

/// Append-only log of predictions pending outcome review.
#[derive(Debug, Default)]
pub struct SelfCorrectionLog {
    predictions: Vec<LoggedPrediction>,
}

impl SelfCorrectionLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new prediction.
    pub fn record(
        &mut self,
        id: impl Into<String>,
        subject_id: impl Into<String>,
        recommendation: impl Into<String>,
        predicted_confidence: Option<f64>,
        predicted_at: i64,
    ) {
        self.predictions.push(LoggedPrediction {
            id: id.into(),
            subject_id: subject_id.into(),
            recommendation: recommendation.into(),
            predicted_confidence,
            predicted_at,
            was_correct: None,
            reviewed_at: None,
        });
    }

    /// Mark a prediction reviewed with its ground-truth outcome. Returns the
    /// prediction's recorded confidence (for feeding the calibrator) if the
    /// id was found and had not already been reviewed.
    pub fn review(&mut self, id: &str, was_correct: bool, reviewed_at: i64) -> Option<Option<f64>> {
        let prediction = self.predictions.iter_mut().find(|p| p.id == id && p.was_correct.is_none())?;
        prediction.was_correct = Some(was_correct);
        prediction.reviewed_at = Some(reviewed_at);
        Some(prediction.predicted_confidence)
    }

    /// Every prediction still awaiting review.
    #[must_use]
    pub fn pending_review(&self) -> Vec<&LoggedPrediction> {
        self.predictions.iter().filter(|p| p.was_correct.is_none()).collect()
    }

    /// All logged predictions.
    #[must_use]
    pub fn all(&self) -> &[LoggedPrediction] {
        &self.predictions
    }
}
