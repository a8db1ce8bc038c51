//! Confidence calibration: turns a raw predicted confidence into one
//! corrected by the agent's own historical reliability at that confidence
//! level.

const NUM_BINS: usize = 10;
const DEFAULT_CONFIDENCE: f64 = 0.5;

fn bin_index(confidence: f64) -> usize {
    ((confidence.clamp(0.0, 1.0) * NUM_BINS as f64) as usize).min(NUM_BINS - 1)
}

#[derive(Debug, Clone, Copy, Default)]
struct Bin {
    correct: u64,
    total: u64,
}

/// Records `(predictedConfidence, wasCorrect)` pairs and returns a calibrated
/// confidence from the resulting binned reliability curve.
#[derive(Debug)]
pub struct ConfidenceCalibrator {
    bins: [Bin; NUM_BINS],
}

impl ConfidenceCalibrator {
    /// Create a calibrator with no history.
    #[must_use]
    pub fn new() -> Self {
        Self { bins: [Bin::default(); NUM_BINS] }
    }

    /// Record an outcome. `predicted_confidence` defaults to `0.5` if absent
    /// upstream — callers pass `None` for that case, preserved per the
    /// original decision to default an unset confidence rather than reject.
    pub fn record_outcome(&mut self, predicted_confidence: Option<f64>, was_correct: bool) {
        let confidence = predicted_confidence.unwrap_or(DEFAULT_CONFIDENCE);
        let bin = &mut self.bins[bin_index(confidence)];
        bin.total += 1;
        if was_correct {
            bin.correct += 1;
        }
    }

    /// Calibrate a raw confidence against the bin's observed accuracy. If the
    /// bin has no history yet, the raw confidence passes through unchanged.
    #[must_use]
    pub fn calibrate(&self, raw_confidence: f64) -> f64 {
        let bin = self.bins[bin_index(raw_confidence)];
        if bin.total == 0 {
            raw_confidence
        } else {
            bin.correct as f64 / bin.total as f64
        }
    }

    /// The full reliability curve: `(bin_lower_bound, accuracy, sample_count)`.
    #[must_use]
    pub fn reliability_curve(&self) -> Vec<(f64, f64, u64)> {
        self.bins
            .iter()
            .enumerate()
            .map(|(i, bin)| {
                let lower = i as f64 / NUM_BINS as f64;
                let accuracy = if bin.total == 0 { 0.0 } else { bin.correct as f64 / bin.total as f64 };
                (lower, accuracy, bin.total)
            })
            .collect()
    }
}

impl Default for ConfidenceCalibrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibrate_without_history_passes_through() {
        let calibrator = ConfidenceCalibrator::new();
        assert!((calibrator.calibrate(0.87) - 0.87).abs() < 1e-9);
    }

    #[test]
    fn calibrate_reflects_observed_accuracy_in_bin() {
        let mut calibrator = ConfidenceCalibrator::new();
        for _ in 0..3 {
            calibrator.record_outcome(Some(0.9), true);
        }
        calibrator.record_outcome(Some(0.9), false);

        assert!((calibrator.calibrate(0.92) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn missing_predicted_confidence_defaults_to_half() {
        let mut calibrator = ConfidenceCalibrator::new();
        calibrator.record_outcome(None, true);
        assert!((calibrator.calibrate(0.5) - 1.0).abs() < 1e-9);
    }
}
