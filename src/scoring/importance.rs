// Importance scorer
// Maps one frame's raw measurements (plus the previous frame, for change
// terms) to a composite importance value in [0, 100].

use crate::constants::{CHANNEL_MAX, IMPORTANCE_MAX, IMPORTANCE_MIN};
use crate::error::Result;
use super::{FrameSample, ScoreWeights};

/// Composite scorer. Holds only its weights, so one scorer can be shared by
/// any number of runs.
#[derive(Debug, Clone, Default)]
pub struct ImportanceScorer {
    weights: ScoreWeights,
}

impl ImportanceScorer {
    pub fn new(weights: ScoreWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Score a frame against its predecessor (None for the first frame).
    /// Never fails: out-of-range channels are clamped, NaN reads as 0.
    pub fn score(&self, sample: &FrameSample, previous: Option<&FrameSample>) -> f64 {
        let normalized_audio = sample.audio_energy_clamped() / CHANNEL_MAX;

        let (brightness_change, difference_change) = match previous {
            Some(prev) => (
                (sample.brightness_clamped() - prev.brightness_clamped()).abs() / CHANNEL_MAX,
                (sample.frame_difference_clamped() - prev.frame_difference_clamped()).abs() / CHANNEL_MAX,
            ),
            None => (0.0, 0.0),
        };

        let composite = self.weights.audio * normalized_audio
            + self.weights.brightness * brightness_change
            + self.weights.difference * difference_change
            + self.weights.expression * sample.expression();

        clamp_importance(composite)
    }
}

fn clamp_importance(value: f64) -> f64 {
    if value.is_nan() {
        return IMPORTANCE_MIN;
    }
    value.clamp(IMPORTANCE_MIN, IMPORTANCE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_has_no_change_terms() {
        let scorer = ImportanceScorer::default();
        let sample = FrameSample::new(0.0, 0.0, 255.0, 255.0);
        assert_eq!(scorer.score(&sample, None), 0.0);
    }

    #[test]
    fn test_audio_only() {
        let scorer = ImportanceScorer::default();
        let sample = FrameSample::new(0.0, 127.5, 0.0, 0.0);
        let score = scorer.score(&sample, None);
        assert!((score - 15.0).abs() < 1e-9, "half audio energy should score 15, got {}", score);
    }

    #[test]
    fn test_change_terms_use_absolute_difference() {
        let scorer = ImportanceScorer::default();
        let prev = FrameSample::new(0.0, 0.0, 200.0, 10.0);
        let next = FrameSample::new(0.1, 0.0, 149.0, 61.0);
        // 20 * 51/255 + 20 * 51/255 = 8
        let score = scorer.score(&next, Some(&prev));
        assert!((score - 8.0).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_custom_weights_cap_at_maximum() {
        let weights = ScoreWeights { audio: 500.0, ..ScoreWeights::default() };
        let scorer = ImportanceScorer::new(weights).unwrap();
        let sample = FrameSample::new(0.0, 255.0, 0.0, 0.0);
        assert_eq!(scorer.score(&sample, None), IMPORTANCE_MAX);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = ScoreWeights { brightness: -1.0, ..ScoreWeights::default() };
        assert!(ImportanceScorer::new(weights).is_err());
    }

    #[test]
    fn test_nan_weight_rejected() {
        let weights = ScoreWeights { expression: f64::NAN, ..ScoreWeights::default() };
        assert!(ImportanceScorer::new(weights).is_err());
    }
}
