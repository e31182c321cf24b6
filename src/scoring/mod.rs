// Scoring Engine
// Turns raw per-frame measurements into a composite importance score and
// smooths the resulting stream before it reaches the segmenter.

pub mod importance;
pub mod expression;
pub mod smoothing;


use serde::{Deserialize, Serialize};

use crate::constants::{
    CHANNEL_MAX, EXPRESSION_MAX, SCORE_WEIGHT_AUDIO, SCORE_WEIGHT_BRIGHTNESS,
    SCORE_WEIGHT_DIFFERENCE, SCORE_WEIGHT_EXPRESSION,
};
use crate::error::{ClipforgeError, Result};

pub use expression::ExpressionProbabilities;
pub use importance::ImportanceScorer;
pub use smoothing::SmoothingBuffer;

/// One timestamped measurement tuple from the external frame sampler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSample {
    pub timestamp: f64,
    #[serde(default)]
    pub audio_energy: f64,
    #[serde(default)]
    pub brightness: f64,
    #[serde(default)]
    pub frame_difference: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_score: Option<f64>,
    /// Raw detector output, used when no precomputed expression score is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expressions: Option<ExpressionProbabilities>,
}

impl FrameSample {
    pub fn new(timestamp: f64, audio_energy: f64, brightness: f64, frame_difference: f64) -> Self {
        Self {
            timestamp,
            audio_energy,
            brightness,
            frame_difference,
            expression_score: None,
            expressions: None,
        }
    }

    pub fn with_expression(mut self, expression_score: f64) -> Self {
        self.expression_score = Some(expression_score);
        self
    }

    pub fn with_expressions(mut self, expressions: ExpressionProbabilities) -> Self {
        self.expressions = Some(expressions);
        self
    }

    /// Resolved expression score in [0, 1]. An explicit score wins over
    /// detector probabilities; a frame with neither contributes 0.
    pub fn expression(&self) -> f64 {
        match (self.expression_score, &self.expressions) {
            (Some(score), _) => clamp_unit(score, EXPRESSION_MAX),
            (None, Some(probabilities)) => probabilities.expression_score(),
            (None, None) => 0.0,
        }
    }

    pub(crate) fn audio_energy_clamped(&self) -> f64 {
        clamp_unit(self.audio_energy, CHANNEL_MAX)
    }

    pub(crate) fn brightness_clamped(&self) -> f64 {
        clamp_unit(self.brightness, CHANNEL_MAX)
    }

    pub(crate) fn frame_difference_clamped(&self) -> f64 {
        clamp_unit(self.frame_difference, CHANNEL_MAX)
    }
}

/// Component weights for the importance score (tunable via EngineConfig)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreWeights {
    pub audio: f64,
    pub brightness: f64,
    pub difference: f64,
    pub expression: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            audio: SCORE_WEIGHT_AUDIO,
            brightness: SCORE_WEIGHT_BRIGHTNESS,
            difference: SCORE_WEIGHT_DIFFERENCE,
            expression: SCORE_WEIGHT_EXPRESSION,
        }
    }
}

impl ScoreWeights {
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("audio", self.audio),
            ("brightness", self.brightness),
            ("difference", self.difference),
            ("expression", self.expression),
        ];

        for (name, weight) in named {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ClipforgeError::config(format!(
                    "score weight '{}' must be a finite, non-negative number (got {})",
                    name, weight
                )));
            }
        }

        Ok(())
    }
}

/// Clamp a raw measurement into [0, max]; NaN reads as 0
pub(crate) fn clamp_unit(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}
