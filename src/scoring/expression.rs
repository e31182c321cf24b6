// Expression score
// Collapses a face detector's per-expression probabilities into one value.

use serde::{Deserialize, Serialize};

use crate::constants::{
    EXPRESSION_MAX, EXPRESSION_WEIGHT_ANGRY, EXPRESSION_WEIGHT_DISGUSTED,
    EXPRESSION_WEIGHT_FEARFUL, EXPRESSION_WEIGHT_HAPPY, EXPRESSION_WEIGHT_NEUTRAL,
    EXPRESSION_WEIGHT_SAD, EXPRESSION_WEIGHT_SURPRISED,
};
use super::clamp_unit;

/// Per-expression probabilities for the dominant face in a frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionProbabilities {
    pub happy: f64,
    pub surprised: f64,
    pub angry: f64,
    pub fearful: f64,
    pub disgusted: f64,
    pub sad: f64,
    pub neutral: f64,
}

impl ExpressionProbabilities {
    /// Weighted sum favouring strong positive reactions, clamped to [0, 1]
    pub fn expression_score(&self) -> f64 {
        let weighted = [
            (self.happy, EXPRESSION_WEIGHT_HAPPY),
            (self.surprised, EXPRESSION_WEIGHT_SURPRISED),
            (self.angry, EXPRESSION_WEIGHT_ANGRY),
            (self.fearful, EXPRESSION_WEIGHT_FEARFUL),
            (self.disgusted, EXPRESSION_WEIGHT_DISGUSTED),
            (self.sad, EXPRESSION_WEIGHT_SAD),
            (self.neutral, EXPRESSION_WEIGHT_NEUTRAL),
        ]
        .iter()
        .map(|(probability, weight)| clamp_unit(*probability, 1.0) * weight)
        .sum::<f64>();

        clamp_unit(weighted, EXPRESSION_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_happy_scores_one() {
        let p = ExpressionProbabilities { happy: 1.0, ..Default::default() };
        assert_eq!(p.expression_score(), 1.0);
    }

    #[test]
    fn test_neutral_face_scores_low() {
        let p = ExpressionProbabilities { neutral: 1.0, ..Default::default() };
        assert!((p.expression_score() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_mixed_expressions() {
        let p = ExpressionProbabilities {
            happy: 0.5,
            surprised: 0.25,
            neutral: 0.25,
            ..Default::default()
        };
        // 0.5 + 0.2 + 0.025
        assert!((p.expression_score() - 0.725).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_probabilities_clamped() {
        let p = ExpressionProbabilities {
            happy: 3.0,
            surprised: 2.0,
            sad: f64::NAN,
            ..Default::default()
        };
        assert_eq!(p.expression_score(), 1.0);
    }

    #[test]
    fn test_no_face_scores_zero() {
        assert_eq!(ExpressionProbabilities::default().expression_score(), 0.0);
    }
}
