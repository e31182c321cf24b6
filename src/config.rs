// Clipforge - Engine Configuration
// One serde struct holding every tunable. Defaults come from constants.rs;
// a JSON file may override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MIN_SEGMENT_DURATION_SECS, DEFAULT_SAMPLE_INTERVAL_SECS, DEFAULT_SMOOTHING_WINDOW,
};
use crate::error::{ClipforgeError, Result};
use crate::scoring::ScoreWeights;
use crate::segment::SegmenterConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Logical seconds between frame samples
    pub sample_interval: f64,
    /// Moving-average window, in samples
    pub smoothing_window: usize,
    /// Finished clips shorter than this are dropped by the assembler
    pub min_segment_duration: f64,
    pub weights: ScoreWeights,
    pub segmenter: SegmenterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_interval: DEFAULT_SAMPLE_INTERVAL_SECS,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            min_segment_duration: DEFAULT_MIN_SEGMENT_DURATION_SECS,
            weights: ScoreWeights::default(),
            segmenter: SegmenterConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sample_interval.is_finite() || self.sample_interval <= 0.0 {
            return Err(ClipforgeError::config(format!(
                "sampleInterval must be a positive number (got {})",
                self.sample_interval
            )));
        }
        if self.smoothing_window < 1 {
            return Err(ClipforgeError::config("smoothingWindow must be at least 1"));
        }
        if !self.min_segment_duration.is_finite() || self.min_segment_duration < 0.0 {
            return Err(ClipforgeError::config(format!(
                "minSegmentDuration must be a non-negative number (got {})",
                self.min_segment_duration
            )));
        }
        self.weights.validate()?;
        self.segmenter.validate()?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.smoothing_window, 5);
        assert_eq!(config.segmenter.open_threshold, 20.0);
        assert_eq!(config.segmenter.close_threshold, 10.0);
    }

    #[test]
    fn test_partial_file_overrides_only_named_fields() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "smoothingWindow": 3, "segmenter": {{ "maxClipDuration": 30 }}, "weights": {{ "expression": 0 }} }}"#
        )
        .unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.smoothing_window, 3);
        assert_eq!(config.segmenter.max_clip_duration, 30.0);
        assert_eq!(config.segmenter.open_threshold, 20.0);
        assert_eq!(config.weights.expression, 0.0);
        assert_eq!(config.weights.audio, 30.0);
        assert_eq!(config.sample_interval, 0.1);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "segmenter": {{ "openThreshold": 5 }} }}"#).unwrap();

        let err = EngineConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ClipforgeError::Configuration(_)), "got {:?}", err);
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = EngineConfig { smoothing_window: 0, ..EngineConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_interval_rejected() {
        let config = EngineConfig { sample_interval: 0.0, ..EngineConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            EngineConfig::load(file.path()),
            Err(ClipforgeError::Json(_))
        ));
    }

    #[test]
    fn test_pretty_json_round_trips_defaults() {
        let text = EngineConfig::default().to_json_pretty().unwrap();
        let parsed: EngineConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, EngineConfig::default());
    }
}
