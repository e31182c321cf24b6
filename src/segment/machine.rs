// Segmentation state machine
// Consumes the smoothed score stream one sample at a time and emits clip
// open/close boundaries under hysteresis thresholds and duration limits.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CLOSE_THRESHOLD, DEFAULT_LOOKBACK_SECS, DEFAULT_MAX_CLIP_DURATION_SECS,
    DEFAULT_MIN_CLOSE_DURATION_SECS, DEFAULT_OPEN_THRESHOLD,
};
use crate::error::{ClipforgeError, Result};

/// Thresholds and durations driving the state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SegmenterConfig {
    /// A clip opens when the smoothed score rises strictly above this
    pub open_threshold: f64,
    /// A clip may close once the score has stayed at or below this
    pub close_threshold: f64,
    /// Seconds of quiet required before a low score closes the clip
    pub min_close_duration: f64,
    /// Hard cap on the length of a single clip, in seconds
    pub max_clip_duration: f64,
    /// Pre-roll subtracted from the trigger time when a clip opens
    pub lookback: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            open_threshold: DEFAULT_OPEN_THRESHOLD,
            close_threshold: DEFAULT_CLOSE_THRESHOLD,
            min_close_duration: DEFAULT_MIN_CLOSE_DURATION_SECS,
            max_clip_duration: DEFAULT_MAX_CLIP_DURATION_SECS,
            lookback: DEFAULT_LOOKBACK_SECS,
        }
    }
}

impl SegmenterConfig {
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("openThreshold", self.open_threshold),
            ("closeThreshold", self.close_threshold),
            ("minCloseDuration", self.min_close_duration),
            ("maxClipDuration", self.max_clip_duration),
            ("lookback", self.lookback),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(ClipforgeError::config(format!("{} must be finite (got {})", name, value)));
            }
        }

        if self.open_threshold <= self.close_threshold {
            return Err(ClipforgeError::config(format!(
                "openThreshold ({}) must be greater than closeThreshold ({})",
                self.open_threshold, self.close_threshold
            )));
        }
        if self.min_close_duration < 0.0 {
            return Err(ClipforgeError::config("minCloseDuration must not be negative"));
        }
        if self.lookback < 0.0 {
            return Err(ClipforgeError::config("lookback must not be negative"));
        }
        // An interval must never be able to close on the step that opened it
        if self.max_clip_duration <= self.lookback {
            return Err(ClipforgeError::config(format!(
                "maxClipDuration ({}) must be greater than lookback ({})",
                self.max_clip_duration, self.lookback
            )));
        }
        if self.max_clip_duration < self.min_close_duration {
            return Err(ClipforgeError::config(format!(
                "maxClipDuration ({}) must not be shorter than minCloseDuration ({})",
                self.max_clip_duration, self.min_close_duration
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    Idle,
    Recording,
}

/// Why an interval was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Score stayed below the close threshold long enough
    Settled,
    /// Clip reached the maximum duration
    MaxDuration,
    /// Sample stream ended while recording
    EndOfStream,
}

/// A finished interval on the source timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedInterval {
    pub start_time: f64,
    pub duration: f64,
    pub peak_importance: f64,
    pub reason: CloseReason,
}

impl ClosedInterval {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    pub fn is_forced_final(&self) -> bool {
        self.reason == CloseReason::EndOfStream
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipBoundary {
    Open {
        start_time: f64,
        triggered_at: f64,
        score: f64,
    },
    Close(ClosedInterval),
}

#[derive(Debug, Clone, Copy)]
struct OpenInterval {
    start_time: f64,
    peak: f64,
    /// Timestamp of the first sample in the current run of low scores
    quiet_since: Option<f64>,
}

/// One segmentation run. Not reusable across videos: build a new one per run.
#[derive(Debug, Clone)]
pub struct Segmenter {
    config: SegmenterConfig,
    open: Option<OpenInterval>,
    last_timestamp: Option<f64>,
    last_clip_end: f64,
    halted: Option<(f64, f64)>,
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            open: None,
            last_timestamp: None,
            last_clip_end: 0.0,
            halted: None,
        })
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    pub fn state(&self) -> RecordingState {
        if self.open.is_some() {
            RecordingState::Recording
        } else {
            RecordingState::Idle
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// Feed one smoothed score. Timestamps must strictly increase; a
    /// violation halts the run and every later call fails the same way.
    pub fn advance(&mut self, timestamp: f64, score: f64) -> Result<Option<ClipBoundary>> {
        self.check_order(timestamp, false)?;
        self.last_timestamp = Some(timestamp);

        if self.open.is_none() {
            if score > self.config.open_threshold {
                return Ok(Some(self.open_at(timestamp, score)));
            }
            return Ok(None);
        }

        let Some(interval) = self.open.as_mut() else {
            return Ok(None);
        };

        interval.peak = interval.peak.max(score);

        if score <= self.config.close_threshold {
            interval.quiet_since.get_or_insert(timestamp);
        } else {
            interval.quiet_since = None;
        }

        let elapsed = timestamp - interval.start_time;
        let settled = elapsed >= self.config.min_close_duration
            && interval
                .quiet_since
                .map_or(false, |since| timestamp - since >= self.config.min_close_duration);

        if settled {
            return Ok(self.close_at(timestamp, CloseReason::Settled).map(ClipBoundary::Close));
        }
        if elapsed >= self.config.max_clip_duration {
            return Ok(self.close_at(timestamp, CloseReason::MaxDuration).map(ClipBoundary::Close));
        }

        Ok(None)
    }

    /// Force-close any open interval at end of stream, ending it at
    /// `last_timestamp`. A zero-length interval is dropped.
    pub fn finalize(&mut self, last_timestamp: f64) -> Result<Option<ClipBoundary>> {
        self.check_order(last_timestamp, true)?;
        self.last_timestamp = Some(last_timestamp);

        Ok(self
            .close_at(last_timestamp, CloseReason::EndOfStream)
            .map(ClipBoundary::Close))
    }

    fn open_at(&mut self, timestamp: f64, score: f64) -> ClipBoundary {
        // Pre-roll, but never back into the previous clip or before zero
        let start_time = (timestamp - self.config.lookback)
            .max(0.0)
            .max(self.last_clip_end);

        log::debug!(
            "clip open at {:.3}s (trigger {:.3}s, score {:.2})",
            start_time, timestamp, score
        );

        // Peak starts at the trigger score; with max > lookback and
        // score > open > close no close rule can fire on this step.
        self.open = Some(OpenInterval {
            start_time,
            peak: score,
            quiet_since: None,
        });

        ClipBoundary::Open {
            start_time,
            triggered_at: timestamp,
            score,
        }
    }

    fn close_at(&mut self, timestamp: f64, reason: CloseReason) -> Option<ClosedInterval> {
        let interval = self.open.take()?;
        let duration = timestamp - interval.start_time;

        if duration <= 0.0 {
            log::debug!("dropping zero-length interval at {:.3}s", interval.start_time);
            return None;
        }

        self.last_clip_end = timestamp;

        log::debug!(
            "clip close at {:.3}s after {:.3}s (peak {:.2}, {:?})",
            timestamp, duration, interval.peak, reason
        );

        Some(ClosedInterval {
            start_time: interval.start_time,
            duration,
            peak_importance: interval.peak,
            reason,
        })
    }

    fn check_order(&mut self, timestamp: f64, allow_equal: bool) -> Result<()> {
        if let Some((previous, current)) = self.halted {
            return Err(ClipforgeError::Ordering { previous, current });
        }

        let Some(previous) = self.last_timestamp else {
            if timestamp.is_nan() {
                self.halted = Some((f64::NAN, timestamp));
                return Err(ClipforgeError::Ordering { previous: f64::NAN, current: timestamp });
            }
            return Ok(());
        };

        let in_order = if allow_equal {
            timestamp >= previous
        } else {
            timestamp > previous
        };

        if !in_order {
            self.halted = Some((previous, timestamp));
            return Err(ClipforgeError::Ordering { previous, current: timestamp });
        }

        Ok(())
    }
}
