// Clip assembler
// Brackets media accumulation with the state machine's open/close events and
// packages each finished interval with its metadata.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{ClipforgeError, Result};
use super::machine::{ClipBoundary, CloseReason, ClosedInterval};

/// Opaque media accumulation. `begin` starts capturing at `start_time`,
/// `finish` stops and yields a handle covering exactly the closed interval,
/// `abort` throws the in-progress capture away.
pub trait MediaCapture {
    type Handle: Clone + Debug;

    fn begin(&mut self, start_time: f64) -> Result<()>;
    fn finish(&mut self, start_time: f64, duration: f64) -> Result<Self::Handle>;
    fn abort(&mut self);
}

/// A finished highlight clip
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipSegment<H> {
    pub id: Uuid,
    pub start_time: f64,
    pub duration: f64,
    pub peak_importance: f64,
    pub close_reason: CloseReason,
    pub media: H,
}

impl<H> ClipSegment<H> {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Clips from one run, in timeline order until ranked
pub type ClipSet<H> = Vec<ClipSegment<H>>;

pub struct ClipAssembler<C: MediaCapture> {
    capture: C,
    min_segment_duration: f64,
    clips: ClipSet<C::Handle>,
    discarded: usize,
    capturing: bool,
}

impl<C: MediaCapture> ClipAssembler<C> {
    pub fn new(capture: C, min_segment_duration: f64) -> Result<Self> {
        if !min_segment_duration.is_finite() || min_segment_duration < 0.0 {
            return Err(ClipforgeError::config(format!(
                "minSegmentDuration must be a non-negative number (got {})",
                min_segment_duration
            )));
        }
        Ok(Self {
            capture,
            min_segment_duration,
            clips: Vec::new(),
            discarded: 0,
            capturing: false,
        })
    }

    /// Apply one boundary event from the segmenter
    pub fn apply(&mut self, boundary: &ClipBoundary) -> Result<()> {
        match boundary {
            ClipBoundary::Open { start_time, .. } => {
                self.capture.begin(*start_time)?;
                self.capturing = true;
            }
            ClipBoundary::Close(interval) => self.close(interval)?,
        }
        Ok(())
    }

    fn close(&mut self, interval: &ClosedInterval) -> Result<()> {
        self.capturing = false;

        if interval.duration < self.min_segment_duration {
            log::debug!(
                "discarding {:.2}s clip at {:.3}s (minimum {:.2}s)",
                interval.duration, interval.start_time, self.min_segment_duration
            );
            self.capture.abort();
            self.discarded += 1;
            return Ok(());
        }

        let media = self.capture.finish(interval.start_time, interval.duration)?;
        self.clips.push(ClipSegment {
            id: clip_id(interval),
            start_time: interval.start_time,
            duration: interval.duration,
            peak_importance: interval.peak_importance,
            close_reason: interval.reason,
            media,
        });
        Ok(())
    }

    /// True between an open event and its close
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn clips(&self) -> &[ClipSegment<C::Handle>] {
        &self.clips
    }

    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn capture_mut(&mut self) -> &mut C {
        &mut self.capture
    }

    /// Abandon any unflushed capture and hand back the finished clips
    pub fn into_clips(mut self) -> ClipSet<C::Handle> {
        if self.capturing {
            self.capture.abort();
        }
        self.clips
    }
}

/// Stable id for a clip: the same interval always gets the same id, so
/// reports from repeated runs over one input compare equal.
fn clip_id(interval: &ClosedInterval) -> Uuid {
    let mut name = Vec::with_capacity(16);
    name.extend_from_slice(&interval.start_time.to_bits().to_be_bytes());
    name.extend_from_slice(&interval.duration.to_bits().to_be_bytes());
    Uuid::new_v5(&Uuid::NAMESPACE_OID, &name)
}

/// A time range inside a source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRange {
    pub source: PathBuf,
    pub start: f64,
    pub duration: f64,
}

/// Capture that records only where each clip lives in the source; the bytes
/// are cut out later by the exporter.
#[derive(Debug, Clone)]
pub struct RangeCapture {
    source: PathBuf,
    started_at: Option<f64>,
}

impl RangeCapture {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            started_at: None,
        }
    }
}

impl MediaCapture for RangeCapture {
    type Handle = MediaRange;

    fn begin(&mut self, start_time: f64) -> Result<()> {
        self.started_at = Some(start_time);
        Ok(())
    }

    fn finish(&mut self, start_time: f64, duration: f64) -> Result<MediaRange> {
        self.started_at = None;
        Ok(MediaRange {
            source: self.source.clone(),
            start: start_time,
            duration,
        })
    }

    fn abort(&mut self) {
        self.started_at = None;
    }
}

/// In-memory capture fed with one encoded chunk per sample. While idle it
/// keeps `retain` seconds of history so a clip's pre-roll is still
/// available when it opens.
///
/// Chunk timestamps and clip bounds come from different float arithmetic
/// (`i * step` vs `t - lookback`), so every comparison allows half a
/// sampling step of slack.
#[derive(Debug, Clone)]
pub struct BufferCapture {
    retain: f64,
    slack: f64,
    chunks: VecDeque<(f64, Vec<u8>)>,
    recording: bool,
}

impl BufferCapture {
    pub fn new(retain: f64, sample_interval: f64) -> Self {
        let slack = if sample_interval.is_finite() && sample_interval > 0.0 {
            sample_interval / 2.0
        } else {
            0.0
        };
        Self {
            retain: retain.max(0.0),
            slack,
            chunks: VecDeque::new(),
            recording: false,
        }
    }

    /// Retain exactly the segmenter's pre-roll at the configured sample rate
    pub fn for_config(config: &EngineConfig) -> Self {
        Self::new(config.segmenter.lookback, config.sample_interval)
    }

    /// Offer the media chunk for the sample at `timestamp`. Call before the
    /// sample is processed so the chunk is part of any clip it closes.
    pub fn feed(&mut self, timestamp: f64, chunk: Vec<u8>) {
        self.chunks.push_back((timestamp, chunk));
        if !self.recording {
            let horizon = timestamp - self.retain;
            self.evict_before(horizon);
        }
    }

    pub fn buffered_chunks(&self) -> usize {
        self.chunks.len()
    }

    fn evict_before(&mut self, horizon: f64) {
        let cutoff = horizon - self.slack;
        while self.chunks.front().map_or(false, |(t, _)| *t < cutoff) {
            self.chunks.pop_front();
        }
    }
}

impl MediaCapture for BufferCapture {
    type Handle = Vec<u8>;

    fn begin(&mut self, start_time: f64) -> Result<()> {
        self.recording = true;
        self.evict_before(start_time);
        Ok(())
    }

    fn finish(&mut self, start_time: f64, duration: f64) -> Result<Vec<u8>> {
        self.recording = false;
        let end = start_time + duration + self.slack;
        let mut payload = Vec::new();

        // Chunks up to and including the closing sample belong to this clip
        while let Some((t, _)) = self.chunks.front() {
            if *t > end {
                break;
            }
            if let Some((_, chunk)) = self.chunks.pop_front() {
                payload.extend_from_slice(&chunk);
            }
        }

        Ok(payload)
    }

    fn abort(&mut self) {
        self.recording = false;
    }
}
