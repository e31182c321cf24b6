// Clipforge - Segmentation Pipeline
// Drives one run: scorer -> smoothing buffer -> state machine -> assembler.
// Each run owns all of its state, so separate videos can be processed in
// parallel without coordination.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::scoring::{FrameSample, ImportanceScorer, SmoothingBuffer};
use crate::segment::{
    ClipAssembler, ClipBoundary, ClipSet, MediaCapture, RecordingState, Segmenter,
};

/// Outcome of one segmentation run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport<H> {
    /// Clips in timeline order (empty is a valid outcome)
    pub clips: ClipSet<H>,
    pub samples_processed: usize,
    /// Clips dropped for being shorter than the minimum segment duration
    pub discarded_short: usize,
    pub peak_smoothed: f64,
    pub last_timestamp: Option<f64>,
}

/// Incremental form of a run, for drivers that interleave their own work
/// (such as feeding a BufferCapture) with sample processing.
pub struct SegmentationRun<C: MediaCapture> {
    scorer: ImportanceScorer,
    buffer: SmoothingBuffer,
    segmenter: Segmenter,
    assembler: ClipAssembler<C>,
    previous: Option<FrameSample>,
    samples_processed: usize,
    peak_smoothed: f64,
}

impl<C: MediaCapture> SegmentationRun<C> {
    pub fn new(config: &EngineConfig, capture: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scorer: ImportanceScorer::new(config.weights.clone())?,
            buffer: SmoothingBuffer::new(config.smoothing_window)?,
            segmenter: Segmenter::new(config.segmenter.clone())?,
            assembler: ClipAssembler::new(capture, config.min_segment_duration)?,
            previous: None,
            samples_processed: 0,
            peak_smoothed: 0.0,
        })
    }

    /// Score, smooth and segment one sample
    pub fn process(&mut self, sample: FrameSample) -> Result<Option<ClipBoundary>> {
        let importance = self.scorer.score(&sample, self.previous.as_ref());
        let smoothed = self.buffer.push(importance);

        let event = self.segmenter.advance(sample.timestamp, smoothed)?;
        if let Some(boundary) = &event {
            self.assembler.apply(boundary)?;
        }

        self.peak_smoothed = self.peak_smoothed.max(smoothed);
        self.samples_processed += 1;
        self.previous = Some(sample);
        Ok(event)
    }

    pub fn state(&self) -> RecordingState {
        self.segmenter.state()
    }

    pub fn capture_mut(&mut self) -> &mut C {
        self.assembler.capture_mut()
    }

    /// End of stream: force-close any open clip at the last timestamp
    pub fn finish(mut self) -> Result<RunReport<C::Handle>> {
        let last_timestamp = self.previous.as_ref().map(|s| s.timestamp);

        if let Some(last) = last_timestamp {
            if self.segmenter.state() == RecordingState::Recording {
                log::warn!("sample stream ended mid-recording; closing clip at {:.3}s", last);
            }
            if let Some(boundary) = self.segmenter.finalize(last)? {
                self.assembler.apply(&boundary)?;
            }
        }

        let discarded_short = self.assembler.discarded();
        let clips = self.assembler.into_clips();

        log::info!(
            "segmentation finished: {} samples, {} clips, {} discarded as too short",
            self.samples_processed,
            clips.len(),
            discarded_short
        );

        Ok(RunReport {
            clips,
            samples_processed: self.samples_processed,
            discarded_short,
            peak_smoothed: self.peak_smoothed,
            last_timestamp,
        })
    }
}

/// Run a complete segmentation pass over an in-memory sample sequence
pub fn run<C, I>(samples: I, config: &EngineConfig, capture: C) -> Result<RunReport<C::Handle>>
where
    C: MediaCapture,
    I: IntoIterator<Item = FrameSample>,
{
    let mut run = SegmentationRun::new(config, capture)?;
    for sample in samples {
        run.process(sample)?;
    }
    run.finish()
}

/// Same as `run`, for sources that can fail mid-stream (e.g. a SampleReader)
pub fn run_stream<C, I>(samples: I, config: &EngineConfig, capture: C) -> Result<RunReport<C::Handle>>
where
    C: MediaCapture,
    I: IntoIterator<Item = Result<FrameSample>>,
{
    let mut run = SegmentationRun::new(config, capture)?;
    for sample in samples {
        run.process(sample?)?;
    }
    run.finish()
}
