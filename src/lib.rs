// Clipforge - Library Entry Point
// Highlight extraction: frame samples in, ranked clip intervals out.

pub mod constants;
pub mod error;
pub mod config;
pub mod tools;
pub mod scoring;
pub mod segment;
pub mod sampler;
pub mod pipeline;
pub mod export;

pub use config::EngineConfig;
pub use error::{ClipforgeError, Result};
pub use export::{combine, rank, CombinedArtifact};
pub use pipeline::{run, run_stream, RunReport, SegmentationRun};
pub use scoring::{FrameSample, ImportanceScorer, ScoreWeights, SmoothingBuffer};
pub use segment::{ClipBoundary, ClipSegment, ClipSet, MediaCapture, Segmenter, SegmenterConfig};
