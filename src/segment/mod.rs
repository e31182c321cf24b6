// Segmentation
// State machine turning smoothed scores into clip boundaries, and the
// assembler turning boundaries into clips.

pub mod machine;
pub mod assembler;


pub use assembler::{
    BufferCapture, ClipAssembler, ClipSegment, ClipSet, MediaCapture, MediaRange, RangeCapture,
};
pub use machine::{
    ClipBoundary, CloseReason, ClosedInterval, RecordingState, Segmenter, SegmenterConfig,
};
