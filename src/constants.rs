// Clipforge Constants
// Defaults for the segmentation engine. EngineConfig starts from these values;
// a config file may override any of them.

// Engine version (bump when scoring or segmentation semantics change)
pub const ENGINE_VERSION: u32 = 1;

// Sampling
pub const DEFAULT_SAMPLE_INTERVAL_SECS: f64 = 0.1;  // Logical video time per sample

// Raw channel ranges
pub const CHANNEL_MAX: f64 = 255.0;        // audio energy, brightness, frame difference
pub const EXPRESSION_MAX: f64 = 1.0;

// Importance score range
pub const IMPORTANCE_MIN: f64 = 0.0;
pub const IMPORTANCE_MAX: f64 = 100.0;

// Component weights (sum to IMPORTANCE_MAX so a saturated frame scores exactly 100)
pub const SCORE_WEIGHT_AUDIO: f64 = 30.0;
pub const SCORE_WEIGHT_BRIGHTNESS: f64 = 20.0;
pub const SCORE_WEIGHT_DIFFERENCE: f64 = 20.0;
pub const SCORE_WEIGHT_EXPRESSION: f64 = 30.0;

// Per-expression weights for deriving an expression score from detector output
pub const EXPRESSION_WEIGHT_HAPPY: f64 = 1.0;
pub const EXPRESSION_WEIGHT_SURPRISED: f64 = 0.8;
pub const EXPRESSION_WEIGHT_ANGRY: f64 = 0.6;
pub const EXPRESSION_WEIGHT_FEARFUL: f64 = 0.4;
pub const EXPRESSION_WEIGHT_DISGUSTED: f64 = 0.3;
pub const EXPRESSION_WEIGHT_SAD: f64 = 0.2;
pub const EXPRESSION_WEIGHT_NEUTRAL: f64 = 0.1;

// Smoothing
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

// Segmentation thresholds (hysteresis: open must be above close)
pub const DEFAULT_OPEN_THRESHOLD: f64 = 20.0;
pub const DEFAULT_CLOSE_THRESHOLD: f64 = 10.0;

// Segmentation durations (seconds)
pub const DEFAULT_MIN_CLOSE_DURATION_SECS: f64 = 3.0;   // Quiet time before a clip may close
pub const DEFAULT_MAX_CLIP_DURATION_SECS: f64 = 15.0;   // Hard cap on a single clip
pub const DEFAULT_LOOKBACK_SECS: f64 = 1.0;             // Pre-roll before the trigger
pub const DEFAULT_MIN_SEGMENT_DURATION_SECS: f64 = 2.0; // Assembler drops shorter clips

// Export
pub const FFMPEG_ENV_KEY: &str = "CLIPFORGE_FFMPEG_PATH";
pub const EXPORT_VIDEO_CODEC: &str = "libx264";
pub const EXPORT_AUDIO_CODEC: &str = "aac";
pub const EXPORT_CRF: u32 = 23;
pub const EXPORT_PRESET: &str = "veryfast";
