// Clipforge Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipforgeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Ordering error: timestamp {current} does not advance past {previous}")]
    Ordering { previous: f64, current: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid sample on line {line}: {message}")]
    SampleParse { line: usize, message: String },

    #[error("FFmpeg error: {0}")]
    FFmpeg(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl ClipforgeError {
    pub fn config(message: impl Into<String>) -> Self {
        ClipforgeError::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ClipforgeError>;
