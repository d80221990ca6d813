//! Error types for screenshot matching

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Screenshot capture failed: {0}")]
    Capture(String),

    #[error("Image comparison failed: {0}")]
    Compare(String),

    #[error("File operation '{op}' failed on {}: {source}", path.display())]
    FileOp {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Screenshot mismatch: '{name}' still differs after {attempts} attempt(s) (diff: {}, new: {})",
        diff_image.display(),
        new_image.display()
    )]
    ScreenshotMismatch {
        name: String,
        attempts: u32,
        diff_image: PathBuf,
        new_image: PathBuf,
    },

    #[error("Invalid screenshot name: {0}")]
    InvalidName(String),

    #[error("Invalid match options: {0}")]
    InvalidOptions(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl MatchError {
    pub(crate) fn file_op(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MatchError::FileOp {
            op,
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a failed visual assertion rather than a tooling failure
    pub fn is_mismatch(&self) -> bool {
        matches!(self, MatchError::ScreenshotMismatch { .. })
    }
}

pub type MatchResult<T> = Result<T, MatchError>;
