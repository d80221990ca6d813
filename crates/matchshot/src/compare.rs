//! Image comparison through an external diff tool

use std::path::PathBuf;
use std::process::Stdio;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MatchError, MatchResult};

/// How the comparison threshold is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdType {
    /// Percentage of differing pixels (0 - 100)
    #[default]
    Percent,
    /// Absolute number of differing pixels
    Pixel,
}

impl ThresholdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdType::Percent => "percent",
            ThresholdType::Pixel => "pixel",
        }
    }
}

impl std::str::FromStr for ThresholdType {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percent" => Ok(ThresholdType::Percent),
            "pixel" => Ok(ThresholdType::Pixel),
            other => Err(MatchError::InvalidOptions(format!("unknown threshold type: {}", other))),
        }
    }
}

/// One comparison of a fresh capture against the stable image
#[derive(Debug, Clone)]
pub struct CompareRequest {
    pub stable_image: PathBuf,
    pub new_image: PathBuf,
    /// Where the diff artifact is written
    pub diff_image: PathBuf,
    pub threshold: f64,
    pub threshold_type: ThresholdType,
}

/// Decides whether two images match, producing a diff artifact
#[async_trait]
pub trait ImageComparator: Send + Sync {
    async fn compare(&self, request: &CompareRequest) -> MatchResult<bool>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Path or name of the blink-diff compatible executable
    pub program: String,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            program: "blink-diff".to_string(),
        }
    }
}

/// Runs `blink-diff` (or a tool with the same command line) as a subprocess
///
/// Exit code 0 means the images match. Anything written to stderr is treated
/// as a tool failure regardless of the exit code.
pub struct BlinkDiff {
    program: String,
}

impl BlinkDiff {
    pub fn new(config: DiffConfig) -> Self {
        Self { program: config.program }
    }

    pub fn build_args(request: &CompareRequest) -> Vec<String> {
        vec![
            "--output".to_string(),
            request.diff_image.to_string_lossy().into_owned(),
            "--threshold".to_string(),
            request.threshold.to_string(),
            "--threshold-type".to_string(),
            request.threshold_type.as_str().to_string(),
            request.stable_image.to_string_lossy().into_owned(),
            request.new_image.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl ImageComparator for BlinkDiff {
    async fn compare(&self, request: &CompareRequest) -> MatchResult<bool> {
        let args = Self::build_args(request);
        debug!("Comparing screenshots: {} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| MatchError::Compare(format!("failed to run {}: {}", self.program, e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            return Err(MatchError::Compare(format!(
                "{} reported: {}",
                self.program,
                stderr.trim()
            )));
        }

        let matches = output.status.success();
        if !matches {
            warn!(
                "{} differs from {} ({})",
                request.new_image.display(),
                request.stable_image.display(),
                output.status
            );
        }
        Ok(matches)
    }
}
