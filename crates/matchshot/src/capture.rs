//! Screenshot capture

use std::path::{Path, PathBuf};
use std::process::Stdio;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{MatchError, MatchResult};

/// What part of the screen a capture covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureMode {
    #[default]
    FullPage,
    Viewport,
    Runner,
}

impl CaptureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::FullPage => "fullPage",
            CaptureMode::Viewport => "viewport",
            CaptureMode::Runner => "runner",
        }
    }
}

impl std::str::FromStr for CaptureMode {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fullPage" | "full-page" | "full_page" => Ok(CaptureMode::FullPage),
            "viewport" => Ok(CaptureMode::Viewport),
            "runner" => Ok(CaptureMode::Runner),
            other => Err(MatchError::InvalidOptions(format!("unknown capture mode: {}", other))),
        }
    }
}

/// A single screenshot request
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    /// Unique name for this capture, fresh on every attempt
    pub name: String,

    /// Selectors of elements to black out before capturing
    pub blackout: Vec<String>,

    pub mode: CaptureMode,
}

impl CaptureRequest {
    /// Build a request with a fresh unique name
    pub fn unique(blackout: &[String], mode: CaptureMode) -> Self {
        Self {
            name: uuid::Uuid::new_v4().to_string(),
            blackout: blackout.to_vec(),
            mode,
        }
    }
}

/// Host screenshot facility
///
/// Implementations take a screenshot and return the path of the written image.
#[async_trait]
pub trait ScreenshotCapture: Send + Sync {
    async fn capture(&self, request: &CaptureRequest) -> MatchResult<PathBuf>;
}

/// Configuration for [`CommandCapture`]
///
/// `args` may contain the placeholders `{output}`, `{name}`, `{mode}` and
/// `{blackout}` (comma-joined selectors).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub program: String,
    pub args: Vec<String>,
    pub screenshots_dir: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            program: "screenshot".to_string(),
            args: vec!["{output}".to_string()],
            screenshots_dir: PathBuf::from("target/matchshot/screenshots"),
        }
    }
}

/// Captures screenshots by running an external program
pub struct CommandCapture {
    config: CaptureConfig,
}

impl CommandCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    fn output_path(&self, request: &CaptureRequest) -> PathBuf {
        self.config.screenshots_dir.join(format!("{}.png", request.name))
    }

    /// Substitute request values into the configured arguments
    pub fn build_args(&self, request: &CaptureRequest) -> Vec<String> {
        let output = self.output_path(request);
        let output = output.to_string_lossy();
        let blackout = request.blackout.join(",");

        self.config
            .args
            .iter()
            .map(|arg| {
                arg.replace("{output}", &output)
                    .replace("{name}", &request.name)
                    .replace("{mode}", request.mode.as_str())
                    .replace("{blackout}", &blackout)
            })
            .collect()
    }
}

#[async_trait]
impl ScreenshotCapture for CommandCapture {
    async fn capture(&self, request: &CaptureRequest) -> MatchResult<PathBuf> {
        tokio::fs::create_dir_all(&self.config.screenshots_dir)
            .await
            .map_err(|e| MatchError::file_op("mkdir", &self.config.screenshots_dir, e))?;

        let output_path = self.output_path(request);
        let args = self.build_args(request);
        debug!("Capturing screenshot: {} {:?}", self.config.program, args);

        let output = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                MatchError::Capture(format!("failed to run {}: {}", self.config.program, e))
            })?;

        if !output.status.success() {
            return Err(MatchError::Capture(format!(
                "{} exited with {}: {}",
                self.config.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        ensure_written(&output_path).await?;
        info!("Captured screenshot {}", output_path.display());
        Ok(output_path)
    }
}

async fn ensure_written(path: &Path) -> MatchResult<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(MatchError::Capture(format!(
            "capture did not produce {}",
            path.display()
        ))),
    }
}
