//! Capture, compare and promote screenshots against the stable set

use std::path::{Path, PathBuf};
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capture::{CaptureMode, CaptureRequest, ScreenshotCapture};
use crate::compare::{CompareRequest, ImageComparator, ThresholdType};
use crate::config::MatchConfig;
use crate::error::{MatchError, MatchResult};
use crate::fsops::FileOps;
use crate::naming::{build_file_name, TestContext};
use crate::paths::ScreenshotPaths;

/// Per-call options for [`ScreenshotMatcher::match_screenshot`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchOptions {
    /// Appended to the test title chain to form the identifier
    pub name: String,

    /// Allowed difference, interpreted according to `threshold_type`
    pub threshold: f64,

    pub threshold_type: ThresholdType,

    /// Extra captures to try after a mismatch
    pub max_retries: u32,

    /// Selectors blacked out in every capture
    pub blackout: Vec<String>,

    pub capture: CaptureMode,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            threshold: 0.0,
            threshold_type: ThresholdType::Percent,
            max_retries: 2,
            blackout: Vec::new(),
            capture: CaptureMode::FullPage,
        }
    }
}

impl MatchOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> MatchResult<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(MatchError::InvalidOptions(format!(
                "threshold must be a non-negative number, got {}",
                self.threshold
            )));
        }
        if self.threshold_type == ThresholdType::Percent && self.threshold > 100.0 {
            return Err(MatchError::InvalidOptions(format!(
                "percent threshold must not exceed 100, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// How a successful match call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// No stable image existed; the capture became the stable image
    Created,
    /// The capture matched the stable image
    Matched,
    /// The capture differed and replaced the stable image (update mode)
    Updated,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub file_name: String,
    pub outcome: MatchOutcome,
    /// Number of captures taken
    pub attempts: u32,
    pub paths: ScreenshotPaths,
}

struct Attempt {
    matches: bool,
    new_image: PathBuf,
    attempts: u32,
}

/// Coordinates capture, comparison and file staging for one stable set
pub struct ScreenshotMatcher {
    config: MatchConfig,
    capture: Arc<dyn ScreenshotCapture>,
    comparator: Arc<dyn ImageComparator>,
    fs: Arc<dyn FileOps>,
}

impl ScreenshotMatcher {
    pub fn new(
        config: MatchConfig,
        capture: Arc<dyn ScreenshotCapture>,
        comparator: Arc<dyn ImageComparator>,
        fs: Arc<dyn FileOps>,
    ) -> Self {
        Self {
            config,
            capture,
            comparator,
            fs,
        }
    }

    /// Paths used for a given test and screenshot name
    pub fn paths_for(&self, name: &str, test: &TestContext) -> MatchResult<(String, ScreenshotPaths)> {
        let file_name = build_file_name(name, test)?;
        let paths = ScreenshotPaths::resolve(&self.config.stable_set_dir(), &file_name);
        Ok((file_name, paths))
    }

    /// Take a screenshot and match it against the stable image
    ///
    /// Without a stable image the capture is accepted as the new stable image.
    /// With one, up to `max_retries + 1` captures are compared. A final
    /// mismatch fails with [`MatchError::ScreenshotMismatch`] unless update
    /// mode is enabled, in which case the capture replaces the stable image.
    pub async fn match_screenshot(
        &self,
        test: &TestContext,
        options: &MatchOptions,
    ) -> MatchResult<MatchReport> {
        options.validate()?;
        let (file_name, paths) = self.paths_for(&options.name, test)?;

        if !self.fs.exists(&paths.stable_image).await {
            info!("No stable image for '{}', taking new screenshot", file_name);
            let new_image = self.take_screenshot(options).await?;
            let staged = self.stage_and_promote(&paths, &new_image).await;
            self.discard_on_error(&new_image, staged).await?;
            return Ok(MatchReport {
                file_name,
                outcome: MatchOutcome::Created,
                attempts: 1,
                paths,
            });
        }

        let attempt = self.attempt_to_match(&paths, options).await?;

        if attempt.matches {
            info!("Screenshots match for '{}'", file_name);
            self.fs.unlink(&attempt.new_image).await?;
            return Ok(MatchReport {
                file_name,
                outcome: MatchOutcome::Matched,
                attempts: attempt.attempts,
                paths,
            });
        }

        if self.config.update_screenshots {
            let staged = self.stage_and_promote(&paths, &attempt.new_image).await;
            self.discard_on_error(&attempt.new_image, staged).await?;
            return Ok(MatchReport {
                file_name,
                outcome: MatchOutcome::Updated,
                attempts: attempt.attempts,
                paths,
            });
        }

        let copied = self.copy_to_new_dir(&paths, &attempt.new_image).await;
        self.discard_on_error(&attempt.new_image, copied).await?;
        self.fs.unlink(&attempt.new_image).await?;
        warn!(
            "Screenshot '{}' differs from stable image after {} attempt(s)",
            file_name, attempt.attempts
        );
        Err(MatchError::ScreenshotMismatch {
            name: file_name,
            attempts: attempt.attempts,
            diff_image: paths.diff_image,
            new_image: paths.new_image,
        })
    }

    async fn take_screenshot(&self, options: &MatchOptions) -> MatchResult<PathBuf> {
        let request = CaptureRequest::unique(&options.blackout, options.capture);
        self.capture.capture(&request).await
    }

    async fn attempt_to_match(
        &self,
        paths: &ScreenshotPaths,
        options: &MatchOptions,
    ) -> MatchResult<Attempt> {
        self.fs.mkdir(&paths.diff_dir).await?;

        let mut retries_left = options.max_retries;
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!("Taking screenshot (attempt {})", attempts);
            let new_image = self.take_screenshot(options).await?;

            let request = CompareRequest {
                stable_image: paths.stable_image.clone(),
                new_image: new_image.clone(),
                diff_image: paths.diff_image.clone(),
                threshold: options.threshold,
                threshold_type: options.threshold_type,
            };
            let compared = self.comparator.compare(&request).await;
            let matches = self.discard_on_error(&new_image, compared).await?;

            if matches {
                // A diff of matching images shows nothing.
                let cleaned = self.fs.unlink(&paths.diff_image).await;
                self.discard_on_error(&new_image, cleaned).await?;
                return Ok(Attempt { matches, new_image, attempts });
            }

            if retries_left == 0 {
                return Ok(Attempt { matches, new_image, attempts });
            }

            debug!("Screenshot differs, retrying ({} retries left)", retries_left);
            self.fs.unlink(&new_image).await?;
            retries_left -= 1;
        }
    }

    /// Remove the capture when `result` failed, then hand `result` back
    ///
    /// The original error wins over any failure to remove the capture.
    async fn discard_on_error<T>(&self, new_image: &Path, result: MatchResult<T>) -> MatchResult<T> {
        if result.is_err() {
            if let Err(e) = self.fs.unlink(new_image).await {
                warn!("Could not remove capture {}: {}", new_image.display(), e);
            }
        }
        result
    }

    async fn stage_and_promote(&self, paths: &ScreenshotPaths, new_image: &Path) -> MatchResult<()> {
        self.copy_to_new_dir(paths, new_image).await?;
        self.make_stable(paths, new_image).await
    }

    /// Promote a capture to stable and drop its stale diff
    async fn make_stable(&self, paths: &ScreenshotPaths, new_image: &Path) -> MatchResult<()> {
        info!("Updating stable set: {}", paths.stable_image.display());
        self.fs.rename(new_image, &paths.stable_image).await?;
        self.fs.unlink(&paths.diff_image).await
    }

    // Copies in new/ are for people reviewing failures; nothing reads them back.
    async fn copy_to_new_dir(&self, paths: &ScreenshotPaths, new_image: &Path) -> MatchResult<()> {
        self.fs.mkdir(&paths.new_dir).await?;
        self.fs.copy(new_image, &paths.new_image).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default() {
        let options = MatchOptions::default();
        assert_eq!(options.max_retries, 2);
        assert_eq!(options.threshold, 0.0);
        assert_eq!(options.threshold_type, ThresholdType::Percent);
        assert_eq!(options.capture, CaptureMode::FullPage);
    }

    #[test]
    fn test_options_from_json() {
        let options: MatchOptions = serde_json::from_str(
            r#"{"name":"header","threshold":5,"thresholdType":"pixel","blackout":[".clock"],"capture":"viewport"}"#,
        )
        .unwrap();

        assert_eq!(options.name, "header");
        assert_eq!(options.threshold, 5.0);
        assert_eq!(options.threshold_type, ThresholdType::Pixel);
        assert_eq!(options.max_retries, 2);
        assert_eq!(options.blackout, vec![".clock"]);
        assert_eq!(options.capture, CaptureMode::Viewport);
    }

    #[test]
    fn test_validate_threshold() {
        let mut options = MatchOptions::default();
        options.threshold = -1.0;
        assert!(options.validate().is_err());

        options.threshold = 150.0;
        assert!(options.validate().is_err());

        options.threshold_type = ThresholdType::Pixel;
        assert!(options.validate().is_ok());

        options.threshold = f64::NAN;
        assert!(options.validate().is_err());
    }
}
