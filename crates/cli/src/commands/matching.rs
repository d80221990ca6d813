//! Match Command

use std::sync::Arc;
use anyhow::Result;
use clap::Args;
use serde::Serialize;

use matchshot::{
    BlinkDiff, CaptureMode, CommandCapture, LocalFileOps, MatchConfig, MatchOptions,
    MatchReport, ScreenshotMatcher, TestContext, ThresholdType,
};

use crate::output::{render_record, OutputFormat, Record};

#[derive(Args)]
pub struct MatchArgs {
    /// Title of an enclosing suite or the test, outermost first (repeatable)
    #[arg(long = "title")]
    pub titles: Vec<String>,

    /// Screenshot name appended to the titles
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Allowed difference
    #[arg(long, default_value = "0")]
    pub threshold: f64,

    /// How the threshold is interpreted (percent, pixel)
    #[arg(long, default_value = "percent")]
    pub threshold_type: ThresholdType,

    /// Extra captures after a mismatch
    #[arg(long, default_value = "2")]
    pub max_retries: u32,

    /// Selector to black out (repeatable)
    #[arg(long)]
    pub blackout: Vec<String>,

    /// Capture mode (fullPage, viewport, runner)
    #[arg(long, default_value = "fullPage")]
    pub capture: CaptureMode,

    /// Promote differing screenshots to the stable set
    #[arg(long)]
    pub update: bool,
}

impl MatchArgs {
    fn options(&self) -> MatchOptions {
        MatchOptions {
            name: self.name.clone(),
            threshold: self.threshold,
            threshold_type: self.threshold_type,
            max_retries: self.max_retries,
            blackout: self.blackout.clone(),
            capture: self.capture,
        }
    }
}

/// Match report display wrapper
#[derive(Serialize)]
pub struct ReportDisplay {
    pub name: String,
    pub outcome: String,
    pub attempts: u32,
    pub stable_image: String,
}

impl From<&MatchReport> for ReportDisplay {
    fn from(report: &MatchReport) -> Self {
        Self {
            name: report.file_name.clone(),
            outcome: serde_json::to_value(report.outcome)
                .ok()
                .and_then(|v| v.as_str().map(String::from))
                .unwrap_or_default(),
            attempts: report.attempts,
            stable_image: report.paths.stable_image.display().to_string(),
        }
    }
}

impl Record for ReportDisplay {
    const COLUMNS: &'static [&'static str] = &["Name", "Outcome", "Attempts", "Stable Image"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.outcome.clone(),
            self.attempts.to_string(),
            self.stable_image.clone(),
        ]
    }
}

pub async fn execute(args: MatchArgs, mut config: MatchConfig, format: OutputFormat) -> Result<()> {
    if args.update {
        config.update_screenshots = true;
    }

    let capture = Arc::new(CommandCapture::new(config.capture.clone()));
    let comparator = Arc::new(BlinkDiff::new(config.diff.clone()));
    let matcher = ScreenshotMatcher::new(config, capture, comparator, Arc::new(LocalFileOps));

    let test = TestContext::new(args.titles.iter().cloned());
    let report = matcher.match_screenshot(&test, &args.options()).await?;

    println!("{}", render_record(&ReportDisplay::from(&report), format)?);
    Ok(())
}
