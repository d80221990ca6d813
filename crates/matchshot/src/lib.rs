//! matchshot - screenshot matching for end-to-end tests
//!
//! This crate captures a screenshot during a test run, compares it against a
//! previously accepted "stable" image and fails when the two differ beyond a
//! tolerance. In update mode a differing screenshot is promoted to become the
//! new stable image instead.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ScreenshotMatcher                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  build_file_name(name, test) -> stem                        │
//! │  ScreenshotPaths::resolve(stable_set_dir, stem)             │
//! │    ├── <stem>.png         stable image                      │
//! │    ├── diff/<stem>.png    diff artifact                     │
//! │    └── new/<stem>.png     rejected capture (for humans)     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScreenshotCapture  (host screenshot, e.g. CommandCapture)  │
//! │  ImageComparator    (external diff tool, e.g. BlinkDiff)    │
//! │  FileOps            (mkdir/rename/copy/unlink/exists)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod capture;
pub mod compare;
pub mod config;
pub mod error;
pub mod fsops;
pub mod matcher;
pub mod naming;
pub mod paths;
pub mod tasks;

pub use capture::{CaptureMode, CaptureRequest, CommandCapture, ScreenshotCapture};
pub use compare::{BlinkDiff, CompareRequest, ImageComparator, ThresholdType};
pub use config::MatchConfig;
pub use error::{MatchError, MatchResult};
pub use fsops::{FileOps, LocalFileOps};
pub use matcher::{MatchOptions, MatchOutcome, MatchReport, ScreenshotMatcher};
pub use naming::{build_file_name, TestContext};
pub use paths::ScreenshotPaths;
pub use tasks::FileTask;
