//! Subprocess collaborators against stand-in shell scripts
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use matchshot::capture::CaptureConfig;
use matchshot::compare::DiffConfig;
use matchshot::{
    BlinkDiff, CaptureMode, CaptureRequest, CommandCapture, CompareRequest, ImageComparator,
    MatchError, ScreenshotCapture, ThresholdType,
};
use tempfile::TempDir;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn compare_request(dir: &Path) -> CompareRequest {
    CompareRequest {
        stable_image: dir.join("stable.png"),
        new_image: dir.join("new.png"),
        diff_image: dir.join("diff.png"),
        threshold: 1.0,
        threshold_type: ThresholdType::Percent,
    }
}

fn blink_diff(script: &Path) -> BlinkDiff {
    BlinkDiff::new(DiffConfig {
        program: script.to_string_lossy().into_owned(),
    })
}

#[tokio::test]
async fn blink_diff_exit_zero_matches() {
    let tmp = TempDir::new().unwrap();
    // Record argv so the command line can be checked.
    let script = write_script(
        tmp.path(),
        "diff-ok",
        &format!("echo \"$@\" > {}\nexit 0", tmp.path().join("argv").display()),
    );

    let request = compare_request(tmp.path());
    assert!(blink_diff(&script).compare(&request).await.unwrap());

    let argv = std::fs::read_to_string(tmp.path().join("argv")).unwrap();
    assert!(argv.starts_with("--output "));
    assert!(argv.contains("--threshold 1 --threshold-type percent"));
    assert!(argv.trim_end().ends_with("new.png"));
}

#[tokio::test]
async fn blink_diff_nonzero_is_mismatch() {
    let tmp = TempDir::new().unwrap();
    let script = write_script(tmp.path(), "diff-fail", "exit 1");

    let request = compare_request(tmp.path());
    assert!(!blink_diff(&script).compare(&request).await.unwrap());
}

#[tokio::test]
async fn blink_diff_stderr_is_error() {
    let tmp = TempDir::new().unwrap();
    let script = write_script(tmp.path(), "diff-broken", "echo 'cannot read image' >&2\nexit 0");

    let err = blink_diff(&script)
        .compare(&compare_request(tmp.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::Compare(msg) if msg.contains("cannot read image")));
}

#[tokio::test]
async fn blink_diff_missing_program_is_error() {
    let tmp = TempDir::new().unwrap();
    let err = blink_diff(&tmp.path().join("no-such-tool"))
        .compare(&compare_request(tmp.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::Compare(_)));
}

#[tokio::test]
async fn command_capture_writes_output() {
    let tmp = TempDir::new().unwrap();
    let script = write_script(tmp.path(), "shot", "printf '%s' \"$2\" > \"$1\"");
    let capture = CommandCapture::new(CaptureConfig {
        program: script.to_string_lossy().into_owned(),
        args: vec!["{output}".to_string(), "{mode}".to_string()],
        screenshots_dir: tmp.path().join("shots"),
    });

    let request = CaptureRequest::unique(&[], CaptureMode::Viewport);
    let path = capture.capture(&request).await.unwrap();

    assert_eq!(path, tmp.path().join("shots").join(format!("{}.png", request.name)));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "viewport");
}

#[tokio::test]
async fn command_capture_without_output_fails() {
    let tmp = TempDir::new().unwrap();
    let script = write_script(tmp.path(), "noop", "exit 0");
    let capture = CommandCapture::new(CaptureConfig {
        program: script.to_string_lossy().into_owned(),
        args: vec!["{output}".to_string()],
        screenshots_dir: tmp.path().join("shots"),
    });

    let err = capture
        .capture(&CaptureRequest::unique(&[], CaptureMode::FullPage))
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::Capture(_)));
}

#[tokio::test]
async fn command_capture_failure_reports_stderr() {
    let tmp = TempDir::new().unwrap();
    let script = write_script(tmp.path(), "broken", "echo 'no display' >&2\nexit 3");
    let capture = CommandCapture::new(CaptureConfig {
        program: script.to_string_lossy().into_owned(),
        args: vec![],
        screenshots_dir: tmp.path().join("shots"),
    });

    let err = capture
        .capture(&CaptureRequest::unique(&[], CaptureMode::FullPage))
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::Capture(msg) if msg.contains("no display")));
}
