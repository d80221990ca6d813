//! File operations addressable by name
//!
//! A host test runner that cannot link this crate drives the file-op facade
//! through JSON task messages:
//!
//! ```json
//! {"task": "rename", "from": "shots/abc.png", "to": "match-screenshots/home.png"}
//! ```

use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MatchResult;
use crate::fsops::FileOps;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum FileTask {
    Mkdir { path: PathBuf },
    Touch { path: PathBuf },
    Rename { from: PathBuf, to: PathBuf },
    Copy { from: PathBuf, to: PathBuf },
    Unlink { path: PathBuf },
    Exists { path: PathBuf },
}

impl FileTask {
    /// Parse a task message
    pub fn from_json(json: &str) -> MatchResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FileTask::Mkdir { .. } => "mkdir",
            FileTask::Touch { .. } => "touch",
            FileTask::Rename { .. } => "rename",
            FileTask::Copy { .. } => "copy",
            FileTask::Unlink { .. } => "unlink",
            FileTask::Exists { .. } => "exists",
        }
    }
}

/// Run a task against `ops`
///
/// `exists` answers a JSON boolean; every other task answers `null`.
pub async fn dispatch(ops: &dyn FileOps, task: &FileTask) -> MatchResult<Value> {
    match task {
        FileTask::Mkdir { path } => ops.mkdir(path).await?,
        FileTask::Touch { path } => ops.touch(path).await?,
        FileTask::Rename { from, to } => ops.rename(from, to).await?,
        FileTask::Copy { from, to } => ops.copy(from, to).await?,
        FileTask::Unlink { path } => ops.unlink(path).await?,
        FileTask::Exists { path } => return Ok(Value::Bool(ops.exists(path).await)),
    }
    Ok(Value::Null)
}
