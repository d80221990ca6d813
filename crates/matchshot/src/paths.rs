//! Layout of the stable set on disk

use std::path::{Path, PathBuf};
use serde::Serialize;

/// Subdirectory of the stable set holding diff artifacts
pub const DIFF_DIR: &str = "diff";

/// Subdirectory of the stable set holding rejected captures
pub const NEW_DIR: &str = "new";

/// Extension of every image in the stable set
pub const IMAGE_EXTENSION: &str = "png";

/// The three image locations for one screenshot identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenshotPaths {
    pub stable_set_dir: PathBuf,
    pub stable_image: PathBuf,
    pub diff_dir: PathBuf,
    pub diff_image: PathBuf,
    pub new_dir: PathBuf,
    pub new_image: PathBuf,
}

impl ScreenshotPaths {
    /// Resolve paths for `file_name` under `stable_set_dir`. Performs no I/O.
    pub fn resolve(stable_set_dir: &Path, file_name: &str) -> Self {
        let image = format!("{}.{}", file_name, IMAGE_EXTENSION);
        let diff_dir = stable_set_dir.join(DIFF_DIR);
        let new_dir = stable_set_dir.join(NEW_DIR);

        Self {
            stable_set_dir: stable_set_dir.to_path_buf(),
            stable_image: stable_set_dir.join(&image),
            diff_image: diff_dir.join(&image),
            diff_dir,
            new_image: new_dir.join(&image),
            new_dir,
        }
    }
}
