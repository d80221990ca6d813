//! Stable set inspection and cleanup

use std::path::{Path, PathBuf};
use anyhow::Result;
use serde::Serialize;
use tracing::info;
use walkdir::WalkDir;

use matchshot::paths::IMAGE_EXTENSION;
use matchshot::MatchConfig;

use crate::output::{print_done, render_records, OutputFormat, Record};

#[derive(Serialize)]
pub struct StableImage {
    pub name: String,
    pub size_bytes: u64,
}

impl Record for StableImage {
    const COLUMNS: &'static [&'static str] = &["Name", "Size"];

    fn cells(&self) -> Vec<String> {
        vec![self.name.clone(), format!("{} B", self.size_bytes)]
    }
}

/// Files directly inside `dir`; a missing directory has none
fn files_in(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}

fn images_in(dir: &Path) -> Vec<PathBuf> {
    files_in(dir)
        .into_iter()
        .filter(|p| p.extension().map(|ext| ext == IMAGE_EXTENSION).unwrap_or(false))
        .collect()
}

pub fn stable_images(stable_set_dir: &Path) -> Vec<StableImage> {
    let mut images: Vec<StableImage> = images_in(stable_set_dir)
        .into_iter()
        .filter_map(|path| {
            let name = path.file_stem()?.to_string_lossy().to_string();
            let size_bytes = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            Some(StableImage { name, size_bytes })
        })
        .collect();
    images.sort_by(|a, b| a.name.cmp(&b.name));
    images
}

pub fn list(config: &MatchConfig, format: OutputFormat) -> Result<()> {
    println!("{}", render_records(&stable_images(&config.stable_set_dir()), format)?);
    Ok(())
}

/// Remove every file under `diff/` and `new/`, returning how many were removed
pub fn clean_dirs(stable_set_dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for dir in [matchshot::paths::DIFF_DIR, matchshot::paths::NEW_DIR] {
        for path in files_in(&stable_set_dir.join(dir)) {
            std::fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

pub fn clean(config: &MatchConfig) -> Result<()> {
    let stable_set_dir = config.stable_set_dir();
    let removed = clean_dirs(&stable_set_dir)?;
    info!("Cleaned {} under {}", removed, stable_set_dir.display());
    print_done(&format!("Removed {} file(s)", removed));
    Ok(())
}
