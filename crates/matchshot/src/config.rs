//! Matcher configuration

use std::path::{Component, Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::capture::CaptureConfig;
use crate::compare::DiffConfig;
use crate::error::{MatchError, MatchResult};

/// Stable-set folder used when none is configured, relative to the project root
pub const DEFAULT_MATCH_FOLDER: &str = "match-screenshots";

pub const ENV_UPDATE_SCREENSHOTS: &str = "MATCHSHOT_UPDATE_SCREENSHOTS";
pub const ENV_PROJECT_ROOT: &str = "MATCHSHOT_PROJECT_ROOT";
pub const ENV_MATCH_FOLDER: &str = "MATCHSHOT_MATCH_FOLDER";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Directory the match folder is resolved against
    pub project_root: PathBuf,

    /// Stable-set folder, relative to `project_root`
    pub match_folder: Option<PathBuf>,

    /// Promote differing screenshots instead of failing
    pub update_screenshots: bool,

    pub diff: DiffConfig,

    pub capture: CaptureConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            match_folder: None,
            update_screenshots: false,
            diff: DiffConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Load configuration from a TOML file, or defaults if it does not exist
    pub fn load(path: &Path) -> MatchResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> MatchResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> MatchResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MatchError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> MatchResult<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> MatchResult<()> {
        if let Some(value) = var(ENV_UPDATE_SCREENSHOTS) {
            self.update_screenshots = parse_flag(ENV_UPDATE_SCREENSHOTS, &value)?;
        }
        if let Some(root) = var(ENV_PROJECT_ROOT) {
            self.project_root = PathBuf::from(root);
        }
        if let Some(folder) = var(ENV_MATCH_FOLDER) {
            self.match_folder = Some(PathBuf::from(folder));
        }
        Ok(())
    }

    /// Directory holding the stable images
    ///
    /// The match folder always nests under `project_root`, even when it is
    /// written as an absolute path.
    pub fn stable_set_dir(&self) -> PathBuf {
        let folder = self
            .match_folder
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_MATCH_FOLDER));
        let relative: PathBuf = folder
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
            .collect();
        self.project_root.join(relative)
    }
}

fn parse_flag(key: &str, value: &str) -> MatchResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(MatchError::Config(format!("{} must be a boolean, got '{}'", key, other))),
    }
}
