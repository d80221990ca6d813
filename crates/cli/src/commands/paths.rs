//! Paths Command

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use matchshot::{build_file_name, MatchConfig, ScreenshotPaths, TestContext};

use crate::output::{render_records, OutputFormat, Record};

#[derive(Args)]
pub struct PathsArgs {
    /// Title of an enclosing suite or the test, outermost first (repeatable)
    #[arg(long = "title")]
    pub titles: Vec<String>,

    /// Screenshot name appended to the titles
    #[arg(short, long, default_value = "")]
    pub name: String,
}

#[derive(Serialize)]
pub struct PathEntry {
    pub kind: &'static str,
    pub path: String,
    pub exists: bool,
}

impl Record for PathEntry {
    const COLUMNS: &'static [&'static str] = &["Kind", "Path", "Exists"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.kind.to_string(),
            self.path.clone(),
            if self.exists { "yes" } else { "no" }.to_string(),
        ]
    }
}

fn entries(paths: &ScreenshotPaths) -> Vec<PathEntry> {
    [
        ("stable", &paths.stable_image),
        ("diff", &paths.diff_image),
        ("new", &paths.new_image),
    ]
    .into_iter()
    .map(|(kind, path)| PathEntry {
        kind,
        path: path.display().to_string(),
        exists: path.exists(),
    })
    .collect()
}

pub fn execute(args: PathsArgs, config: &MatchConfig, format: OutputFormat) -> Result<()> {
    let file_name = build_file_name(&args.name, &TestContext::new(args.titles))?;
    let paths = ScreenshotPaths::resolve(&config.stable_set_dir(), &file_name);
    println!("{}", render_records(&entries(&paths), format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_report_existence() {
        let tmp = tempfile::TempDir::new().unwrap();
        let paths = ScreenshotPaths::resolve(tmp.path(), "home");
        std::fs::write(&paths.stable_image, b"png").unwrap();

        let entries = entries(&paths);
        assert_eq!(entries.len(), 3);
        assert!(entries[0].exists);
        assert!(!entries[1].exists);
        assert_eq!(entries[2].kind, "new");
    }
}
