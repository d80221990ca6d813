//! Screenshot identifiers derived from the running test

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, MatchResult};

/// Separator placed between title parts of a screenshot identifier
pub const TITLE_SEPARATOR: &str = " -- ";

/// Title chain of the test taking a screenshot
///
/// Titles are ordered outermost suite first, test title last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestContext {
    pub titles: Vec<String>,
}

impl TestContext {
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }
}

/// Build the file stem for a screenshot
///
/// Non-empty titles are joined outermost first and the explicit name, when
/// given, comes last.
pub fn build_file_name(name: &str, test: &TestContext) -> MatchResult<String> {
    let parts: Vec<String> = test
        .titles
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(name))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(sanitize_part)
        .collect();

    if parts.is_empty() {
        return Err(MatchError::InvalidName(
            "screenshot needs a name or a titled test".to_string(),
        ));
    }

    Ok(parts.join(TITLE_SEPARATOR))
}

// Titles must stay inside the stable-set directory.
fn sanitize_part(part: &str) -> String {
    part.replace(['/', '\\'], "_")
}
