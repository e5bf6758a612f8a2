//! Format detection by content sniffing or file extension.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// How many non-empty lines to inspect when sniffing for GeneWeb.
const GENEWEB_SNIFF_LINES: usize = 20;

/// The supported source grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Gedcom,
    GeneWeb,
}

impl Format {
    /// Human-readable format name for previews and logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Gedcom => "GEDCOM",
            Self::GeneWeb => "GeneWeb",
        }
    }
}

/// Classify text by its leading records.
///
/// GEDCOM files open with a `0 HEAD` record. GeneWeb files declare
/// `encoding:` or contain a `fam` line near the top.
#[must_use]
pub fn detect_by_content(text: &str) -> Option<Format> {
    let text = text.trim_start_matches('\u{feff}').trim_start();
    if text.starts_with("0 HEAD") {
        return Some(Format::Gedcom);
    }

    let is_geneweb = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(GENEWEB_SNIFF_LINES)
        .any(|line| line.starts_with("encoding:") || line == "gwplus" || is_fam_line(line));
    is_geneweb.then_some(Format::GeneWeb)
}

/// Classify a filename by extension (`.ged`, `.gw`), case-insensitively.
#[must_use]
pub fn detect_by_name(filename: &str) -> Option<Format> {
    let extension = Path::new(filename)
        .extension()?
        .to_string_lossy()
        .to_ascii_lowercase();
    match extension.as_str() {
        "ged" => Some(Format::Gedcom),
        "gw" => Some(Format::GeneWeb),
        _ => None,
    }
}

/// Content first, extension as fallback.
#[must_use]
pub fn detect(filename: &str, text: &str) -> Option<Format> {
    detect_by_content(text).or_else(|| detect_by_name(filename))
}

fn is_fam_line(line: &str) -> bool {
    line.strip_prefix("fam")
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

#[cfg(test)]
#[path = "detect_test.rs"]
mod tests;
