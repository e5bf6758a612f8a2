//! GeneWeb (`.gw`) parser.
//!
//! A line scanner rather than a tree walk: `fam` lines carry both spouses,
//! `beg`/`end` blocks list children, and `notes`/`pevt`/`fevt` blocks attach
//! free text and events to a person or family. Lines outside any block that
//! match no known prefix are ignored.

pub mod fragment;
mod scanner;

use scanner::ParseContext;

use crate::model::ParseResult;

/// Parse GeneWeb text into the shared model.
#[must_use]
pub fn parse(text: &str) -> ParseResult {
    let mut ctx = ParseContext::new();
    for (index, line) in text.lines().enumerate() {
        ctx.scan_line(index + 1, line);
    }
    ctx.finish()
}

/// Decode raw bytes and parse. Files that are not valid UTF-8 are read as
/// ISO-8859-1, the other encoding GeneWeb exports declare.
#[must_use]
pub fn parse_bytes(bytes: &[u8]) -> ParseResult {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse(text.trim_start_matches('\u{feff}')),
        Err(_) => {
            let text: String = bytes.iter().copied().map(char::from).collect();
            let mut result = parse(&text);
            result
                .warnings
                .push("input is not UTF-8; decoded as ISO-8859-1".to_owned());
            result
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
