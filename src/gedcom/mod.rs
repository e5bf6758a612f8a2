//! GEDCOM 5.5.1 / 7.0 parser.
//!
//! Raw bytes are normalized and lexed into a `level tag value` tree
//! ([`tree`]), then individual and family records are extracted from that tree
//! into the shared model ([`parse`]). Malformed sub-records degrade to `None`
//! with a warning; the parse itself never fails.

pub mod parse;
pub mod tree;

pub use parse::{parse, parse_coordinate};

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
