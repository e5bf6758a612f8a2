//! Error types surfaced to callers of the import pipeline.
//!
//! Only whole-file failures become errors. Record-level defects are collected
//! as warning strings on [`crate::model::ParseResult`] instead.

/// Error returned by [`crate::import::import`] and [`crate::import::preview`].
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The file matches neither the GEDCOM nor the GeneWeb grammar.
    #[error("unsupported genealogy format: {filename}")]
    UnsupportedFormat { filename: String },
    /// The input contained no bytes at all.
    #[error("empty input: {filename}")]
    EmptyInput { filename: String },
}

/// Error returned when import options cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A recognized option key carried a value that does not parse.
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
