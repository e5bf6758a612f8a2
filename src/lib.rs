//! Genealogy file import: GEDCOM and GeneWeb parsing, conversion to generic
//! graph records, and a generation-based family-tree layout.
//!
//! The entry points are [`import::import`] and [`import::preview`]; every
//! stage is also usable on its own.

pub mod config;
pub mod convert;
pub mod date;
pub mod detect;
pub mod error;
pub mod gedcom;
pub mod geneweb;
pub mod graph;
pub mod import;
pub mod layout;
pub mod model;
