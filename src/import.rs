//! Import pipeline: detect, parse, convert, lay out, normalize.
//!
//! Each call builds its own maps and identifiers; nothing is shared between
//! invocations. The only hard failures are empty and unrecognized input.

use serde::{Deserialize, Serialize};

use crate::config::ImportOptions;
use crate::convert::convert;
use crate::detect::{Format, detect};
use crate::error::ImportError;
use crate::graph::{GraphEdge, GraphNode};
use crate::layout::apply_layout;
use crate::model::{FileMetadata, ParseResult};
use crate::{gedcom, geneweb};

/// Records ready for the host graph store, plus everything worth reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    pub format: Format,
    pub metadata: FileMetadata,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub warnings: Vec<String>,
}

/// Summary shown before committing an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportPreview {
    pub format_name: String,
    pub person_count: usize,
    pub family_count: usize,
    pub has_coordinates: bool,
    pub earliest_year: Option<i32>,
    pub latest_year: Option<i32>,
}

/// Run the whole pipeline over one file.
///
/// # Errors
///
/// Returns [`ImportError::EmptyInput`] for zero bytes and
/// [`ImportError::UnsupportedFormat`] when neither grammar matches.
pub fn import(filename: &str, bytes: &[u8], options: &ImportOptions) -> Result<ImportResult, ImportError> {
    let (format, parsed) = parse_file(filename, bytes)?;
    let mut graph = convert(&parsed, options);

    if options.auto_layout {
        apply_layout(&mut graph.nodes, &graph.edges, options.layout_direction);
    }
    normalize_origin(&mut graph.nodes);

    tracing::info!(
        filename,
        format = format.name(),
        persons = parsed.persons.len(),
        families = parsed.families.len(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "genealogy import complete"
    );

    Ok(ImportResult {
        format,
        metadata: parsed.metadata,
        nodes: graph.nodes,
        edges: graph.edges,
        warnings: parsed.warnings,
    })
}

/// Parse only, and summarize.
///
/// # Errors
///
/// Same failures as [`import`].
pub fn preview(filename: &str, bytes: &[u8]) -> Result<ImportPreview, ImportError> {
    let (format, parsed) = parse_file(filename, bytes)?;
    let years = parsed.year_range();
    Ok(ImportPreview {
        format_name: format.name().to_owned(),
        person_count: parsed.persons.len(),
        family_count: parsed.families.len(),
        has_coordinates: parsed.has_coordinates(),
        earliest_year: years.map(|(earliest, _)| earliest),
        latest_year: years.map(|(_, latest)| latest),
    })
}

fn parse_file(filename: &str, bytes: &[u8]) -> Result<(Format, ParseResult), ImportError> {
    if bytes.is_empty() {
        return Err(ImportError::EmptyInput { filename: filename.to_owned() });
    }
    let sniffed = String::from_utf8_lossy(bytes);
    let Some(format) = detect(filename, &sniffed) else {
        tracing::debug!(filename, "no genealogy grammar matched");
        return Err(ImportError::UnsupportedFormat { filename: filename.to_owned() });
    };
    tracing::debug!(filename, format = format.name(), "format detected");

    let parsed = match format {
        Format::Gedcom => gedcom::parse(bytes),
        Format::GeneWeb => geneweb::parse_bytes(bytes),
    };
    if !parsed.warnings.is_empty() {
        tracing::warn!(filename, warnings = parsed.warnings.len(), "parse produced warnings");
    }
    Ok((format, parsed))
}

/// Shift every node so the smallest x and y are both zero.
pub fn normalize_origin(nodes: &mut [GraphNode]) {
    let Some(min_x) = nodes.iter().map(|n| n.position.x).reduce(f64::min) else {
        return;
    };
    let min_y = nodes.iter().map(|n| n.position.y).fold(f64::INFINITY, f64::min);
    for node in nodes {
        node.position.x -= min_x;
        node.position.y -= min_y;
    }
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;
