//! Family-tree layout over converted graph records.
//!
//! DESIGN
//! ======
//! The engine only reads nodes and typed edges, never parser output:
//!
//! 1. Index nodes and rebuild family units from `married to` / `parent of`
//!    edges grouped by `family_id`.
//! 2. Assign generations (longest path, spouses share a row).
//! 3. Build the family ownership tree and measure every subtree bottom-up.
//! 4. Place subtrees top-down, centering each couple over its children.
//!
//! When measurement fails (nesting deeper than the family count, or a family
//! reached from itself) the tree is rebuilt flat, with every family as a root,
//! and measured again.
//!
//! Output is deterministic: all iteration follows node and edge order.

pub mod family;
pub mod generation;
pub mod position;
pub mod spacing;
pub mod width;

use std::collections::HashMap;

use uuid::Uuid;

use crate::config::LayoutDirection;
use crate::graph::{EdgeKind, GraphEdge, GraphNode, Position};

pub use family::FamilyUnit;
pub use spacing::SpacingProfile;
pub use width::{FamilyMetrics, LayoutTree};

/// Internal measurement failures that trigger the flat fallback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("family nesting exceeded {limit} levels")]
    DepthExceeded { limit: usize },
    #[error("family {family} contains itself")]
    Cycle { family: String },
}

/// Computed layout, indexed like the input nodes.
#[derive(Debug, Clone)]
pub struct Layout {
    pub positions: Vec<Position>,
    pub generations: Vec<u32>,
    pub units: Vec<FamilyUnit>,
    pub tree: LayoutTree,
    pub metrics: Vec<FamilyMetrics>,
    pub profile: SpacingProfile,
}

/// Compute positions for `nodes` without mutating them.
#[must_use]
pub fn compute_layout(nodes: &[GraphNode], edges: &[GraphEdge], direction: LayoutDirection) -> Layout {
    let profile = SpacingProfile::for_node_count(nodes.len());
    let index: HashMap<Uuid, usize> = nodes.iter().enumerate().map(|(i, node)| (node.id, i)).collect();

    let mut relations = generation::Relations::default();
    for edge in edges {
        let (Some(&source), Some(&target)) = (index.get(&edge.source), index.get(&edge.target)) else {
            continue;
        };
        match edge.kind {
            EdgeKind::MarriedTo => relations.add_couple(source, target),
            EdgeKind::ParentOf => relations.add_parent(source, target),
            EdgeKind::SiblingOf => {}
        }
    }

    let generations = generation::assign_generations(nodes.len(), &relations);
    let units = family::build_family_units(edges, &index);
    let mut tree = width::build_layout_tree(&units, &relations.has_parents(nodes.len()));
    let metrics = match width::measure(&units, &tree, &profile) {
        Ok(metrics) => metrics,
        Err(err) => {
            tracing::warn!(error = %err, "nested layout failed; falling back to flat roots");
            tree = width::flat_layout_tree(&units);
            width::measure(&units, &tree, &profile).unwrap_or_default()
        }
    };

    let positions = position::place_nodes(&position::Placement {
        units: &units,
        tree: &tree,
        metrics: &metrics,
        generations: &generations,
        profile: &profile,
        direction,
    });

    tracing::debug!(
        nodes = nodes.len(),
        families = units.len(),
        roots = tree.roots.len(),
        generations = generations.iter().copied().max().map_or(0, |g| g + 1),
        "layout computed"
    );

    Layout { positions, generations, units, tree, metrics, profile }
}

/// Compute the layout and write positions and node sizes back onto `nodes`.
pub fn apply_layout(nodes: &mut [GraphNode], edges: &[GraphEdge], direction: LayoutDirection) -> Layout {
    let layout = compute_layout(nodes, edges, direction);
    for (node, position) in nodes.iter_mut().zip(&layout.positions) {
        node.position = *position;
        node.width = layout.profile.node_width;
        node.height = layout.profile.node_height;
    }
    layout
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
