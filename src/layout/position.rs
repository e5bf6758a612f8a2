//! Top-down placement of measured family subtrees.

use crate::config::LayoutDirection;
use crate::graph::Position;

use super::family::FamilyUnit;
use super::spacing::SpacingProfile;
use super::width::{ChildSlot, FamilyMetrics, LayoutTree};

/// Distance from the top of the drawing to the first row after centering.
pub const TOP_MARGIN: f64 = 50.0;

/// Everything placement reads; positions are the only output.
pub struct Placement<'a> {
    pub units: &'a [FamilyUnit],
    pub tree: &'a LayoutTree,
    pub metrics: &'a [FamilyMetrics],
    pub generations: &'a [u32],
    pub profile: &'a SpacingProfile,
    pub direction: LayoutDirection,
}

struct Placer<'a> {
    input: &'a Placement<'a>,
    max_generation: u32,
    positions: Vec<Option<Position>>,
}

/// Place every node: root families left to right, then nodes outside any
/// family. The result is centered horizontally on x = 0 with the top row at
/// [`TOP_MARGIN`].
#[must_use]
pub fn place_nodes(input: &Placement<'_>) -> Vec<Position> {
    let node_count = input.generations.len();
    let mut placer = Placer {
        input,
        max_generation: input.generations.iter().copied().max().unwrap_or(0),
        positions: vec![None; node_count],
    };

    let mut cursor = 0.0;
    for &root in &input.tree.roots {
        let Some(metrics) = input.metrics.get(root) else {
            continue;
        };
        placer.place_family(root, cursor, 0);
        cursor += metrics.width + input.profile.branch_gap;
    }

    let mut orphans = 0_usize;
    for node in 0..node_count {
        if placer.positions[node].is_none() {
            placer.put(node, cursor);
            cursor += input.profile.node_width + input.profile.sibling_gap;
            orphans += 1;
        }
    }
    if orphans > 0 {
        tracing::debug!(orphans, "placed nodes outside any family");
    }

    let mut positions: Vec<Position> = placer.positions.into_iter().flatten().collect();
    center(&mut positions, input.profile);
    positions
}

impl Placer<'_> {
    fn row(&self, node: usize) -> f64 {
        let generation = self.input.generations[node];
        let level = match self.input.direction {
            LayoutDirection::TopToBottom => generation,
            LayoutDirection::BottomToTop => self.max_generation - generation,
        };
        f64::from(level) * self.input.profile.level_height
    }

    /// First placement wins.
    fn put(&mut self, node: usize, x: f64) {
        if self.positions[node].is_none() {
            let y = self.row(node);
            self.positions[node] = Some(Position { x, y });
        }
    }

    fn place_family(&mut self, family: usize, left: f64, depth: usize) {
        let input = self.input;
        if depth > input.units.len() {
            tracing::warn!(family = %input.units[family].id, "placement nesting limit reached");
            return;
        }
        let Some(metrics) = input.metrics.get(family) else {
            return;
        };
        let profile = input.profile;
        let center = left + metrics.anchor;

        let parents: Vec<usize> = input.units[family].parents().collect();
        match parents.as_slice() {
            [single] => self.put(*single, center - profile.node_width / 2.0),
            [husband, wife] => {
                self.put(*husband, center - profile.couple_gap / 2.0 - profile.node_width);
                self.put(*wife, center + profile.couple_gap / 2.0);
            }
            _ => {}
        }

        let mut x = left + metrics.children_start;
        for slot in &input.tree.slots[family] {
            match slot {
                ChildSlot::Leaf(child) => {
                    self.put(*child, x);
                    x += profile.node_width + profile.sibling_gap;
                }
                ChildSlot::Branch { families, .. } => {
                    for &own in families {
                        self.place_family(own, x, depth + 1);
                        x += input.metrics.get(own).map_or(profile.node_width, |m| m.width) + profile.sibling_gap;
                    }
                }
            }
        }
    }
}

fn center(positions: &mut [Position], profile: &SpacingProfile) {
    let Some(min_x) = positions.iter().map(|p| p.x).reduce(f64::min) else {
        return;
    };
    let max_x = positions.iter().map(|p| p.x + profile.node_width).fold(min_x, f64::max);
    let min_y = positions.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let shift_x = -(min_x + max_x) / 2.0;
    let shift_y = TOP_MARGIN - min_y;
    for position in positions {
        position.x += shift_x;
        position.y += shift_y;
    }
}
