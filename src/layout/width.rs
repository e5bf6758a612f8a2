//! Family ownership tree and bottom-up subtree measurement.
//!
//! Every family is owned by exactly one place in the tree: either it is a
//! root, or it hangs under the child slot of the first parent-family that
//! reaches it. Widths are then computed once per family (memoized) so nested
//! families never overlap their siblings.

use std::collections::HashMap;

use super::family::FamilyUnit;
use super::spacing::SpacingProfile;
use super::LayoutError;

/// A child position inside a family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildSlot {
    /// A child with no family of its own (or whose families live elsewhere).
    Leaf(usize),
    /// A child drawn as a parent of the families it owns.
    Branch { node: usize, families: Vec<usize> },
}

/// Ownership tree over family indices.
#[derive(Debug, Clone, Default)]
pub struct LayoutTree {
    /// Root families, left to right.
    pub roots: Vec<usize>,
    /// Child slots per family, in child order.
    pub slots: Vec<Vec<ChildSlot>>,
    /// True when no family qualified as a root and every family became one.
    pub all_roots: bool,
}

/// Measured extent of one family subtree, relative to its left edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamilyMetrics {
    pub width: f64,
    /// Horizontal center of the couple.
    pub anchor: f64,
    /// Left edge of the first child slot.
    pub children_start: f64,
    pub couple_width: f64,
}

/// Build the ownership tree. Roots are families whose parents have no parents
/// of their own; families no root reaches are appended as extra roots.
#[must_use]
pub fn build_layout_tree(units: &[FamilyUnit], has_parents: &[bool]) -> LayoutTree {
    let mut families_of: HashMap<usize, Vec<usize>> = HashMap::new();
    for (family, unit) in units.iter().enumerate() {
        for parent in unit.parents() {
            families_of.entry(parent).or_default().push(family);
        }
    }

    let mut tree = LayoutTree { roots: Vec::new(), slots: vec![Vec::new(); units.len()], all_roots: false };
    let mut claimed = vec![false; units.len()];

    let mut candidates: Vec<usize> = (0..units.len()).filter(|&f| is_root_candidate(&units[f], has_parents)).collect();
    if candidates.is_empty() && !units.is_empty() {
        tracing::warn!(families = units.len(), "no root family found; treating every family as a root");
        tree.all_roots = true;
        candidates = (0..units.len()).collect();
    }

    for family in candidates {
        if !claimed[family] {
            claimed[family] = true;
            tree.roots.push(family);
            claim(family, units, &families_of, &mut claimed, &mut tree.slots, 0);
        }
    }

    let mut stragglers = 0_usize;
    for family in 0..units.len() {
        if !claimed[family] {
            stragglers += 1;
            claimed[family] = true;
            tree.roots.push(family);
            claim(family, units, &families_of, &mut claimed, &mut tree.slots, 0);
        }
    }
    if stragglers > 0 {
        tracing::debug!(stragglers, "unreached families placed as extra roots");
    }
    tree
}

fn is_root_candidate(unit: &FamilyUnit, has_parents: &[bool]) -> bool {
    unit.parents().all(|p| !has_parents.get(p).copied().unwrap_or(false))
}

fn claim(
    family: usize,
    units: &[FamilyUnit],
    families_of: &HashMap<usize, Vec<usize>>,
    claimed: &mut [bool],
    slots: &mut [Vec<ChildSlot>],
    depth: usize,
) {
    if depth > units.len() {
        return;
    }
    let mut owned_by_children: Vec<Vec<usize>> = Vec::with_capacity(units[family].children.len());
    for &child in &units[family].children {
        let mut owned = Vec::new();
        for &own in families_of.get(&child).map_or(&[][..], Vec::as_slice) {
            if !claimed[own] {
                claimed[own] = true;
                owned.push(own);
            }
        }
        owned_by_children.push(owned);
    }

    for (&child, owned) in units[family].children.iter().zip(owned_by_children) {
        if owned.is_empty() {
            slots[family].push(ChildSlot::Leaf(child));
            continue;
        }
        for &own in &owned {
            claim(own, units, families_of, claimed, slots, depth + 1);
        }
        slots[family].push(ChildSlot::Branch { node: child, families: owned });
    }
}

/// Fallback tree: every family is a root and every child a leaf.
#[must_use]
pub fn flat_layout_tree(units: &[FamilyUnit]) -> LayoutTree {
    LayoutTree {
        roots: (0..units.len()).collect(),
        slots: units.iter().map(|u| u.children.iter().map(|&c| ChildSlot::Leaf(c)).collect()).collect(),
        all_roots: true,
    }
}

/// Measure every family in the tree, children before parents.
///
/// # Errors
///
/// Returns [`LayoutError`] when nesting exceeds the family count or a family
/// is reached while still being measured.
pub fn measure(
    units: &[FamilyUnit],
    tree: &LayoutTree,
    profile: &SpacingProfile,
) -> Result<Vec<FamilyMetrics>, LayoutError> {
    let mut memo: Vec<Option<FamilyMetrics>> = vec![None; units.len()];
    let mut in_progress = vec![false; units.len()];
    for family in 0..units.len() {
        measure_family(family, units, tree, profile, &mut memo, &mut in_progress, 0)?;
    }
    Ok(memo
        .into_iter()
        .map(|m| m.unwrap_or(FamilyMetrics { width: 0.0, anchor: 0.0, children_start: 0.0, couple_width: 0.0 }))
        .collect())
}

fn measure_family(
    family: usize,
    units: &[FamilyUnit],
    tree: &LayoutTree,
    profile: &SpacingProfile,
    memo: &mut [Option<FamilyMetrics>],
    in_progress: &mut [bool],
    depth: usize,
) -> Result<FamilyMetrics, LayoutError> {
    if let Some(metrics) = memo[family] {
        return Ok(metrics);
    }
    if depth > units.len() {
        return Err(LayoutError::DepthExceeded { limit: units.len() });
    }
    if in_progress[family] {
        return Err(LayoutError::Cycle { family: units[family].id.clone() });
    }
    in_progress[family] = true;

    // (width, anchor) per child slot
    let mut spans: Vec<(f64, f64)> = Vec::with_capacity(tree.slots[family].len());
    for slot in &tree.slots[family] {
        let span = match slot {
            ChildSlot::Leaf(_) => (profile.node_width, profile.node_width / 2.0),
            ChildSlot::Branch { families, .. } => {
                let mut width = 0.0;
                let mut anchor = None;
                for (i, &own) in families.iter().enumerate() {
                    let nested = measure_family(own, units, tree, profile, memo, in_progress, depth + 1)?;
                    if i > 0 {
                        width += profile.sibling_gap;
                    }
                    anchor.get_or_insert(width + nested.anchor);
                    width += nested.width;
                }
                (width, anchor.unwrap_or(width / 2.0))
            }
        };
        spans.push(span);
    }

    let couple_width = profile.couple_width(units[family].parents().count());
    let gaps = spans.len().saturating_sub(1) as f64 * profile.sibling_gap;
    let children_sum: f64 = spans.iter().map(|(w, _)| w).sum::<f64>() + gaps;
    let width = couple_width.max(children_sum).max(profile.node_width);
    let children_start = (width - children_sum) / 2.0;

    let anchor = match (spans.first(), spans.last()) {
        (Some(&(_, first_anchor)), Some(&(last_width, last_anchor))) => {
            let first = children_start + first_anchor;
            let last = children_start + children_sum - last_width + last_anchor;
            let half = couple_width / 2.0;
            ((first + last) / 2.0).clamp(half, width - half)
        }
        _ => width / 2.0,
    };

    in_progress[family] = false;
    let metrics = FamilyMetrics { width, anchor, children_start, couple_width };
    memo[family] = Some(metrics);
    Ok(metrics)
}
