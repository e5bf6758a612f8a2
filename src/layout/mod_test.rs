//! Tests for family reconstruction, generations, measurement and placement.

use super::width::{ChildSlot, LayoutTree, flat_layout_tree, measure};
use super::*;
use crate::config::ImportOptions;
use crate::convert::{ConvertedGraph, convert};
use crate::model::{GenealogyFamily, GenealogyPerson, ParseResult};

type FamilyRow<'a> = (&'a str, Option<&'a str>, Option<&'a str>, &'a [&'a str]);

fn build(persons: &[&str], families: &[FamilyRow<'_>]) -> ConvertedGraph {
    let result = ParseResult {
        persons: persons
            .iter()
            .map(|id| GenealogyPerson { first_name: (*id).to_owned(), ..GenealogyPerson::new(id) })
            .collect(),
        families: families
            .iter()
            .map(|(id, husband, wife, children)| GenealogyFamily {
                husband_id: husband.map(ToOwned::to_owned),
                wife_id: wife.map(ToOwned::to_owned),
                children_ids: children.iter().map(|c| (*c).to_owned()).collect(),
                ..GenealogyFamily::new(id)
            })
            .collect(),
        ..ParseResult::default()
    };
    convert(&result, &ImportOptions::default())
}

/// Root couple with two children; the first child has two children of their own.
fn three_generations() -> ConvertedGraph {
    build(
        &["R1", "R2", "G", "C2", "S", "K1", "K2"],
        &[
            ("F1", Some("R1"), Some("R2"), &["G", "C2"]),
            ("F2", Some("G"), Some("S"), &["K1", "K2"]),
        ],
    )
}

fn layout_of(graph: &ConvertedGraph) -> Layout {
    compute_layout(&graph.nodes, &graph.edges, LayoutDirection::TopToBottom)
}

fn index_of(graph: &ConvertedGraph, id: &str) -> usize {
    let node = graph.node_ids[id];
    graph.nodes.iter().position(|n| n.id == node).unwrap()
}

fn family_index(layout: &Layout, id: &str) -> usize {
    layout.units.iter().position(|u| u.id == id).unwrap()
}

fn center_x(layout: &Layout, node: usize) -> f64 {
    layout.positions[node].x + layout.profile.node_width / 2.0
}

fn assert_no_overlap(layout: &Layout) {
    let width = layout.profile.node_width;
    for (i, a) in layout.positions.iter().enumerate() {
        for b in &layout.positions[i + 1..] {
            if (a.y - b.y).abs() < 1e-6 {
                assert!((a.x - b.x).abs() >= width - 1e-6, "overlap between {a:?} and {b:?}");
            }
        }
    }
}

// =============================================================================
// FAMILY UNITS AND GENERATIONS
// =============================================================================

#[test]
fn family_units_rebuilt_from_edges() {
    let graph = three_generations();
    let layout = layout_of(&graph);
    assert_eq!(layout.units.len(), 2);

    let root = &layout.units[family_index(&layout, "F1")];
    assert_eq!(root.husband, Some(index_of(&graph, "R1")));
    assert_eq!(root.wife, Some(index_of(&graph, "R2")));
    assert_eq!(root.children, vec![index_of(&graph, "G"), index_of(&graph, "C2")]);
}

#[test]
fn generations_increase_and_spouses_share_rows() {
    let graph = three_generations();
    let layout = layout_of(&graph);
    let generation = |id: &str| layout.generations[index_of(&graph, id)];

    assert_eq!(generation("R1"), 0);
    assert_eq!(generation("R2"), 0);
    assert_eq!(generation("G"), 1);
    assert_eq!(generation("S"), 1);
    assert_eq!(generation("K1"), 2);

    let index: std::collections::HashMap<_, _> = graph.nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
    for edge in &graph.edges {
        let (source, target) = (index[&edge.source], index[&edge.target]);
        match edge.kind {
            EdgeKind::ParentOf => assert!(layout.generations[target] > layout.generations[source]),
            EdgeKind::MarriedTo => assert_eq!(layout.generations[target], layout.generations[source]),
            EdgeKind::SiblingOf => {}
        }
    }
}

#[test]
fn relations_ignore_repeated_and_self_parent_pairs() {
    let mut relations = generation::Relations::default();
    relations.add_parent(0, 1);
    relations.add_parent(0, 1);
    relations.add_parent(2, 2);
    relations.add_parent(2, 1);
    assert_eq!(relations.parent_child, vec![(0, 1), (2, 1)]);
    assert_eq!(relations.has_parents(3), vec![false, true, false]);
    assert_eq!(generation::assign_generations(3, &relations), vec![0, 1, 0]);
}

#[test]
fn married_in_spouse_follows_deeper_partner() {
    let graph = build(
        &["A", "B", "C", "D", "E"],
        &[("F1", Some("A"), Some("B"), &["C"]), ("F2", Some("C"), Some("D"), &["E"])],
    );
    let layout = layout_of(&graph);
    assert_eq!(layout.generations[index_of(&graph, "D")], 1);
    assert_eq!(layout.generations[index_of(&graph, "E")], 2);
}

// =============================================================================
// MEASUREMENT
// =============================================================================

#[test]
fn root_width_sums_child_subtrees() {
    let graph = three_generations();
    let layout = layout_of(&graph);
    let profile = layout.profile;
    let root = layout.metrics[family_index(&layout, "F1")];
    let nested = layout.metrics[family_index(&layout, "F2")];

    assert_eq!(nested.width, 2.0 * profile.node_width + profile.couple_gap);
    assert_eq!(root.width, nested.width + profile.node_width + profile.sibling_gap);
    assert_eq!(root.width, 550.0);
}

#[test]
fn nested_family_is_owned_by_its_parent_family() {
    let graph = three_generations();
    let layout = layout_of(&graph);
    let root = family_index(&layout, "F1");
    let nested = family_index(&layout, "F2");

    assert_eq!(layout.tree.roots, vec![root]);
    assert!(!layout.tree.all_roots);
    assert_eq!(
        layout.tree.slots[root],
        vec![
            ChildSlot::Branch { node: index_of(&graph, "G"), families: vec![nested] },
            ChildSlot::Leaf(index_of(&graph, "C2")),
        ]
    );
}

#[test]
fn self_containing_tree_is_rejected() {
    let graph = three_generations();
    let layout = layout_of(&graph);
    let cyclic = LayoutTree {
        roots: vec![0],
        slots: vec![
            vec![ChildSlot::Branch { node: 2, families: vec![1] }],
            vec![ChildSlot::Branch { node: 5, families: vec![0] }],
        ],
        all_roots: false,
    };
    assert!(measure(&layout.units, &cyclic, &layout.profile).is_err());

    let flat = flat_layout_tree(&layout.units);
    assert_eq!(flat.roots, vec![0, 1]);
    assert!(measure(&layout.units, &flat, &layout.profile).is_ok());
}

// =============================================================================
// PLACEMENT
// =============================================================================

#[test]
fn couple_is_centered_over_children() {
    let graph = three_generations();
    let layout = layout_of(&graph);
    let couple = (center_x(&layout, index_of(&graph, "G")) + center_x(&layout, index_of(&graph, "S"))) / 2.0;
    let children = (center_x(&layout, index_of(&graph, "K1")) + center_x(&layout, index_of(&graph, "K2"))) / 2.0;
    assert!((couple - children).abs() < 1e-6);
}

#[test]
fn rows_follow_generations() {
    let graph = three_generations();
    let layout = layout_of(&graph);
    let y = |id: &str| layout.positions[index_of(&graph, id)].y;

    assert_eq!(y("R1"), position::TOP_MARGIN);
    assert_eq!(y("R1"), y("R2"));
    assert_eq!(y("G"), y("S"));
    assert_eq!(y("G") - y("R1"), layout.profile.level_height);
    assert_eq!(y("K1") - y("G"), layout.profile.level_height);
}

#[test]
fn drawing_is_centered_on_zero() {
    let graph = three_generations();
    let layout = layout_of(&graph);
    let min = layout.positions.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max = layout.positions.iter().map(|p| p.x + layout.profile.node_width).fold(f64::NEG_INFINITY, f64::max);
    assert!((min + max).abs() < 1e-6);
}

#[test]
fn no_overlap_within_rows() {
    assert_no_overlap(&layout_of(&three_generations()));

    let remarried = build(
        &["A", "B", "C", "D", "E", "F"],
        &[
            ("F1", Some("A"), Some("B"), &["C", "F"]),
            ("F2", Some("A"), Some("D"), &["E"]),
        ],
    );
    let layout = layout_of(&remarried);
    assert_eq!(layout.positions.len(), 6);
    assert_no_overlap(&layout);
}

/// Four generations with several branches and married-in spouses.
fn branching_tree() -> ConvertedGraph {
    build(
        &["R1", "R2", "A", "SA", "B", "C", "SC", "A1", "SA1", "A2", "A3", "C1", "X", "Y"],
        &[
            ("F1", Some("R1"), Some("R2"), &["A", "B", "C"]),
            ("F2", Some("A"), Some("SA"), &["A1", "A2", "A3"]),
            ("F3", Some("C"), Some("SC"), &["C1"]),
            ("F4", Some("A1"), Some("SA1"), &["X", "Y"]),
        ],
    )
}

fn slot_width(layout: &Layout, slot: &ChildSlot) -> f64 {
    match slot {
        ChildSlot::Leaf(_) => layout.profile.node_width,
        ChildSlot::Branch { families, .. } => {
            let widths: f64 = families.iter().map(|&f| layout.metrics[f].width).sum();
            widths + families.len().saturating_sub(1) as f64 * layout.profile.sibling_gap
        }
    }
}

fn slot_nodes(layout: &Layout, slot: &ChildSlot, out: &mut Vec<usize>) {
    match slot {
        ChildSlot::Leaf(node) => out.push(*node),
        ChildSlot::Branch { families, .. } => {
            for &family in families {
                out.extend(layout.units[family].parents());
                for nested in &layout.tree.slots[family] {
                    slot_nodes(layout, nested, out);
                }
            }
        }
    }
}

#[test]
fn sibling_footprints_fit_inside_their_family() {
    let graph = branching_tree();
    let layout = layout_of(&graph);
    let gap = layout.profile.sibling_gap;

    for (family, slots) in layout.tree.slots.iter().enumerate() {
        let metrics = layout.metrics[family];
        assert!(metrics.children_start >= -1e-6);
        let mut left = metrics.children_start;
        for slot in slots {
            let right = left + slot_width(&layout, slot);
            assert!(right <= metrics.width + 1e-6, "family {} overflows its width", layout.units[family].id);
            left = right + gap;
        }
        let half = metrics.couple_width / 2.0;
        assert!(metrics.anchor - half >= -1e-6 && metrics.anchor + half <= metrics.width + 1e-6);
    }
}

#[test]
fn sibling_subtrees_do_not_intersect() {
    let graph = branching_tree();
    let layout = layout_of(&graph);
    let width = layout.profile.node_width;
    assert_no_overlap(&layout);

    for slots in &layout.tree.slots {
        let mut previous_right = f64::NEG_INFINITY;
        for slot in slots {
            let mut nodes = Vec::new();
            slot_nodes(&layout, slot, &mut nodes);
            let left = nodes.iter().map(|&n| layout.positions[n].x).fold(f64::INFINITY, f64::min);
            let right = nodes.iter().map(|&n| layout.positions[n].x + width).fold(f64::NEG_INFINITY, f64::max);
            assert!(left >= previous_right - 1e-6, "sibling subtrees intersect: {left} < {previous_right}");
            previous_right = right;
        }
    }
}

#[test]
fn single_parent_is_centered_over_children() {
    let graph = build(&["P", "A", "B"], &[("F1", None, Some("P"), &["A", "B"])]);
    let layout = layout_of(&graph);
    let unit = &layout.units[0];
    assert_eq!(unit.parents().count(), 1);

    let parent = center_x(&layout, index_of(&graph, "P"));
    let children = (center_x(&layout, index_of(&graph, "A")) + center_x(&layout, index_of(&graph, "B"))) / 2.0;
    assert!((parent - children).abs() < 1e-6);
}

#[test]
fn orphans_get_positions() {
    let graph = build(&["R1", "R2", "C", "LONER"], &[("F1", Some("R1"), Some("R2"), &["C"])]);
    let layout = layout_of(&graph);
    assert_eq!(layout.positions.len(), 4);
    assert_eq!(layout.generations[index_of(&graph, "LONER")], 0);
    assert_no_overlap(&layout);
}

#[test]
fn layout_is_deterministic() {
    let first = layout_of(&three_generations());
    let second = layout_of(&three_generations());
    assert_eq!(first.positions, second.positions);
    assert_eq!(first.generations, second.generations);
}

#[test]
fn bottom_to_top_flips_rows() {
    let graph = three_generations();
    let layout = compute_layout(&graph.nodes, &graph.edges, LayoutDirection::BottomToTop);
    let y = |id: &str| layout.positions[index_of(&graph, id)].y;
    assert!(y("R1") > y("G"));
    assert!(y("G") > y("K1"));
    assert_eq!(y("K1"), position::TOP_MARGIN);
}

#[test]
fn parent_cycle_falls_back_without_failing() {
    let graph = build(&["A", "B"], &[("F1", Some("A"), None, &["B"]), ("F2", Some("B"), None, &["A"])]);
    let layout = layout_of(&graph);
    assert!(layout.tree.all_roots);
    assert_eq!(layout.positions.len(), 2);
    assert!(layout.positions.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
}

#[test]
fn empty_graph() {
    let layout = compute_layout(&[], &[], LayoutDirection::TopToBottom);
    assert!(layout.positions.is_empty());
    assert!(layout.units.is_empty());
}

#[test]
fn apply_layout_writes_positions_and_sizes() {
    let mut graph = three_generations();
    let layout = apply_layout(&mut graph.nodes, &graph.edges, LayoutDirection::TopToBottom);
    for (node, position) in graph.nodes.iter().zip(&layout.positions) {
        assert_eq!(node.position, *position);
        assert_eq!(node.width, layout.profile.node_width);
        assert_eq!(node.height, layout.profile.node_height);
    }
}

#[test]
fn spacing_profile_tiers() {
    assert_eq!(SpacingProfile::for_node_count(0).node_width, 160.0);
    assert_eq!(SpacingProfile::for_node_count(99).node_width, 160.0);
    assert_eq!(SpacingProfile::for_node_count(100).node_width, 140.0);
    assert_eq!(SpacingProfile::for_node_count(1499).node_width, 120.0);
    assert_eq!(SpacingProfile::for_node_count(1500).node_width, 100.0);
    assert_eq!(SpacingProfile::for_node_count(10).couple_width(2), 360.0);
}
