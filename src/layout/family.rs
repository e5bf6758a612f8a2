//! Family-unit reconstruction from converted edges.
//!
//! Units are rebuilt from `married to` and `parent of` edges grouped by their
//! `family_id` property, so the layout never looks at parser output.

use std::collections::HashMap;

use uuid::Uuid;

use crate::graph::{EdgeKind, GraphEdge};

/// One couple and its children, as node indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyUnit {
    pub id: String,
    pub husband: Option<usize>,
    pub wife: Option<usize>,
    pub children: Vec<usize>,
}

impl FamilyUnit {
    fn new(id: String) -> Self {
        Self { id, husband: None, wife: None, children: Vec::new() }
    }

    /// Present parents, husband first.
    pub fn parents(&self) -> impl Iterator<Item = usize> {
        self.husband.into_iter().chain(self.wife)
    }

    fn add_parent(&mut self, node: usize) {
        if self.husband == Some(node) || self.wife == Some(node) {
            return;
        }
        if self.husband.is_none() {
            self.husband = Some(node);
        } else if self.wife.is_none() {
            self.wife = Some(node);
        }
    }
}

/// Group edges into family units, in order of first appearance.
///
/// Edges whose endpoints are not in `index` are ignored. Edges without a
/// family id fall back to a key derived from their parent/spouse endpoint.
#[must_use]
pub fn build_family_units(edges: &[GraphEdge], index: &HashMap<Uuid, usize>) -> Vec<FamilyUnit> {
    let mut units: Vec<FamilyUnit> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for edge in edges {
        if edge.kind == EdgeKind::SiblingOf {
            continue;
        }
        let (Some(&source), Some(&target)) = (index.get(&edge.source), index.get(&edge.target)) else {
            continue;
        };
        let key = edge
            .family_id()
            .map_or_else(|| format!("~{}", edge.source), ToOwned::to_owned);
        let slot = *by_id.entry(key.clone()).or_insert_with(|| {
            units.push(FamilyUnit::new(key));
            units.len() - 1
        });
        let unit = &mut units[slot];

        match edge.kind {
            EdgeKind::MarriedTo => {
                if unit.husband.is_none() && unit.wife != Some(source) {
                    unit.husband = Some(source);
                }
                if unit.wife.is_none() && unit.husband != Some(target) {
                    unit.wife = Some(target);
                }
            }
            EdgeKind::ParentOf => {
                unit.add_parent(source);
                if !unit.children.contains(&target) {
                    unit.children.push(target);
                }
            }
            EdgeKind::SiblingOf => {}
        }
    }
    units
}
