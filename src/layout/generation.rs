//! Generation assignment.
//!
//! Longest-path depth over `parent of` edges (Kahn order from nodes with no
//! parents), then alternating passes that pull spouses onto the deeper of
//! their two rows and push children back below their parents. The passes
//! stop when nothing changes or after a bounded number of rounds; inputs that
//! never settle (a spouse who is also an ancestor, parent cycles) keep the
//! last computed values.

use std::collections::{HashSet, VecDeque};

/// Relationship pairs the generation pass needs, as node indices.
#[derive(Debug, Clone, Default)]
pub struct Relations {
    /// `(parent, child)`, deduplicated, in edge order.
    pub parent_child: Vec<(usize, usize)>,
    /// `(spouse, spouse)` in edge order.
    pub couples: Vec<(usize, usize)>,
    seen_parents: HashSet<(usize, usize)>,
}

impl Relations {
    pub fn add_parent(&mut self, parent: usize, child: usize) {
        if parent != child && self.seen_parents.insert((parent, child)) {
            self.parent_child.push((parent, child));
        }
    }

    pub fn add_couple(&mut self, a: usize, b: usize) {
        if a != b {
            self.couples.push((a, b));
        }
    }

    /// Per node: does it appear as a child anywhere?
    #[must_use]
    pub fn has_parents(&self, node_count: usize) -> Vec<bool> {
        let mut has = vec![false; node_count];
        for &(_, child) in &self.parent_child {
            has[child] = true;
        }
        has
    }
}

/// Assign a generation number to each of `node_count` nodes.
///
/// Guarantees on settled input: a child sits strictly below each parent and
/// spouses share a row.
#[must_use]
pub fn assign_generations(node_count: usize, relations: &Relations) -> Vec<u32> {
    let mut generations = vec![0_u32; node_count];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut in_degree = vec![0_usize; node_count];
    for &(parent, child) in &relations.parent_child {
        children[parent].push(child);
        in_degree[child] += 1;
    }

    let mut queue: VecDeque<usize> = (0..node_count).filter(|&n| in_degree[n] == 0).collect();
    let mut order: Vec<usize> = Vec::with_capacity(node_count);
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &child in &children[node] {
            generations[child] = generations[child].max(generations[node] + 1);
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                queue.push_back(child);
            }
        }
    }
    if order.len() < node_count {
        tracing::warn!(stuck = node_count - order.len(), "parent cycle detected; generations are approximate");
    }

    // Propagate in topological order so one sweep settles a whole lineage.
    let mut rank = vec![usize::MAX; node_count];
    for (position, &node) in order.iter().enumerate() {
        rank[node] = position;
    }
    let mut sweep = relations.parent_child.clone();
    sweep.sort_by_key(|&(parent, _)| rank[parent]);

    let max_rounds = node_count + 1;
    let mut settled = false;
    for _ in 0..max_rounds {
        let mut changed = false;
        for &(a, b) in &relations.couples {
            let row = generations[a].max(generations[b]);
            if generations[a] != row || generations[b] != row {
                generations[a] = row;
                generations[b] = row;
                changed = true;
            }
        }
        for &(parent, child) in &sweep {
            let below = generations[parent] + 1;
            if generations[child] < below {
                generations[child] = below;
                changed = true;
            }
        }
        if !changed {
            settled = true;
            break;
        }
    }
    if !settled {
        tracing::warn!(rounds = max_rounds, "generation passes did not settle");
    }
    generations
}
