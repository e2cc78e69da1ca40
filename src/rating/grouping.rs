//! Union-find over competitor ids
//!
//! Kept apart from [`super::competitor::Competitor`] so that identity (the
//! name) and cluster membership are separate concerns. Roots point to
//! themselves; `merge_root` always links one resolved root under another, so
//! no cycle can form.

use crate::types::CompetitorId;

#[derive(Debug, Clone, Default)]
pub struct Grouping {
    parents: Vec<CompetitorId>,
}

impl Grouping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new singleton and return its id
    pub fn add(&mut self) -> CompetitorId {
        let id = self.parents.len();
        self.parents.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Resolve the root of `id`, pointing every node on the way straight at it
    pub fn collapse_root(&mut self, id: CompetitorId) -> CompetitorId {
        let mut root = id;
        while self.parents[root] != root {
            root = self.parents[root];
        }

        let mut node = id;
        while self.parents[node] != root {
            let next = self.parents[node];
            self.parents[node] = root;
            node = next;
        }

        root
    }

    /// Join the groups of `a` and `b`; `a`'s root ends up under `b`'s root
    pub fn merge_root(&mut self, a: CompetitorId, b: CompetitorId) {
        let root_a = self.collapse_root(a);
        let root_b = self.collapse_root(b);
        self.parents[root_a] = root_b;
    }

    pub fn same_group(&mut self, a: CompetitorId, b: CompetitorId) -> bool {
        self.collapse_root(a) == self.collapse_root(b)
    }

    /// Every group as `(root, members)`; groups are ordered by their first
    /// member and members keep insertion order
    pub fn partition(&mut self) -> Vec<(CompetitorId, Vec<CompetitorId>)> {
        let mut groups: Vec<(CompetitorId, Vec<CompetitorId>)> = Vec::new();
        let mut slot_of_root: Vec<Option<usize>> = vec![None; self.parents.len()];

        for id in 0..self.parents.len() {
            let root = self.collapse_root(id);
            match slot_of_root[root] {
                Some(slot) => groups[slot].1.push(id),
                None => {
                    slot_of_root[root] = Some(groups.len());
                    groups.push((root, vec![id]));
                }
            }
        }

        groups
    }
}
