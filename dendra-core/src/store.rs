//! Typed node store backing the ultrametric tree.
//!
//! The tree owns one [`TreeStore`] and exposes only tree-shaped operations on
//! top of it, so the single-parent invariant holds by construction: a node's
//! parent pointer is only ever assigned when a merge links it under a freshly
//! created internal node, and only ever cleared when that parent is removed.
//!
//! Records are kept in a `BTreeMap` keyed by node id. Ordered iteration makes
//! component enumeration during cuts deterministic, which keeps cut outputs
//! stable across runs.

use std::collections::BTreeMap;

/// Per-node record: merge weight, live leaf tally, and explicit adjacency.
#[derive(Clone, Debug)]
pub(crate) struct NodeRecord {
    pub(crate) weight: f64,
    pub(crate) leaf_count: usize,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
}

impl NodeRecord {
    fn new(weight: f64, leaf_count: usize) -> Self {
        Self {
            weight,
            leaf_count,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Mutable forest storage: a node table with parent/child adjacency.
#[derive(Clone, Debug, Default)]
pub(crate) struct TreeStore {
    nodes: BTreeMap<usize, NodeRecord>,
}

impl TreeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts a parentless, childless node. Re-inserting an existing id
    /// overwrites the record, which is how duplicate leaf ids collapse at
    /// construction time.
    pub(crate) fn insert(&mut self, id: usize, weight: f64, leaf_count: usize) {
        self.nodes.insert(id, NodeRecord::new(weight, leaf_count));
    }

    /// Links `child` under `parent`, recording both adjacency directions.
    ///
    /// `child` must currently be a root. Drivers are expected to merge
    /// roots only (each node gains at most one parent over its lifetime);
    /// the debug assertion catches misuse during development.
    pub(crate) fn attach(&mut self, parent: usize, child: usize) {
        debug_assert!(
            self.parent(child).is_none(),
            "node {child} already has a parent"
        );
        if let Some(record) = self.nodes.get_mut(&parent) {
            record.children.push(child);
        }
        if let Some(record) = self.nodes.get_mut(&child) {
            record.parent = Some(parent);
        }
    }

    /// Removes a node together with its incident edges: its children become
    /// roots and its parent (if any) loses one child. Returns the removed
    /// record, or `None` when the id is unknown.
    pub(crate) fn remove(&mut self, id: usize) -> Option<NodeRecord> {
        let record = self.nodes.remove(&id)?;
        for child in &record.children {
            if let Some(child_record) = self.nodes.get_mut(child) {
                child_record.parent = None;
            }
        }
        if let Some(parent) = record.parent {
            if let Some(parent_record) = self.nodes.get_mut(&parent) {
                parent_record.children.retain(|&c| c != id);
            }
        }
        Some(record)
    }

    pub(crate) fn contains(&self, id: usize) -> bool {
        self.nodes.contains_key(&id)
    }

    pub(crate) fn get(&self, id: usize) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: usize) -> Option<&mut NodeRecord> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn parent(&self, id: usize) -> Option<usize> {
        self.nodes.get(&id).and_then(|record| record.parent)
    }

    pub(crate) fn children(&self, id: usize) -> &[usize] {
        self.nodes
            .get(&id)
            .map_or(&[], |record| record.children.as_slice())
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates node ids in ascending order.
    pub(crate) fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.keys().copied()
    }

    /// Collects the proper descendants of `id` (excluding `id` itself) with
    /// an iterative depth-first walk. Unknown ids yield an empty set.
    pub(crate) fn descendants(&self, id: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.children(id).to_vec();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend_from_slice(self.children(current));
        }
        out
    }
}
