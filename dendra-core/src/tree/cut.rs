//! Flat clustering extraction by cutting the tree at a weight threshold.
//!
//! A cut keeps every node whose weight is at or below the threshold (the
//! boundary is inclusive) and groups the survivors into connected
//! sub-dendrograms with a union-find pass over the surviving parent/child
//! edges. Because weights never decrease towards the root, every kept node's
//! in-scope descendants are kept too, so each component is a complete
//! subtree: it has exactly one root (the kept node whose parent fell above
//! the threshold or out of scope) and its leaves are leaves of the full
//! tree.

use std::collections::HashMap;

use tracing::{instrument, warn};

use super::Ultrametric;
use super::union_find::DisjointSet;
use crate::error::{Result, TreeError};

/// A flat clustering snapshot: the leaf-to-root map produced by a cut.
///
/// The map is dense over `0..=max_leaf_id` for the leaf ids in scope. Slots
/// whose index is not a leaf in the queried scope hold the sentinel `0`;
/// callers must only read slots for leaves they know were in scope.
///
/// # Examples
/// ```
/// use dendra_core::Ultrametric;
///
/// let mut tree = Ultrametric::new([0, 1, 2]);
/// let ab = tree.merge(0, 1, 0.1)?;
/// tree.merge(ab, 2, 0.9)?;
///
/// let cut = tree.cut(0.5)?;
/// assert_eq!(cut.leaf_to_root(), &[ab, ab, 2]);
/// assert_eq!(cut.cluster_count(), 2);
/// # Ok::<(), dendra_core::TreeError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatCut {
    map: Vec<usize>,
    cluster_count: usize,
}

impl FlatCut {
    /// Returns the dense leaf-to-root map, indexed by leaf id.
    #[must_use]
    pub fn leaf_to_root(&self) -> &[usize] {
        &self.map
    }

    /// Returns the cluster root recorded for `leaf`, or `None` when the id
    /// lies beyond the map. Sentinel slots read as `0`.
    #[must_use]
    pub fn root_of(&self, leaf: usize) -> Option<usize> {
        self.map.get(leaf).copied()
    }

    /// Returns the length of the dense map (`max_leaf_id + 1`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns whether the map is empty. Never true for a successful cut.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of clusters (connected components) in the cut.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }
}

impl Ultrametric {
    /// Cuts the whole forest at `threshold` and maps every leaf to the root
    /// of its cluster.
    ///
    /// Nodes with `weight <= threshold` survive the cut; the boundary is
    /// inclusive. Leaves carry weight `-inf` and therefore always survive.
    ///
    /// # Errors
    /// Returns [`TreeError::EmptyCut`] when no node satisfies the threshold,
    /// which for a whole-forest cut only happens on an empty tree.
    ///
    /// # Examples
    /// ```
    /// use dendra_core::Ultrametric;
    ///
    /// let mut tree = Ultrametric::new([0, 1]);
    /// let root = tree.merge(0, 1, 0.3)?;
    /// assert_eq!(tree.cut(f64::INFINITY)?.leaf_to_root(), &[root, root]);
    /// assert_eq!(tree.cut(0.1)?.leaf_to_root(), &[0, 1]);
    /// # Ok::<(), dendra_core::TreeError>(())
    /// ```
    pub fn cut(&self, threshold: f64) -> Result<FlatCut> {
        self.cut_scope(threshold, None)
    }

    /// Cuts the subtree rooted at `source` (its descendants plus itself) at
    /// `threshold`.
    ///
    /// The returned map is still dense from zero up to the largest leaf id
    /// in scope; leaf ids outside the subtree read as the sentinel `0`.
    ///
    /// # Errors
    /// Returns [`TreeError::NodeNotFound`] when `source` is absent and
    /// [`TreeError::EmptyCut`] when no scoped node satisfies the threshold.
    pub fn cut_from(&self, threshold: f64, source: usize) -> Result<FlatCut> {
        if !self.store.contains(source) {
            return Err(TreeError::NodeNotFound { node: source });
        }
        self.cut_scope(threshold, Some(source))
    }

    #[instrument(name = "tree.cut", err, skip(self))]
    fn cut_scope(&self, threshold: f64, source: Option<usize>) -> Result<FlatCut> {
        let kept = self.kept_nodes(threshold, source);
        if kept.is_empty() {
            warn!(threshold, "no node satisfies the cut threshold");
            return Err(TreeError::EmptyCut { threshold });
        }

        // Compact ids so the union-find can run over dense indices.
        let index: HashMap<usize, usize> = kept
            .iter()
            .enumerate()
            .map(|(idx, &node)| (node, idx))
            .collect();

        let mut dsu = DisjointSet::new(kept.len());
        for (idx, &node) in kept.iter().enumerate() {
            if let Some(parent) = self.store.parent(node)
                && let Some(&parent_idx) = index.get(&parent)
            {
                dsu.union(idx, parent_idx);
            }
        }

        // One root per component: the kept node whose parent was cut away.
        let mut component_root: HashMap<usize, usize> = HashMap::new();
        for (idx, &node) in kept.iter().enumerate() {
            let parent_kept = self
                .store
                .parent(node)
                .is_some_and(|parent| index.contains_key(&parent));
            if !parent_kept {
                component_root.insert(dsu.find(idx), node);
            }
        }

        let mut assignments = Vec::new();
        let mut max_leaf = 0;
        for (idx, &node) in kept.iter().enumerate() {
            if !self.store.children(node).is_empty() {
                continue;
            }
            let representative = dsu.find(idx);
            if let Some(&root) = component_root.get(&representative) {
                assignments.push((node, root));
                max_leaf = max_leaf.max(node);
            }
        }
        if assignments.is_empty() {
            warn!(threshold, "cut scope contains no leaves");
            return Err(TreeError::EmptyCut { threshold });
        }

        let mut map = vec![0; max_leaf + 1];
        for (leaf, root) in assignments {
            map[leaf] = root;
        }
        Ok(FlatCut {
            map,
            cluster_count: component_root.len(),
        })
    }

    /// Collects the scoped node ids surviving the threshold, in ascending
    /// order so downstream grouping is deterministic.
    fn kept_nodes(&self, threshold: f64, source: Option<usize>) -> Vec<usize> {
        let survives = |node: usize| {
            self.store
                .get(node)
                .is_some_and(|record| record.weight <= threshold)
        };
        match source {
            Some(root) => {
                let mut scope = self.store.descendants(root);
                scope.push(root);
                scope.sort_unstable();
                scope.retain(|&node| survives(node));
                scope
            }
            None => self.store.ids().filter(|&node| survives(node)).collect(),
        }
    }
}
