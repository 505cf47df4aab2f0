//! Ultrametric merge tree: incremental dendrogram construction and retraction.
//!
//! An [`Ultrametric`] represents the state of an agglomerative clustering as a
//! binary merge tree. An external driver decides which nodes to merge and at
//! what weight; this module owns the bookkeeping: id allocation, the
//! ultrametric weight invariant (weights never decrease from leaves to root),
//! live leaf tallies, and the merge/split mutation pair. Flat clusterings are
//! extracted by cutting the tree at a weight threshold (see
//! [`Ultrametric::cut`]).
//!
//! Merging clamps the supplied weight to the maximum weight already present
//! in either subtree, so a driver that hands over out-of-order weights still
//! produces a valid dendrogram. Splitting removes the lowest common ancestor
//! of two nodes, turning its children into roots of their own trees; a tree
//! therefore becomes a forest after the first split.

mod cut;
mod union_find;

use std::collections::HashSet;

use tracing::debug;

use crate::{
    error::{Result, TreeError},
    store::TreeStore,
};

pub use self::cut::FlatCut;

/// A binary merge tree (dendrogram) over integer node ids.
///
/// Leaves are supplied at construction; internal nodes are allocated by
/// [`Ultrametric::merge`] with ids strictly larger than any id issued before.
///
/// # Examples
/// ```
/// use dendra_core::Ultrametric;
///
/// let mut tree = Ultrametric::new(0..4);
/// let ab = tree.merge(0, 1, 0.2)?;
/// let cd = tree.merge(2, 3, 0.3)?;
/// let root = tree.merge(ab, cd, 0.9)?;
/// assert_eq!(tree.leaf_count(root), Some(4));
/// assert_eq!(tree.lowest_common_ancestor(0, 3), Some(root));
/// # Ok::<(), dendra_core::TreeError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Ultrametric {
    store: TreeStore,
    next_id: usize,
    max_weight: f64,
}

impl Ultrametric {
    /// Creates a forest of isolated leaves, one per distinct id.
    ///
    /// Duplicate ids collapse to a single leaf. Leaves carry weight
    /// `-inf` and a leaf count of one. The internal id counter starts one
    /// past the largest supplied id (or at one when no leaves are given).
    ///
    /// # Examples
    /// ```
    /// use dendra_core::Ultrametric;
    ///
    /// let tree = Ultrametric::new([0, 1, 1, 5]);
    /// assert_eq!(tree.node_count(), 3);
    /// assert!(tree.is_leaf(5));
    /// ```
    #[must_use]
    pub fn new<I: IntoIterator<Item = usize>>(leaves: I) -> Self {
        let mut store = TreeStore::new();
        let mut max_id = 0;
        for id in leaves {
            max_id = max_id.max(id);
            store.insert(id, f64::NEG_INFINITY, 1);
        }
        Self {
            store,
            next_id: max_id + 1,
            max_weight: f64::NEG_INFINITY,
        }
    }

    /// Merges two nodes under a freshly allocated parent and returns the
    /// parent's id.
    ///
    /// The new node's weight is `w` clamped up to the weight of either
    /// subtree, which preserves the ultrametric condition even when the
    /// caller supplies a weight below an existing merge height. Its leaf
    /// count is the sum of both children's counts. Merging a node with
    /// itself records a single child edge but still sums the count twice.
    ///
    /// # Errors
    /// Returns [`TreeError::NodeNotFound`] when `u` or `v` is not present.
    /// The tree is unchanged on failure.
    ///
    /// # Examples
    /// ```
    /// use dendra_core::Ultrametric;
    ///
    /// let mut tree = Ultrametric::new([0, 1]);
    /// let parent = tree.merge(0, 1, 0.5)?;
    /// assert_eq!(parent, 2);
    /// assert_eq!(tree.weight(parent), Some(0.5));
    /// assert_eq!(tree.parent(0), Some(parent));
    /// # Ok::<(), dendra_core::TreeError>(())
    /// ```
    pub fn merge(&mut self, u: usize, v: usize, w: f64) -> Result<usize> {
        let (weight_u, count_u) = self
            .store
            .get(u)
            .map(|record| (record.weight, record.leaf_count))
            .ok_or(TreeError::NodeNotFound { node: u })?;
        let (weight_v, count_v) = self
            .store
            .get(v)
            .map(|record| (record.weight, record.leaf_count))
            .ok_or(TreeError::NodeNotFound { node: v })?;

        let effective = w.max(weight_u).max(weight_v);
        self.max_weight = self.max_weight.max(effective);

        let id = self.next_id;
        self.next_id += 1;
        self.store.insert(id, effective, count_u + count_v);
        self.store.attach(id, u);
        if v != u {
            self.store.attach(id, v);
        }
        Ok(id)
    }

    /// Retracts the merge joining `u` and `v` by removing their lowest
    /// common ancestor. Returns the removed node's id.
    ///
    /// The removed node's children become roots of their own trees, and
    /// every surviving ancestor's leaf count drops by the removed subtree's
    /// leaf count. When the two nodes share no ancestor (already separated,
    /// or unknown ids) the call is a no-op and returns `None`.
    ///
    /// # Examples
    /// ```
    /// use dendra_core::Ultrametric;
    ///
    /// let mut tree = Ultrametric::new([0, 1]);
    /// let parent = tree.merge(0, 1, 0.5)?;
    /// assert_eq!(tree.split(0, 1), Some(parent));
    /// assert!(!tree.contains(parent));
    /// assert_eq!(tree.split(0, 1), None);
    /// # Ok::<(), dendra_core::TreeError>(())
    /// ```
    pub fn split(&mut self, u: usize, v: usize) -> Option<usize> {
        let Some(split_node) = self.lowest_common_ancestor(u, v) else {
            debug!(u, v, "nodes share no common ancestor, split is a no-op");
            return None;
        };
        let chain = self.ancestors(split_node);
        let removed = self.store.remove(split_node)?;
        for ancestor in chain {
            if let Some(record) = self.store.get_mut(ancestor) {
                record.leaf_count -= removed.leaf_count;
            }
        }
        Some(split_node)
    }

    /// Returns the parent of `n`, or `None` for roots and unknown ids.
    #[must_use]
    pub fn parent(&self, n: usize) -> Option<usize> {
        self.store.parent(n)
    }

    /// Returns the children of `n`, empty for leaves and unknown ids.
    #[must_use]
    pub fn children(&self, n: usize) -> &[usize] {
        self.store.children(n)
    }

    /// Returns the ancestor chain of `n`, nearest first, up to the root of
    /// the tree `n` currently belongs to. Empty for roots and unknown ids.
    #[must_use]
    pub fn ancestors(&self, n: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = n;
        while let Some(parent) = self.store.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Returns the nearest node from which both `u` and `v` are reachable,
    /// or `None` when they lie in disjoint trees of the forest.
    ///
    /// Ancestor chains are strictly ordered towards the root, so the first
    /// shared entry of the shorter chain is the lowest common ancestor.
    #[must_use]
    pub fn lowest_common_ancestor(&self, u: usize, v: usize) -> Option<usize> {
        let ancestors_u = self.ancestors(u);
        let ancestors_v = self.ancestors(v);
        let (shorter, longer) = if ancestors_u.len() <= ancestors_v.len() {
            (&ancestors_u, &ancestors_v)
        } else {
            (&ancestors_v, &ancestors_u)
        };
        let candidates: HashSet<usize> = longer.iter().copied().collect();
        shorter.iter().copied().find(|c| candidates.contains(c))
    }

    /// Walks the parent chain to its end and returns the root of the tree
    /// `n` currently belongs to; `n` itself when it is already a root.
    ///
    /// After splits this need not be the original global root.
    #[must_use]
    pub fn highest_ancestor(&self, n: usize) -> usize {
        let mut current = n;
        while let Some(parent) = self.store.parent(current) {
            current = parent;
        }
        current
    }

    /// Returns whether `n` exists and has no children.
    #[must_use]
    pub fn is_leaf(&self, n: usize) -> bool {
        self.store.contains(n) && self.store.children(n).is_empty()
    }

    /// Returns whether `n` exists and has no parent.
    #[must_use]
    pub fn is_root(&self, n: usize) -> bool {
        self.store.contains(n) && self.store.parent(n).is_none()
    }

    /// Returns whether `n` exists in the forest.
    #[must_use]
    pub fn contains(&self, n: usize) -> bool {
        self.store.contains(n)
    }

    /// Returns the merge weight of `n` (`-inf` for leaves), or `None` for
    /// unknown ids.
    #[must_use]
    pub fn weight(&self, n: usize) -> Option<f64> {
        self.store.get(n).map(|record| record.weight)
    }

    /// Returns the number of leaf descendants currently reachable from `n`,
    /// or `None` for unknown ids.
    #[must_use]
    pub fn leaf_count(&self, n: usize) -> Option<usize> {
        self.store.get(n).map(|record| record.leaf_count)
    }

    /// Returns the largest effective merge weight seen so far, `-inf`
    /// before the first merge.
    #[must_use]
    pub fn max_weight(&self) -> f64 {
        self.max_weight
    }

    /// Returns the number of live nodes (leaves and internal) in the forest.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.store.len()
    }

    /// Iterates all live node ids in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.store.ids()
    }

    /// Iterates the leaves reachable from `node` (proper descendants with no
    /// children), lazily and in depth-first order.
    ///
    /// The walk is recomputed on every call rather than cached, since merges
    /// and splits between calls change the leaf set. A leaf input yields
    /// nothing: only descendants are visited.
    ///
    /// # Examples
    /// ```
    /// use dendra_core::Ultrametric;
    ///
    /// let mut tree = Ultrametric::new([0, 1, 2]);
    /// let ab = tree.merge(0, 1, 0.1)?;
    /// let root = tree.merge(ab, 2, 0.2)?;
    /// let mut leaves: Vec<usize> = tree.leaves(root).collect();
    /// leaves.sort_unstable();
    /// assert_eq!(leaves, vec![0, 1, 2]);
    /// assert_eq!(tree.leaves(0).count(), 0);
    /// # Ok::<(), dendra_core::TreeError>(())
    /// ```
    #[must_use]
    pub fn leaves(&self, node: usize) -> Leaves<'_> {
        Leaves {
            tree: self,
            stack: self.store.children(node).to_vec(),
        }
    }
}

/// Lazy iterator over the leaves reachable from a node.
///
/// Created by [`Ultrametric::leaves`]. Holds a borrow of the tree, so the
/// tree cannot be mutated while the walk is in progress.
#[derive(Clone, Debug)]
pub struct Leaves<'a> {
    tree: &'a Ultrametric,
    stack: Vec<usize>,
}

impl Iterator for Leaves<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while let Some(current) = self.stack.pop() {
            let children = self.tree.store.children(current);
            if children.is_empty() {
                return Some(current);
            }
            self.stack.extend_from_slice(children);
        }
        None
    }
}

#[cfg(test)]
mod property;
