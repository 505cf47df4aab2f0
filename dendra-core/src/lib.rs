//! Dendra core library.
//!
//! An in-memory ultrametric merge tree (dendrogram) for agglomerative
//! hierarchical clustering. An external driver decides which elements to
//! merge and at what weight; [`Ultrametric`] keeps the resulting tree
//! consistent and answers the queries a clustering pipeline needs:
//!
//! - incremental construction with [`Ultrametric::merge`] and retraction
//!   with [`Ultrametric::split`],
//! - ancestry queries, including [`Ultrametric::lowest_common_ancestor`],
//! - lazy leaf enumeration with [`Ultrametric::leaves`],
//! - flat clustering extraction at a weight threshold with
//!   [`Ultrametric::cut`] and [`Ultrametric::cut_from`].
//!
//! The structure is single-threaded and purely in-memory; callers wanting
//! shared access must provide their own synchronisation.
//!
//! # Examples
//! ```
//! use dendra_core::Ultrametric;
//!
//! let mut tree = Ultrametric::new(0..6);
//! let ab = tree.merge(0, 1, 0.1)?;
//! let abc = tree.merge(ab, 2, 0.2)?;
//! let de = tree.merge(3, 4, 0.3)?;
//! let def = tree.merge(de, 5, 0.4)?;
//! let root = tree.merge(abc, def, 0.5)?;
//!
//! assert_eq!(tree.leaf_count(root), Some(6));
//! let cut = tree.cut(0.25)?;
//! assert_eq!(cut.leaf_to_root(), &[abc, abc, abc, 3, 4, 5]);
//! # Ok::<(), dendra_core::TreeError>(())
//! ```

mod error;
mod store;
mod tree;

pub use crate::{
    error::{Result, TreeError, TreeErrorCode},
    tree::{FlatCut, Leaves, Ultrametric},
};
