//! Error types for the dendra core library.
//!
//! Defines the error enum exposed by the public API, a stable machine-readable
//! code for each variant, and a convenient result alias.

use thiserror::Error;

/// Errors returned by tree mutation and cut operations.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum TreeError {
    /// A node id referenced by the operation does not exist in the tree.
    #[error("node {node} does not exist in the tree")]
    NodeNotFound {
        /// The id the caller supplied.
        node: usize,
    },
    /// No node in scope satisfied the cut threshold, so there are no leaves
    /// to index.
    #[error("no node satisfies cut threshold {threshold}")]
    EmptyCut {
        /// The threshold the caller supplied.
        threshold: f64,
    },
}

impl TreeError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> TreeErrorCode {
        match self {
            Self::NodeNotFound { .. } => TreeErrorCode::NodeNotFound,
            Self::EmptyCut { .. } => TreeErrorCode::EmptyCut,
        }
    }
}

/// Machine-readable error codes for [`TreeError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum TreeErrorCode {
    /// A referenced node id does not exist in the tree.
    NodeNotFound,
    /// No node in scope satisfied the cut threshold.
    EmptyCut,
}

impl TreeErrorCode {
    /// Returns the symbolic identifier for logging and metrics surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NodeNotFound => "TREE_NODE_NOT_FOUND",
            Self::EmptyCut => "TREE_EMPTY_CUT",
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            TreeError::NodeNotFound { node: 3 }.code().as_str(),
            "TREE_NODE_NOT_FOUND"
        );
        assert_eq!(
            TreeError::EmptyCut { threshold: 0.5 }.code().as_str(),
            "TREE_EMPTY_CUT"
        );
    }

    #[test]
    fn display_names_the_offending_input() {
        let err = TreeError::NodeNotFound { node: 42 };
        assert_eq!(err.to_string(), "node 42 does not exist in the tree");
    }
}
