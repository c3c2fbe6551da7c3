//! Domain-level errors (no external dependencies)

use std::fmt;

use thiserror::Error;

use crate::domain::arena::NodeId;

/// Why an edit operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditRejection {
    /// The root cannot be deleted
    RootDeletion,
    /// Only leaves carry an editable value
    NotALeaf,
    /// Leaf values must be finite numbers
    NonFiniteValue,
}

impl EditRejection {
    /// Stable reason code reported to callers.
    pub fn code(self) -> &'static str {
        match self {
            EditRejection::RootDeletion => "root-deletion",
            EditRejection::NotALeaf => "not-a-leaf",
            EditRejection::NonFiniteValue => "non-finite-value",
        }
    }
}

impl fmt::Display for EditRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Domain errors represent violations of the tree model or refused edits.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("duplicate node id in tree: {0}")]
    DuplicateNodeId(NodeId),

    #[error("node id must not be empty")]
    EmptyNodeId,

    #[error("node {node} has a non-finite value: {value}")]
    NonFiniteValue { node: NodeId, value: f64 },

    #[error("tree has no root")]
    EmptyTree,

    #[error("edit rejected on {node}: {reason}")]
    EditRejected { node: NodeId, reason: EditRejection },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
