//! Copy-on-write tree edits.
//!
//! Every operation leaves its input untouched and returns a new tree, so a
//! simulation log recorded against the old tree stays consistent with it.

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::arena::{GameTree, NodeId};
use crate::domain::error::{DomainError, DomainResult, EditRejection};

/// Value given to freshly added leaves.
pub const NEW_LEAF_VALUE: f64 = 0.0;

pub struct TreeEditor;

impl TreeEditor {
    /// Append a new leaf under `parent_id`, with the opposite role of its parent.
    ///
    /// Returns the new tree and the id of the created child. The parent becomes
    /// internal, so its stored value is cleared.
    #[instrument(level = "debug", skip(tree))]
    pub fn add_child(tree: &GameTree, parent_id: &str) -> DomainResult<(GameTree, NodeId)> {
        let parent_idx = tree
            .index_of(parent_id)
            .ok_or_else(|| DomainError::NodeNotFound(parent_id.into()))?;

        let mut next = tree.clone();
        let child_id = Self::fresh_id(&next);
        let is_max = match next.get_node_mut(parent_idx) {
            Some(parent) => {
                parent.value = None;
                !parent.is_max
            }
            None => return Err(DomainError::NodeNotFound(parent_id.into())),
        };
        next.insert_node(child_id.clone(), Some(NEW_LEAF_VALUE), is_max, Some(parent_idx));
        debug!("added {} under {}", child_id, parent_id);

        Ok((next, child_id))
    }

    /// Remove `node_id` and its whole subtree. The root cannot be deleted.
    #[instrument(level = "debug", skip(tree))]
    pub fn delete_node(tree: &GameTree, node_id: &str) -> DomainResult<GameTree> {
        let idx = tree
            .index_of(node_id)
            .ok_or_else(|| DomainError::NodeNotFound(node_id.into()))?;
        if tree.root() == Some(idx) {
            return Err(DomainError::EditRejected {
                node: node_id.into(),
                reason: EditRejection::RootDeletion,
            });
        }

        let mut next = tree.clone();
        next.remove_subtree(idx);
        debug!("deleted {} ({} nodes left)", node_id, next.len());
        Ok(next)
    }

    /// Set the value of a leaf. Internal nodes derive their value and are refused.
    #[instrument(level = "debug", skip(tree))]
    pub fn set_leaf_value(tree: &GameTree, node_id: &str, value: f64) -> DomainResult<GameTree> {
        let idx = tree
            .index_of(node_id)
            .ok_or_else(|| DomainError::NodeNotFound(node_id.into()))?;
        let node = tree
            .get_node(idx)
            .ok_or_else(|| DomainError::NodeNotFound(node_id.into()))?;
        if !node.is_leaf() {
            return Err(DomainError::EditRejected {
                node: node_id.into(),
                reason: EditRejection::NotALeaf,
            });
        }
        if !value.is_finite() {
            return Err(DomainError::EditRejected {
                node: node_id.into(),
                reason: EditRejection::NonFiniteValue,
            });
        }

        let mut next = tree.clone();
        if let Some(node) = next.get_node_mut(idx) {
            node.value = Some(value);
        }
        Ok(next)
    }

    fn fresh_id(tree: &GameTree) -> NodeId {
        loop {
            let candidate = format!("node-{:08x}", Uuid::new_v4().as_fields().0);
            if !tree.contains(&candidate) {
                return NodeId::new(candidate);
            }
        }
    }
}
