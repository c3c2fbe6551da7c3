//! Tree builder: validates nested tree descriptions and lays them out in the arena.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::arena::{GameTree, NodeId};
use crate::domain::error::{DomainError, DomainResult};

/// Nested, serializable description of a game tree.
///
/// Field names follow the JSON shape used by the front-end
/// (`id`, `value`, `children`, `isMaxNode`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub id: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
    #[serde(rename = "isMaxNode")]
    pub is_max: bool,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>, is_max: bool) -> Self {
        Self {
            id: id.into(),
            value: None,
            children: Vec::new(),
            is_max,
        }
    }

    pub fn max(id: impl Into<String>, children: Vec<NodeSpec>) -> Self {
        Self::new(id, true).with_children(children)
    }

    pub fn min(id: impl Into<String>, children: Vec<NodeSpec>) -> Self {
        Self::new(id, false).with_children(children)
    }

    /// Leaf with a value; its role is irrelevant to the search and set to MIN.
    pub fn leaf(id: impl Into<String>, value: f64) -> Self {
        Self::new(id, false).with_value(value)
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_children(mut self, children: Vec<NodeSpec>) -> Self {
        self.children = children;
        self
    }
}

/// Constructs arena trees from `NodeSpec` descriptions.
pub struct TreeBuilder {
    seen_ids: HashSet<NodeId>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            seen_ids: HashSet::new(),
        }
    }

    /// Build a tree, rejecting duplicate or empty ids and non-finite values.
    ///
    /// Children keep their declared order.
    #[instrument(level = "debug", skip(self, spec), fields(root = %spec.id))]
    pub fn build(&mut self, spec: &NodeSpec) -> DomainResult<GameTree> {
        self.seen_ids.clear();

        let mut tree = GameTree::new();
        let mut stack = vec![(spec, None)];

        while let Some((current, parent_idx)) = stack.pop() {
            if current.id.trim().is_empty() {
                return Err(DomainError::EmptyNodeId);
            }
            let id = NodeId::new(current.id.clone());

            // A repeated id would alias two nodes; the arena must stay a tree
            if !self.seen_ids.insert(id.clone()) {
                return Err(DomainError::DuplicateNodeId(id));
            }
            if let Some(value) = current.value {
                if !value.is_finite() {
                    return Err(DomainError::NonFiniteValue { node: id, value });
                }
            }

            let value = if current.children.is_empty() {
                current.value
            } else {
                None
            };
            let current_idx = tree.insert_node(id, value, current.is_max, parent_idx);

            // Reverse push so siblings are inserted in declared order
            for child in current.children.iter().rev() {
                stack.push((child, Some(current_idx)));
            }
        }

        Ok(tree)
    }
}

impl GameTree {
    /// Build from a nested description.
    pub fn from_spec(spec: &NodeSpec) -> DomainResult<Self> {
        TreeBuilder::new().build(spec)
    }

    /// Nested description of this tree; `EmptyTree` when there is no root.
    pub fn to_spec(&self) -> DomainResult<NodeSpec> {
        let root = self.root().ok_or(DomainError::EmptyTree)?;
        self.spec_at(root).ok_or(DomainError::EmptyTree)
    }

    fn spec_at(&self, idx: generational_arena::Index) -> Option<NodeSpec> {
        let node = self.get_node(idx)?;
        let children = node
            .children
            .iter()
            .filter_map(|&child| self.spec_at(child))
            .collect();
        Some(NodeSpec {
            id: node.id.to_string(),
            value: node.value,
            children,
            is_max: node.is_max,
        })
    }
}
