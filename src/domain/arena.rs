use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::score::Score;

/// Stable, user-visible node identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Whether a node accumulates the largest or the smallest child value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Max,
    Min,
}

impl Role {
    pub fn from_is_max(is_max: bool) -> Self {
        if is_max {
            Role::Max
        } else {
            Role::Min
        }
    }

    pub fn is_max(self) -> bool {
        matches!(self, Role::Max)
    }

    pub fn opposite(self) -> Self {
        match self {
            Role::Max => Role::Min,
            Role::Min => Role::Max,
        }
    }

    /// Starting value of this role's accumulator.
    pub fn worst(self) -> Score {
        match self {
            Role::Max => Score::NEG_INFINITY,
            Role::Min => Score::INFINITY,
        }
    }

    /// Combine accumulator and child value; ties keep the accumulator.
    pub fn better(self, best: Score, candidate: Score) -> Score {
        match self {
            Role::Max => best.max_first(candidate),
            Role::Min => best.min_first(candidate),
        }
    }

    /// True when `candidate` strictly improves on `best` for this role.
    pub fn improves(self, best: Score, candidate: Score) -> bool {
        match self {
            Role::Max => candidate > best,
            Role::Min => candidate < best,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Max => "MAX",
            Role::Min => "MIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Game tree node stored in the arena.
#[derive(Debug, Clone)]
pub struct GameNode {
    /// Stable identity, unique within the tree
    pub id: NodeId,
    /// Authoritative only for leaves; derived for internal nodes
    pub value: Option<f64>,
    /// Declared role; never inferred from depth
    pub is_max: bool,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Child indices in traversal order
    pub children: Vec<Index>,
}

impl GameNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn role(&self) -> Role {
        Role::from_is_max(self.is_max)
    }
}

/// Arena-based game tree.
///
/// Nodes are addressed internally by arena index and externally by `NodeId`.
/// Editing never happens in place: see `TreeEditor`, which clones the arena
/// and hands back a new tree so earlier runs keep a consistent view.
#[derive(Debug, Clone, Default)]
pub struct GameTree {
    arena: Arena<GameNode>,
    ids: HashMap<NodeId, Index>,
    root: Option<Index>,
}

impl GameTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node below `parent` (or as the root), appending it to the
    /// parent's children. Id uniqueness is the caller's responsibility.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn insert_node(
        &mut self,
        id: NodeId,
        value: Option<f64>,
        is_max: bool,
        parent: Option<Index>,
    ) -> Index {
        let node = GameNode {
            id: id.clone(),
            value,
            is_max,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);
        self.ids.insert(id, node_idx);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    /// Detach `idx` from its parent and drop it with all descendants.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn remove_subtree(&mut self, idx: Index) {
        let parent = self.arena.get(idx).and_then(|n| n.parent);
        if let Some(parent) = parent.and_then(|p| self.arena.get_mut(p)) {
            parent.children.retain(|&c| c != idx);
        }
        if self.root == Some(idx) {
            self.root = None;
        }

        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current) {
                self.ids.remove(&node.id);
                stack.extend(node.children);
            }
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&GameNode> {
        self.arena.get(idx)
    }

    pub(crate) fn get_node_mut(&mut self, idx: Index) -> Option<&mut GameNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn root_node(&self) -> Option<&GameNode> {
        self.root.and_then(|idx| self.arena.get(idx))
    }

    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.ids.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&GameNode> {
        self.index_of(id).and_then(|idx| self.arena.get(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Number of levels; a lone root has depth 1, an empty tree 0.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Leaf ids in left-to-right order.
    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.id.clone())
            .collect()
    }

    /// Ids from the root down to `idx`, inclusive.
    pub fn path_to(&self, idx: Index) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(idx);
        while let Some(node) = current.and_then(|i| self.get_node(i)) {
            path.push(node.id.clone());
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// True when every internal node's children carry the opposite role.
    pub fn roles_alternate(&self) -> bool {
        self.iter().all(|(_, node)| {
            node.children
                .iter()
                .filter_map(|&c| self.get_node(c))
                .all(|child| child.is_max != node.is_max)
        })
    }
}

/// Pre-order traversal in stored child order.
pub struct TreeIterator<'a> {
    tree: &'a GameTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a GameTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push(root);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a GameNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
