//! Node placement for display.
//!
//! Leaves are spaced evenly left to right in stored order. A parent sits at the
//! midpoint of its outermost children, so lopsided subtrees stay centred over
//! their own span. Only topology matters; values and runs never move a node.

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::arena::{GameTree, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub node_size: f64,
    /// Horizontal distance between neighbouring leaves
    pub leaf_spacing: f64,
    pub level_height: f64,
    pub top_margin: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            node_size: 50.0,
            leaf_spacing: 125.0,
            level_height: 120.0,
            top_margin: 50.0,
        }
    }
}

/// A positioned node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: NodeId,
    pub value: Option<f64>,
    pub is_max: bool,
    pub children: Vec<NodeId>,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEdge {
    pub source: NodeId,
    pub target: NodeId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeLayout {
    /// Post-order: every child precedes its parent
    pub nodes: Vec<LayoutNode>,
    /// Pre-order parent → child
    pub edges: Vec<TreeEdge>,
    pub width: f64,
    pub height: f64,
}

impl TreeLayout {
    pub fn get(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }

    pub fn position(&self, id: &str) -> Option<(f64, f64)> {
        self.get(id).map(|n| (n.x, n.y))
    }
}

#[instrument(level = "debug", skip(tree))]
pub fn layout(tree: &GameTree, params: &LayoutParams) -> TreeLayout {
    let Some(root) = tree.root() else {
        return TreeLayout::default();
    };

    let mut placer = Placer {
        tree,
        params,
        next_leaf: 0,
        nodes: Vec::with_capacity(tree.len()),
    };
    placer.place(root, 0);

    let edges = tree
        .iter()
        .flat_map(|(_, parent)| {
            parent.children.iter().filter_map(move |&c| {
                tree.get_node(c).map(|child| TreeEdge {
                    source: parent.id.clone(),
                    target: child.id.clone(),
                })
            })
        })
        .collect();

    TreeLayout {
        width: placer.next_leaf as f64 * params.leaf_spacing,
        height: tree.depth() as f64 * params.level_height,
        nodes: placer.nodes,
        edges,
    }
}

struct Placer<'a> {
    tree: &'a GameTree,
    params: &'a LayoutParams,
    next_leaf: usize,
    nodes: Vec<LayoutNode>,
}

impl Placer<'_> {
    /// Place the subtree at `idx` and return its x.
    fn place(&mut self, idx: Index, depth: usize) -> f64 {
        let tree = self.tree;
        let Some(node) = tree.get_node(idx) else {
            return 0.0;
        };

        let x = if node.is_leaf() {
            let x = self.next_leaf as f64 * self.params.leaf_spacing + self.params.node_size / 2.0;
            self.next_leaf += 1;
            x
        } else {
            let xs: Vec<f64> = node.children.iter().map(|&c| self.place(c, depth + 1)).collect();
            let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
            let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (min + max) / 2.0
        };

        self.nodes.push(LayoutNode {
            id: node.id.clone(),
            value: node.value,
            is_max: node.is_max,
            children: node
                .children
                .iter()
                .filter_map(|&c| tree.get_node(c).map(|n| n.id.clone()))
                .collect(),
            depth,
            x,
            y: depth as f64 * self.params.level_height + self.params.top_margin,
            width: self.params.node_size,
            height: self.params.node_size,
        });
        x
    }
}
