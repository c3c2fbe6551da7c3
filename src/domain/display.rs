//! Terminal rendering of game trees via `termtree`.

use generational_arena::Index;
use termtree::Tree;

use crate::domain::arena::{GameNode, GameTree};
use crate::domain::playback::PlaybackSnapshot;

pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeDisplay for GameTree {
    fn to_tree_string(&self) -> Tree<String> {
        render(self, |node| label(node, None))
    }
}

/// Render the tree annotated with a playback snapshot's values and markers.
pub fn annotated(tree: &GameTree, snapshot: &PlaybackSnapshot) -> Tree<String> {
    render(tree, |node| label(node, Some(snapshot)))
}

fn render(tree: &GameTree, label: impl Fn(&GameNode) -> String + Copy) -> Tree<String> {
    fn build_tree(
        tree: &GameTree,
        node_idx: Index,
        label: impl Fn(&GameNode) -> String + Copy,
    ) -> Option<Tree<String>> {
        let node = tree.get_node(node_idx)?;
        let leaves: Vec<_> = node
            .children
            .iter()
            .filter_map(|&child| build_tree(tree, child, label))
            .collect();
        Some(Tree::new(label(node)).with_leaves(leaves))
    }

    tree.root()
        .and_then(|root| build_tree(tree, root, label))
        .unwrap_or_else(|| Tree::new("Empty tree".to_string()))
}

fn label(node: &GameNode, snapshot: Option<&PlaybackSnapshot>) -> String {
    let mut text = if node.is_leaf() {
        match node.value {
            Some(v) => format!("{} = {}", node.id, v),
            None => format!("{} = ?", node.id),
        }
    } else {
        format!("[{}] {}", node.role(), node.id)
    };

    if let Some(snap) = snapshot {
        if !node.is_leaf() {
            if let Some(v) = snap.values.get(&node.id) {
                text.push_str(&format!(" → {v}"));
            }
        }
        if let (Some(a), Some(b)) = (snap.alpha.get(&node.id), snap.beta.get(&node.id)) {
            text.push_str(&format!(" (α={a}, β={b})"));
        }
        if snap.active_node.as_ref() == Some(&node.id) {
            text.push_str(" ◀");
        } else if snap.pruned.contains(&node.id) {
            text.push_str(" ✂");
        } else if !snap.visited.contains(&node.id) {
            text.push_str(" ·");
        }
    }
    text
}
