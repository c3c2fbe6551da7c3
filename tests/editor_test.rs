//! Tests for copy-on-write tree edits.

use rstest::{fixture, rstest};

use abtree::domain::{
    search, DomainError, EditRejection, GameTree, NodeSpec, Score, SearchConfig, TreeEditor,
};
use abtree::util::testing::{self, sample_tree};

#[fixture]
fn tree() -> GameTree {
    testing::init_test_setup();
    sample_tree()
}

// ============================================================
// add_child
// ============================================================

#[rstest]
fn given_leaf_when_add_child_then_leaf_becomes_internal(tree: GameTree) {
    // Act
    let (edited, child) = TreeEditor::add_child(&tree, "a1").unwrap();

    // Assert
    let parent = edited.node("a1").unwrap();
    assert!(!parent.is_leaf());
    assert_eq!(parent.value, None);
    let new = edited.node(child.as_str()).unwrap();
    assert_eq!(new.value, Some(0.0));
    assert_eq!(new.is_max, !parent.is_max);
    assert_eq!(edited.len(), tree.len() + 1);

    // Original untouched
    assert!(tree.node("a1").unwrap().is_leaf());
    assert_eq!(tree.node("a1").unwrap().value, Some(3.0));
}

#[rstest]
fn given_internal_node_when_add_child_then_appended_last(tree: GameTree) {
    let (edited, child) = TreeEditor::add_child(&tree, "root").unwrap();

    let root = edited.root_node().unwrap();
    let last = edited.get_node(*root.children.last().unwrap()).unwrap();
    assert_eq!(last.id, child);
    assert!(!last.is_max);
}

#[rstest]
fn given_repeated_adds_when_editing_then_ids_stay_unique(tree: GameTree) {
    let (once, first) = TreeEditor::add_child(&tree, "a").unwrap();
    let (twice, second) = TreeEditor::add_child(&once, "a").unwrap();

    assert_ne!(first, second);
    assert!(twice.contains(first.as_str()));
    assert!(twice.contains(second.as_str()));
}

#[rstest]
fn given_new_child_when_add_child_then_id_is_short_hex(tree: GameTree) {
    let (_, child) = TreeEditor::add_child(&tree, "root").unwrap();

    let suffix = child.as_str().strip_prefix("node-").unwrap();
    assert_eq!(suffix.len(), 8);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
}

#[rstest]
fn given_unknown_parent_when_add_child_then_not_found(tree: GameTree) {
    let result = TreeEditor::add_child(&tree, "nope");

    assert!(matches!(result, Err(DomainError::NodeNotFound(id)) if id.as_str() == "nope"));
}

// ============================================================
// delete_node
// ============================================================

#[rstest]
fn given_subtree_when_delete_then_removed_with_descendants(tree: GameTree) {
    // Act
    let edited = TreeEditor::delete_node(&tree, "a").unwrap();

    // Assert
    assert_eq!(edited.len(), 4);
    assert!(!edited.contains("a"));
    assert!(!edited.contains("a1"));
    assert!(!edited.contains("a2"));
    assert_eq!(tree.len(), 7);
}

#[rstest]
fn given_root_when_delete_then_rejected(tree: GameTree) {
    // Act
    let result = TreeEditor::delete_node(&tree, "root");

    // Assert
    match result {
        Err(DomainError::EditRejected { node, reason }) => {
            assert_eq!(node.as_str(), "root");
            assert_eq!(reason, EditRejection::RootDeletion);
            assert_eq!(reason.code(), "root-deletion");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn given_only_child_deleted_when_searching_then_parent_evaluates_to_zero() {
    // Arrange
    let spec = NodeSpec::max(
        "root",
        vec![
            NodeSpec::min("m", vec![NodeSpec::leaf("x", -7.0)]),
            NodeSpec::leaf("y", -3.0),
        ],
    );
    let tree = GameTree::from_spec(&spec).unwrap();

    // Act
    let edited = TreeEditor::delete_node(&tree, "x").unwrap();
    let log = search(&edited, &SearchConfig::minimax()).unwrap();

    // Assert
    assert!(edited.node("m").unwrap().is_leaf());
    assert_eq!(log.root_value, Score::ZERO);
}

// ============================================================
// set_leaf_value
// ============================================================

#[rstest]
fn given_leaf_when_set_value_then_new_tree_carries_it(tree: GameTree) {
    let edited = TreeEditor::set_leaf_value(&tree, "d2", -1.5).unwrap();

    assert_eq!(edited.node("d2").unwrap().value, Some(-1.5));
    assert_eq!(tree.node("d2").unwrap().value, Some(9.0));
}

#[rstest]
#[case("a", 1.0, EditRejection::NotALeaf)]
#[case("root", 1.0, EditRejection::NotALeaf)]
#[case("a1", f64::NAN, EditRejection::NonFiniteValue)]
#[case("a1", f64::INFINITY, EditRejection::NonFiniteValue)]
fn given_invalid_edit_when_set_value_then_rejected_with_reason(
    tree: GameTree,
    #[case] node: &str,
    #[case] value: f64,
    #[case] expected: EditRejection,
) {
    let result = TreeEditor::set_leaf_value(&tree, node, value);

    assert!(
        matches!(result, Err(DomainError::EditRejected { reason, .. }) if reason == expected),
        "{node}: {result:?}"
    );
}

#[rstest]
fn given_unknown_node_when_set_value_then_not_found(tree: GameTree) {
    let result = TreeEditor::set_leaf_value(&tree, "ghost", 1.0);

    assert!(matches!(result, Err(DomainError::NodeNotFound(_))));
}

#[test]
fn given_rejection_codes_when_displayed_then_stable() {
    assert_eq!(EditRejection::NotALeaf.to_string(), "not-a-leaf");
    assert_eq!(EditRejection::NonFiniteValue.to_string(), "non-finite-value");
}
