//! Integration tests for random and blank tree generation.

use std::collections::HashSet;

use rstest::rstest;

use abtree::domain::{DomainError, Role, TreeGenerator};
use abtree::util::testing;

#[rstest]
#[case(1, 2)]
#[case(2, 3)]
#[case(3, 2)]
fn given_depth_and_branching_when_empty_then_complete_tree_of_zeros(
    #[case] depth: usize,
    #[case] branching: usize,
) {
    testing::init_test_setup();

    // Act
    let tree = TreeGenerator::with_seed(0).empty(depth, branching).unwrap();

    // Assert
    let expected: usize = (0..=depth as u32).map(|d| branching.pow(d)).sum();
    assert_eq!(tree.len(), expected);
    assert_eq!(tree.depth(), depth + 1);
    assert_eq!(tree.leaf_nodes().len(), branching.pow(depth as u32));
    assert!(tree
        .iter()
        .filter(|(_, n)| n.is_leaf())
        .all(|(_, n)| n.value == Some(0.0)));
    assert!(tree.roles_alternate());
    assert!(tree.root_node().unwrap().is_max);
}

#[test]
fn given_empty_tree_when_reading_ids_then_assigned_in_preorder() {
    let tree = TreeGenerator::new().empty(2, 2).unwrap();

    let ids: Vec<_> = tree.iter().map(|(_, n)| n.id.to_string()).collect();

    assert_eq!(
        ids,
        vec!["node-0", "node-1", "node-2", "node-3", "node-4", "node-5", "node-6"]
    );
}

#[rstest]
#[case(1)]
#[case(9)]
#[case(31337)]
fn given_seed_when_random_then_leaves_at_full_depth_with_values_in_range(#[case] seed: u64) {
    // Act
    let tree = TreeGenerator::with_seed(seed).random(3, 3).unwrap();

    // Assert
    assert_eq!(tree.depth(), 4);
    assert!(tree.roles_alternate());
    for (idx, node) in tree.iter() {
        if node.is_leaf() {
            assert_eq!(tree.path_to(idx).len(), 4, "leaf {} not at full depth", node.id);
            let value = node.value.unwrap();
            assert!((-50.0..50.0).contains(&value));
            assert_eq!(value.fract(), 0.0);
        } else {
            assert!(!node.children.is_empty());
            assert!(node.children.len() <= 3);
            assert_eq!(node.value, None);
        }
    }
    let ids: HashSet<_> = tree.iter().map(|(_, n)| n.id.clone()).collect();
    assert_eq!(ids.len(), tree.len());
}

#[test]
fn given_same_seed_when_random_then_same_tree() {
    let a = TreeGenerator::with_seed(77).random(4, 3).unwrap();
    let b = TreeGenerator::with_seed(77).random(4, 3).unwrap();

    assert_eq!(a.to_spec().unwrap(), b.to_spec().unwrap());
}

#[test]
fn given_keep_probability_one_when_random_then_tree_is_complete() {
    let tree = TreeGenerator::with_seed(5)
        .with_keep_probability(1.0)
        .unwrap()
        .random(3, 2)
        .unwrap();

    assert_eq!(tree.len(), 15);
}

#[test]
fn given_narrow_range_when_random_then_all_leaves_use_it() {
    let tree = TreeGenerator::with_seed(3)
        .with_value_range(7, 8)
        .unwrap()
        .random(2, 3)
        .unwrap();

    assert!(tree
        .iter()
        .filter(|(_, n)| n.is_leaf())
        .all(|(_, n)| n.value == Some(7.0)));
}

#[test]
fn given_min_root_role_when_generating_then_root_minimizes() {
    let tree = TreeGenerator::with_seed(1)
        .with_root_role(Role::Min)
        .empty(1, 2)
        .unwrap();

    assert!(!tree.root_node().unwrap().is_max);
    assert!(tree.roles_alternate());
}

#[rstest]
#[case(TreeGenerator::with_seed(0).with_value_range(5, 5).err())]
#[case(TreeGenerator::with_seed(0).with_keep_probability(1.5).err())]
#[case(TreeGenerator::with_seed(0).with_keep_probability(-0.1).err())]
#[case(TreeGenerator::with_seed(0).random(2, 0).err())]
#[case(TreeGenerator::with_seed(0).empty(2, 0).err())]
fn given_invalid_parameters_when_generating_then_rejected(#[case] error: Option<DomainError>) {
    assert!(matches!(error, Some(DomainError::InvalidParameter { .. })));
}

#[test]
fn given_depth_zero_when_random_then_single_leaf_root() {
    let tree = TreeGenerator::with_seed(4).random(0, 3).unwrap();

    assert_eq!(tree.len(), 1);
    assert!(tree.root_node().unwrap().value.is_some());
}
