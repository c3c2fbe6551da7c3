//! Integration tests for the instrumented search engine.

use std::collections::BTreeMap;

use rstest::{fixture, rstest};

use abtree::domain::{
    search, GameTree, NodeSpec, Role, Score, SearchConfig, SimulationLog, StepKind,
    TraversalOrder,
};
use abtree::util::testing::{self, sample_tree};

#[fixture]
fn tree() -> GameTree {
    testing::init_test_setup();
    sample_tree()
}

fn kinds(log: &SimulationLog) -> Vec<StepKind> {
    log.steps.iter().map(|s| s.kind).collect()
}

fn visited(log: &SimulationLog) -> Vec<&str> {
    log.steps
        .iter()
        .filter(|s| s.kind == StepKind::Visit)
        .map(|s| s.node_id.as_str())
        .collect()
}

// ============================================================
// Worked scenarios
// ============================================================

#[rstest]
fn given_two_min_children_when_minimax_then_root_is_three(tree: GameTree) {
    // Act
    let log = search(&tree, &SearchConfig::minimax()).unwrap();

    // Assert
    assert_eq!(log.root_value, Score::from(3));
    assert_eq!(log.best_child.as_ref().map(|id| id.as_str()), Some("a"));
    assert_eq!(log.len(), 20);
    assert_eq!(log.prune_count(), 0);
    assert_eq!(visited(&log), vec!["root", "a", "a1", "a2", "d", "d1", "d2"]);
    assert_eq!(log.backtrack_value("a"), Some(Score::from(3)));
    assert_eq!(log.backtrack_value("d"), Some(Score::from(2)));

    let last = log.steps.last().unwrap();
    assert_eq!(last.kind, StepKind::Backtrack);
    assert_eq!(last.node_id.as_str(), "root");
    assert_eq!(last.current_value, Some(Score::from(3)));
}

#[test]
fn given_second_subtree_refuted_early_when_alpha_beta_then_last_leaf_never_visited() {
    // Arrange: Max(Min(5, 6), Min(4, 100))
    let spec = NodeSpec::max(
        "root",
        vec![
            NodeSpec::min("b", vec![NodeSpec::leaf("b1", 5.0), NodeSpec::leaf("b2", 6.0)]),
            NodeSpec::min("c", vec![NodeSpec::leaf("c1", 4.0), NodeSpec::leaf("c2", 100.0)]),
        ],
    );
    let tree = GameTree::from_spec(&spec).unwrap();

    // Act
    let ab = search(&tree, &SearchConfig::alpha_beta()).unwrap();
    let mm = search(&tree, &SearchConfig::minimax()).unwrap();

    // Assert
    assert_eq!(ab.root_value, Score::from(5));
    assert_eq!(mm.root_value, Score::from(5));
    assert!(!visited(&ab).contains(&"c2"));
    assert!(visited(&mm).contains(&"c2"));

    let prune = ab.steps.iter().find(|s| s.kind == StepKind::Prune).unwrap();
    assert_eq!(prune.node_id.as_str(), "c");
    assert_eq!(prune.remaining, Some(1));
    assert_eq!(prune.alpha, Some(Score::from(5)));
    assert_eq!(prune.beta, Some(Score::from(4)));
}

#[test]
fn given_leaf_without_value_when_search_then_evaluates_to_zero() {
    // Arrange
    let spec = NodeSpec::max(
        "root",
        vec![NodeSpec::new("blank", false), NodeSpec::leaf("neg", -4.0)],
    );
    let tree = GameTree::from_spec(&spec).unwrap();

    // Act
    let log = search(&tree, &SearchConfig::minimax()).unwrap();

    // Assert
    let eval = log
        .steps
        .iter()
        .find(|s| s.kind == StepKind::Evaluate && s.node_id.as_str() == "blank")
        .unwrap();
    assert_eq!(eval.current_value, Some(Score::ZERO));
    assert_eq!(log.root_value, Score::ZERO);
}

#[rstest]
fn given_reversed_order_when_minimax_then_same_value_different_log(tree: GameTree) {
    // Act
    let ltr = search(&tree, &SearchConfig::minimax()).unwrap();
    let rtl = search(
        &tree,
        &SearchConfig::minimax().with_order(TraversalOrder::RightToLeft),
    )
    .unwrap();
    let again = search(
        &tree,
        &SearchConfig::minimax().with_order(TraversalOrder::RightToLeft),
    )
    .unwrap();

    // Assert
    assert_eq!(rtl.root_value, Score::from(3));
    assert_eq!(rtl.best_child.as_ref().map(|id| id.as_str()), Some("a"));
    assert_eq!(visited(&rtl), vec!["root", "d", "d2", "d1", "a", "a2", "a1"]);
    assert_ne!(ltr.steps, rtl.steps);
    assert_eq!(rtl, again);
}

// ============================================================
// Alpha-beta specifics
// ============================================================

#[rstest]
fn given_sample_tree_when_alpha_beta_then_prunes_after_first_leaf_of_d(tree: GameTree) {
    // Act
    let log = search(&tree, &SearchConfig::alpha_beta()).unwrap();

    // Assert
    assert_eq!(log.root_value, Score::from(3));
    assert_eq!(log.len(), 18);
    assert_eq!(
        kinds(&log)[10..16],
        [
            StepKind::Visit,
            StepKind::Visit,
            StepKind::Evaluate,
            StepKind::UpdateBounds,
            StepKind::Prune,
            StepKind::Backtrack,
        ]
    );
    let unvisited: Vec<_> = log
        .unvisited_nodes(&tree)
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    assert_eq!(unvisited, vec!["d2"]);
}

#[rstest]
fn given_alpha_beta_when_inspecting_steps_then_every_step_carries_bounds(tree: GameTree) {
    let log = search(&tree, &SearchConfig::alpha_beta()).unwrap();

    assert!(log.steps.iter().all(|s| s.alpha.is_some() && s.beta.is_some()));
    let root_visit = &log.steps[0];
    assert_eq!(root_visit.alpha, Some(Score::NEG_INFINITY));
    assert_eq!(root_visit.beta, Some(Score::INFINITY));
}

#[rstest]
fn given_minimax_when_inspecting_steps_then_no_bounds_reported(tree: GameTree) {
    let log = search(&tree, &SearchConfig::minimax()).unwrap();

    assert!(log.steps.iter().all(|s| s.alpha.is_none() && s.beta.is_none()));
}

#[rstest]
fn given_narrow_window_when_alpha_beta_then_root_value_is_clamped_by_cutoff(tree: GameTree) {
    // Window (4, 10): every child of root fails low, so nothing raises alpha
    let config = SearchConfig::alpha_beta().with_bounds(Score::from(4), Score::from(10));

    let log = search(&tree, &config).unwrap();

    assert!(log.root_value <= Score::from(4));
    assert!(log.prune_count() >= 1);
}

// ============================================================
// Depth limit and roles
// ============================================================

#[rstest]
fn given_depth_limit_one_when_search_then_children_are_evaluated_statically(tree: GameTree) {
    // Act
    let log = search(&tree, &SearchConfig::minimax().with_depth_limit(1)).unwrap();

    // Assert
    assert_eq!(
        kinds(&log),
        vec![
            StepKind::Visit,
            StepKind::Visit,
            StepKind::Evaluate,
            StepKind::UpdateBounds,
            StepKind::Visit,
            StepKind::Evaluate,
            StepKind::UpdateBounds,
            StepKind::Backtrack,
        ]
    );
    assert_eq!(log.root_value, Score::ZERO);
    assert_eq!(log.best_child.as_ref().map(|id| id.as_str()), Some("a"));
}

#[rstest]
fn given_depth_limit_zero_when_search_then_root_is_evaluated(tree: GameTree) {
    let log = search(&tree, &SearchConfig::minimax().with_depth_limit(0)).unwrap();

    assert_eq!(kinds(&log), vec![StepKind::Visit, StepKind::Evaluate]);
    assert_eq!(log.root_value, Score::ZERO);
}

#[test]
fn given_max_child_under_max_root_when_search_then_declared_roles_win() {
    // Arrange: roles do not alternate
    let spec = NodeSpec::max(
        "root",
        vec![NodeSpec::max(
            "m",
            vec![NodeSpec::leaf("x", 1.0), NodeSpec::leaf("y", 4.0)],
        )],
    );
    let tree = GameTree::from_spec(&spec).unwrap();
    assert!(!tree.roles_alternate());

    // Act
    let log = search(&tree, &SearchConfig::minimax()).unwrap();

    // Assert
    assert_eq!(log.backtrack_value("m"), Some(Score::from(4)));
    assert_eq!(log.root_value, Score::from(4));
}

#[rstest]
fn given_root_role_override_when_search_then_root_minimizes(tree: GameTree) {
    let log = search(&tree, &SearchConfig::minimax().with_root_role(Role::Min)).unwrap();

    assert_eq!(log.root_value, Score::from(2));
    assert_eq!(log.best_child.as_ref().map(|id| id.as_str()), Some("d"));
}

#[test]
fn given_equal_children_when_search_then_first_in_order_is_best() {
    let spec = NodeSpec::max(
        "root",
        vec![NodeSpec::leaf("l", 7.0), NodeSpec::leaf("r", 7.0)],
    );
    let tree = GameTree::from_spec(&spec).unwrap();

    let ltr = search(&tree, &SearchConfig::minimax()).unwrap();
    let rtl = search(
        &tree,
        &SearchConfig::minimax().with_order(TraversalOrder::RightToLeft),
    )
    .unwrap();

    assert_eq!(ltr.best_child.as_ref().map(|id| id.as_str()), Some("l"));
    assert_eq!(rtl.best_child.as_ref().map(|id| id.as_str()), Some("r"));
}

// ============================================================
// Event structure
// ============================================================

#[rstest]
#[case(SearchConfig::minimax())]
#[case(SearchConfig::alpha_beta())]
#[case(SearchConfig::alpha_beta().with_order(TraversalOrder::RightToLeft))]
fn given_any_run_when_counting_updates_then_one_per_examined_child(
    tree: GameTree,
    #[case] config: SearchConfig,
) {
    let log = search(&tree, &config).unwrap();

    let mut examined: BTreeMap<String, usize> = BTreeMap::new();
    for step in log.steps.iter().filter(|s| s.kind == StepKind::Visit) {
        if let [.., parent, _] = step.visited_ids.as_slice() {
            *examined.entry(parent.to_string()).or_default() += 1;
        }
    }
    let mut updates: BTreeMap<String, usize> = BTreeMap::new();
    for step in log.steps.iter().filter(|s| s.kind == StepKind::UpdateBounds) {
        *updates.entry(step.node_id.to_string()).or_default() += 1;
    }

    assert_eq!(examined, updates);
}

#[rstest]
fn given_any_run_when_checking_order_then_subtree_events_nest(tree: GameTree) {
    let log = search(&tree, &SearchConfig::alpha_beta()).unwrap();

    for node in ["root", "a", "d"] {
        let visit = log
            .steps
            .iter()
            .position(|s| s.kind == StepKind::Visit && s.node_id.as_str() == node)
            .unwrap();
        let backtrack = log
            .steps
            .iter()
            .position(|s| s.kind == StepKind::Backtrack && s.node_id.as_str() == node)
            .unwrap();
        assert!(visit < backtrack);
        // Every event between them concerns the node or its descendants
        assert!(log.steps[visit..=backtrack]
            .iter()
            .all(|s| s.visited_ids.iter().any(|id| id.as_str() == node)));
    }
}

#[rstest]
fn given_run_when_reading_ids_and_paths_then_they_follow_the_traversal(tree: GameTree) {
    let log = search(&tree, &SearchConfig::minimax()).unwrap();

    let ids: Vec<_> = log.steps[..5].iter().map(|s| s.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["visit-root", "visit-a", "visit-a1", "eval-a1", "update-a-a1"]
    );

    let eval = &log.steps[3];
    let path: Vec<_> = eval.visited_ids.iter().map(|id| id.as_str()).collect();
    assert_eq!(path, vec!["root", "a", "a1"]);

    let backtrack_a = &log.steps[8];
    assert_eq!(backtrack_a.kind, StepKind::Backtrack);
    let active: Vec<_> = backtrack_a.active_path.iter().map(|id| id.as_str()).collect();
    assert_eq!(active, vec!["root"]);
}

#[rstest]
fn given_log_when_serialized_then_infinite_bounds_are_strings(tree: GameTree) {
    let log = search(&tree, &SearchConfig::alpha_beta()).unwrap();

    let json = serde_json::to_value(&log.steps[0]).unwrap();

    assert_eq!(json["kind"], "VISIT");
    assert_eq!(json["alpha"], "-∞");
    assert_eq!(json["beta"], "∞");
    assert_eq!(json["nodeId"], "root");
}
