//! Reference evaluator without instrumentation.
//!
//! Grades answers in the teaching mode and cross-checks the search engine:
//! every expanded node's value must match the engine's BACKTRACK value and
//! the pruned set must match the nodes the engine never visits.

use std::collections::{BTreeMap, BTreeSet};

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::arena::{GameTree, NodeId, Role};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::score::Score;
use crate::domain::search::{SearchConfig, TraversalOrder};
use crate::domain::step::Bounds;

/// Answers closer than this to the expected value count as correct.
const TOLERANCE: f64 = 1e-9;

/// Correct values and prune set for one tree and configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleReport {
    pub root_value: Score,
    /// Value of every node the algorithm evaluates, leaves included
    pub values: BTreeMap<NodeId, Score>,
    /// Internal nodes whose children were examined
    pub expanded: BTreeSet<NodeId>,
    /// Nodes a correct run never visits
    pub pruned: BTreeSet<NodeId>,
}

/// A wrong answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mistake {
    pub node: NodeId,
    pub expected: Score,
    pub given: f64,
}

/// Outcome of grading a set of user answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub correct: Vec<NodeId>,
    pub incorrect: Vec<Mistake>,
    /// Expanded nodes without an answer
    pub missing: Vec<NodeId>,
    /// Answers for pruned or unknown nodes; not counted
    pub ignored: Vec<NodeId>,
}

impl Grade {
    pub fn is_perfect(&self) -> bool {
        self.incorrect.is_empty() && self.missing.is_empty()
    }

    /// Fraction of gradable nodes answered correctly.
    pub fn ratio(&self) -> f64 {
        let total = self.correct.len() + self.incorrect.len() + self.missing.len();
        if total == 0 {
            1.0
        } else {
            self.correct.len() as f64 / total as f64
        }
    }
}

pub struct Oracle;

impl Oracle {
    #[instrument(level = "debug", skip(tree))]
    pub fn evaluate(tree: &GameTree, config: &SearchConfig) -> DomainResult<OracleReport> {
        let root = tree.root().ok_or(DomainError::EmptyTree)?;
        let root_node = tree.get_node(root).ok_or(DomainError::EmptyTree)?;
        let role = config.root_role.unwrap_or_else(|| root_node.role());

        let mut walk = Walk {
            tree,
            order: config.order,
            values: BTreeMap::new(),
            expanded: BTreeSet::new(),
            seen: BTreeSet::new(),
        };
        let root_value = walk.value(root, config.depth_limit, role, config.initial_bounds());

        let pruned = tree
            .iter()
            .map(|(_, n)| n.id.clone())
            .filter(|id| !walk.seen.contains(id))
            .collect();

        Ok(OracleReport {
            root_value,
            values: walk.values,
            expanded: walk.expanded,
            pruned,
        })
    }
}

impl OracleReport {
    /// Grade answers for expanded internal nodes.
    pub fn grade(&self, answers: &BTreeMap<NodeId, f64>) -> Grade {
        let mut grade = Grade::default();

        for node in &self.expanded {
            let Some(expected) = self.values.get(node).copied() else {
                continue;
            };
            match answers.get(node) {
                None => grade.missing.push(node.clone()),
                Some(&given) if (expected.value() - given).abs() < TOLERANCE => {
                    grade.correct.push(node.clone())
                }
                Some(&given) => grade.incorrect.push(Mistake {
                    node: node.clone(),
                    expected,
                    given,
                }),
            }
        }

        grade.ignored = answers
            .keys()
            .filter(|id| !self.expanded.contains(*id))
            .cloned()
            .collect();
        grade
    }
}

struct Walk<'a> {
    tree: &'a GameTree,
    order: TraversalOrder,
    values: BTreeMap<NodeId, Score>,
    expanded: BTreeSet<NodeId>,
    seen: BTreeSet<NodeId>,
}

impl Walk<'_> {
    fn value(&mut self, idx: Index, depth: usize, role: Role, bounds: Option<Bounds>) -> Score {
        let tree = self.tree;
        let Some(node) = tree.get_node(idx) else {
            return Score::ZERO;
        };
        self.seen.insert(node.id.clone());

        let value = if node.is_leaf() || depth == 0 {
            Score::new(node.value.unwrap_or(0.0))
        } else {
            self.expanded.insert(node.id.clone());
            let mut best = role.worst();
            let mut window = bounds;
            for child_idx in self.order.arrange(&node.children) {
                let Some(child) = tree.get_node(child_idx) else {
                    continue;
                };
                best = role.better(best, self.value(child_idx, depth - 1, child.role(), window));
                window = window.map(|w| w.tighten(role, best));
                if window.is_some_and(|w| w.is_cutoff()) {
                    break;
                }
            }
            best
        };

        self.values.insert(node.id.clone(), value);
        value
    }
}
