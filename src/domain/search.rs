//! Instrumented minimax and alpha-beta search.
//!
//! Both algorithms are one post-order depth-first walk. Every decision point
//! appends a `SimulationStep`; a subtree's events are complete before control
//! returns to its parent, which is the only ordering playback relies on.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::{GameTree, NodeId, Role};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::score::Score;
use crate::domain::step::{Bounds, SimulationStep, StepKind};

/// Depth budget used when the caller does not pick one.
pub const DEFAULT_DEPTH_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    #[default]
    Minimax,
    #[serde(alias = "alphabeta")]
    AlphaBeta,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Minimax => f.write_str("minimax"),
            Algorithm::AlphaBeta => f.write_str("alpha-beta"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimax" => Ok(Algorithm::Minimax),
            "alpha-beta" | "alphabeta" | "ab" => Ok(Algorithm::AlphaBeta),
            other => Err(DomainError::InvalidParameter {
                name: "algorithm",
                reason: format!("unknown algorithm '{other}' (minimax, alpha-beta)"),
            }),
        }
    }
}

/// Order in which a node's children are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    #[default]
    #[serde(alias = "ltr")]
    LeftToRight,
    #[serde(alias = "rtl")]
    RightToLeft,
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalOrder::LeftToRight => f.write_str("left-to-right"),
            TraversalOrder::RightToLeft => f.write_str("right-to-left"),
        }
    }
}

impl FromStr for TraversalOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left-to-right" | "ltr" => Ok(TraversalOrder::LeftToRight),
            "right-to-left" | "rtl" => Ok(TraversalOrder::RightToLeft),
            other => Err(DomainError::InvalidParameter {
                name: "order",
                reason: format!("unknown traversal order '{other}' (ltr, rtl)"),
            }),
        }
    }
}

impl TraversalOrder {
    pub(crate) fn arrange(self, children: &[Index]) -> Vec<Index> {
        match self {
            TraversalOrder::LeftToRight => children.to_vec(),
            TraversalOrder::RightToLeft => children.iter().rev().copied().collect(),
        }
    }
}

/// Parameters of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub algorithm: Algorithm,
    /// Nodes at this depth are evaluated statically
    pub depth_limit: usize,
    /// Role forced on the root; `None` uses the root's declared role
    pub root_role: Option<Role>,
    pub order: TraversalOrder,
    /// Initial window, only used by alpha-beta
    pub bounds: Bounds,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new(Algorithm::Minimax)
    }
}

impl SearchConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            depth_limit: DEFAULT_DEPTH_LIMIT,
            root_role: None,
            order: TraversalOrder::LeftToRight,
            bounds: Bounds::default(),
        }
    }

    pub fn minimax() -> Self {
        Self::new(Algorithm::Minimax)
    }

    pub fn alpha_beta() -> Self {
        Self::new(Algorithm::AlphaBeta)
    }

    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    pub fn with_order(mut self, order: TraversalOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_root_role(mut self, role: Role) -> Self {
        self.root_role = Some(role);
        self
    }

    pub fn with_bounds(mut self, alpha: Score, beta: Score) -> Self {
        self.bounds = Bounds::new(alpha, beta);
        self
    }

    /// Window handed to the root, or `None` when the run does not prune.
    pub(crate) fn initial_bounds(&self) -> Option<Bounds> {
        match self.algorithm {
            Algorithm::Minimax => None,
            Algorithm::AlphaBeta => Some(self.bounds),
        }
    }
}

/// Complete, ordered event log of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationLog {
    pub algorithm: Algorithm,
    pub order: TraversalOrder,
    pub root_value: Score,
    /// First child of the root reaching the root value, in traversal order
    pub best_child: Option<NodeId>,
    pub steps: Vec<SimulationStep>,
}

impl SimulationLog {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&SimulationStep> {
        self.steps.get(index)
    }

    /// Subjects of VISIT events.
    pub fn visited_nodes(&self) -> BTreeSet<NodeId> {
        self.steps
            .iter()
            .filter(|s| s.kind == StepKind::Visit)
            .map(|s| s.node_id.clone())
            .collect()
    }

    /// Tree nodes that never received a VISIT.
    pub fn unvisited_nodes(&self, tree: &GameTree) -> BTreeSet<NodeId> {
        let visited = self.visited_nodes();
        tree.iter()
            .map(|(_, node)| node.id.clone())
            .filter(|id| !visited.contains(id))
            .collect()
    }

    pub fn prune_count(&self) -> usize {
        self.steps.iter().filter(|s| s.kind == StepKind::Prune).count()
    }

    /// BACKTRACK value reported for `node`, if it was expanded.
    pub fn backtrack_value(&self, node: &str) -> Option<Score> {
        self.steps
            .iter()
            .find(|s| s.kind == StepKind::Backtrack && s.node_id.as_str() == node)
            .and_then(|s| s.current_value)
    }
}

/// Run the configured algorithm over `tree` and collect every event.
#[instrument(level = "debug", skip(tree), fields(nodes = tree.len()))]
pub fn search(tree: &GameTree, config: &SearchConfig) -> DomainResult<SimulationLog> {
    let root = tree.root().ok_or(DomainError::EmptyTree)?;
    let root_node = tree.get_node(root).ok_or(DomainError::EmptyTree)?;
    let role = config.root_role.unwrap_or_else(|| root_node.role());

    let mut tracer = Tracer {
        tree,
        order: config.order,
        steps: Vec::new(),
        path: Vec::new(),
    };
    let outcome = tracer.descend(root, config.depth_limit, role, config.initial_bounds());
    debug!(
        "{} finished: root value {} in {} steps",
        config.algorithm,
        outcome.value,
        tracer.steps.len()
    );

    Ok(SimulationLog {
        algorithm: config.algorithm,
        order: config.order,
        root_value: outcome.value,
        best_child: outcome.best,
        steps: tracer.steps,
    })
}

struct Outcome {
    value: Score,
    best: Option<NodeId>,
}

struct Tracer<'a> {
    tree: &'a GameTree,
    order: TraversalOrder,
    steps: Vec<SimulationStep>,
    path: Vec<NodeId>,
}

impl Tracer<'_> {
    /// `bounds` is `Some` exactly when pruning is enabled.
    fn descend(&mut self, idx: Index, depth: usize, role: Role, bounds: Option<Bounds>) -> Outcome {
        let tree = self.tree;
        let Some(node) = tree.get_node(idx) else {
            return Outcome {
                value: Score::ZERO,
                best: None,
            };
        };
        self.path.push(node.id.clone());
        let id = node.id.clone();

        let visit = match bounds {
            Some(b) => format!("Visit **{id}** ({role}) with α = {}, β = {}", b.alpha, b.beta),
            None => format!("Visit **{id}** ({role})"),
        };
        self.emit(SimulationStep::new(StepKind::Visit, &self.path, visit).with_bounds(bounds));

        if node.is_leaf() || depth == 0 {
            let value = Score::new(node.value.unwrap_or(0.0));
            let text = if node.is_leaf() {
                format!("Leaf **{id}** evaluates to {value}")
            } else {
                format!("Depth limit reached at **{id}**, static value {value}")
            };
            self.emit(
                SimulationStep::new(StepKind::Evaluate, &self.path, text)
                    .with_value(value)
                    .with_bounds(bounds),
            );
            self.path.pop();
            return Outcome { value, best: None };
        }

        let children = self.order.arrange(&node.children);
        let mut best = role.worst();
        let mut best_child = None;
        let mut window = bounds;

        for (i, &child_idx) in children.iter().enumerate() {
            let Some(child) = tree.get_node(child_idx) else {
                continue;
            };
            let child_id = child.id.clone();
            let returned = self.descend(child_idx, depth - 1, child.role(), window).value;

            if best_child.is_none() || role.improves(best, returned) {
                best_child = Some(child_id.clone());
            }
            best = role.better(best, returned);
            window = window.map(|w| w.tighten(role, best));

            let text = match window {
                Some(w) => format!(
                    "{role} node **{id}** holds {best} after **{child_id}** returned {returned}; α = {}, β = {}",
                    w.alpha, w.beta
                ),
                None => format!("{role} node **{id}** holds {best} after **{child_id}** returned {returned}"),
            };
            self.emit(
                SimulationStep::new(StepKind::UpdateBounds, &self.path, text)
                    .for_child(&child_id)
                    .with_value(best)
                    .with_bounds(window),
            );

            if let Some(w) = window.filter(|w| w.is_cutoff()) {
                let remaining = children.len() - (i + 1);
                let text = format!(
                    "Prune at **{id}**: α ({}) ≥ β ({}), skipping {remaining} remaining child(ren)",
                    w.alpha, w.beta
                );
                self.emit(
                    SimulationStep::new(StepKind::Prune, &self.path, text)
                        .with_bounds(window)
                        .with_remaining(remaining),
                );
                break;
            }
        }

        let text = format!("Backtrack from **{id}** with final value {best}");
        self.emit(
            SimulationStep::new(StepKind::Backtrack, &self.path, text)
                .with_value(best)
                .with_bounds(window),
        );
        self.path.pop();

        Outcome {
            value: best,
            best: best_child,
        }
    }

    fn emit(&mut self, step: SimulationStep) {
        self.steps.push(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::NodeSpec;

    #[test]
    fn test_single_leaf_root() {
        let tree = GameTree::from_spec(&NodeSpec::leaf("only", 7.0)).unwrap();
        let log = search(&tree, &SearchConfig::alpha_beta()).unwrap();
        let kinds: Vec<_> = log.steps.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![StepKind::Visit, StepKind::Evaluate]);
        assert_eq!(log.root_value, Score::from(7));
        assert_eq!(log.best_child, None);
    }

    #[test]
    fn test_empty_tree_is_rejected() {
        assert_eq!(
            search(&GameTree::new(), &SearchConfig::minimax()),
            Err(DomainError::EmptyTree)
        );
    }

    #[test]
    fn test_parse_algorithm_and_order() {
        assert_eq!("ab".parse::<Algorithm>().unwrap(), Algorithm::AlphaBeta);
        assert_eq!("RTL".parse::<TraversalOrder>().unwrap(), TraversalOrder::RightToLeft);
        assert!("negamax".parse::<Algorithm>().is_err());
    }
}
