//! Playback reconstruction: fold a prefix of the event log into a snapshot.
//!
//! Every snapshot is recomputed from the start of the log. Seeking backwards
//! or jumping anywhere yields exactly what stepping there one event at a time
//! would.

use std::collections::{BTreeMap, BTreeSet};

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::domain::arena::{GameTree, NodeId};
use crate::domain::score::Score;
use crate::domain::step::{SimulationStep, StepKind};

/// Renderable state after the events `0..=index`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    /// `None` before the first event
    pub index: Option<usize>,
    pub kind: Option<StepKind>,
    pub active_node: Option<NodeId>,
    pub active_path: Vec<NodeId>,
    pub visited: BTreeSet<NodeId>,
    pub pruned: BTreeSet<NodeId>,
    pub values: BTreeMap<NodeId, Score>,
    pub alpha: BTreeMap<NodeId, Score>,
    pub beta: BTreeMap<NodeId, Score>,
    pub explanation: Option<String>,
}

/// Snapshot after `cursor`; an index past the end is clamped to the last event.
#[instrument(level = "trace", skip(tree, steps))]
pub fn reconstruct(tree: &GameTree, steps: &[SimulationStep], cursor: Option<usize>) -> PlaybackSnapshot {
    let Some(k) = cursor.filter(|_| !steps.is_empty()).map(|k| k.min(steps.len() - 1)) else {
        return PlaybackSnapshot::default();
    };

    let mut snapshot = PlaybackSnapshot {
        index: Some(k),
        ..PlaybackSnapshot::default()
    };

    for step in &steps[..=k] {
        snapshot.visited.extend(step.visited_ids.iter().cloned());
        if let Some(value) = step.current_value {
            snapshot.values.insert(step.node_id.clone(), value);
        }
        if let Some(alpha) = step.alpha {
            snapshot.alpha.insert(step.node_id.clone(), alpha);
        }
        if let Some(beta) = step.beta {
            snapshot.beta.insert(step.node_id.clone(), beta);
        }
        if step.kind == StepKind::Prune {
            mark_pruned_children(tree, &step.node_id, &snapshot.visited, &mut snapshot.pruned);
        }
    }

    let current = &steps[k];
    snapshot.kind = Some(current.kind);
    snapshot.active_node = Some(current.node_id.clone());
    snapshot.active_path = current.active_path.clone();
    snapshot.explanation = Some(current.description.clone());
    snapshot
}

fn mark_pruned_children(
    tree: &GameTree,
    node: &NodeId,
    visited: &BTreeSet<NodeId>,
    pruned: &mut BTreeSet<NodeId>,
) {
    let Some(parent_idx) = tree.index_of(node.as_str()) else {
        return;
    };
    let Some(parent) = tree.get_node(parent_idx) else {
        return;
    };
    trace!(path = ?tree.path_to(parent_idx), "cutoff");
    for &child in &parent.children {
        mark_subtree(tree, child, visited, pruned);
    }
}

/// Stops at visited nodes: a pruned ancestor never hides work already done.
fn mark_subtree(tree: &GameTree, idx: Index, visited: &BTreeSet<NodeId>, pruned: &mut BTreeSet<NodeId>) {
    let Some(node) = tree.get_node(idx) else {
        return;
    };
    if visited.contains(&node.id) {
        return;
    }
    pruned.insert(node.id.clone());
    for &child in &node.children {
        mark_subtree(tree, child, visited, pruned);
    }
}

/// Cursor over an immutable log, as driven by play/pause/seek controls.
#[derive(Debug, Clone)]
pub struct Player<'a> {
    tree: &'a GameTree,
    steps: &'a [SimulationStep],
    cursor: Option<usize>,
}

impl<'a> Player<'a> {
    pub fn new(tree: &'a GameTree, steps: &'a [SimulationStep]) -> Self {
        Self {
            tree,
            steps,
            cursor: None,
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current_step(&self) -> Option<&'a SimulationStep> {
        self.cursor.and_then(|k| self.steps.get(k))
    }

    /// Jump anywhere; past-the-end indices land on the last event.
    pub fn seek(&mut self, cursor: Option<usize>) -> PlaybackSnapshot {
        self.cursor = match cursor {
            Some(_) if self.steps.is_empty() => None,
            Some(k) => Some(k.min(self.steps.len() - 1)),
            None => None,
        };
        self.snapshot()
    }

    /// Advance one event. Returns false when already at the end.
    pub fn step_forward(&mut self) -> bool {
        let next = match self.cursor {
            None => 0,
            Some(k) => k + 1,
        };
        if next < self.steps.len() {
            self.cursor = Some(next);
            true
        } else {
            false
        }
    }

    /// Go back one event; stepping back from the first event returns to the start.
    pub fn step_back(&mut self) -> bool {
        match self.cursor {
            None => false,
            Some(0) => {
                self.cursor = None;
                true
            }
            Some(k) => {
                self.cursor = Some(k - 1);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.cursor = None;
    }

    pub fn is_at_end(&self) -> bool {
        match self.cursor {
            Some(k) => k + 1 >= self.steps.len(),
            None => self.steps.is_empty(),
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        reconstruct(self.tree, self.steps, self.cursor)
    }
}
