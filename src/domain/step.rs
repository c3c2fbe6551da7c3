//! Event schema emitted by the search engine and consumed by playback.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::arena::{NodeId, Role};
use crate::domain::score::Score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKind {
    Visit,
    Evaluate,
    UpdateBounds,
    Prune,
    Backtrack,
}

impl StepKind {
    /// Prefix used in step ids.
    fn tag(self) -> &'static str {
        match self {
            StepKind::Visit => "visit",
            StepKind::Evaluate => "eval",
            StepKind::UpdateBounds => "update",
            StepKind::Prune => "prune",
            StepKind::Backtrack => "backtrack",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Visit => "VISIT",
            StepKind::Evaluate => "EVALUATE",
            StepKind::UpdateBounds => "UPDATE_BOUNDS",
            StepKind::Prune => "PRUNE",
            StepKind::Backtrack => "BACKTRACK",
        };
        f.write_str(name)
    }
}

/// Alpha/beta window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub alpha: Score,
    pub beta: Score,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            alpha: Score::NEG_INFINITY,
            beta: Score::INFINITY,
        }
    }
}

impl Bounds {
    pub fn new(alpha: Score, beta: Score) -> Self {
        Self { alpha, beta }
    }

    /// Raise alpha (MAX) or lower beta (MIN) towards `value`.
    pub fn tighten(self, role: Role, value: Score) -> Self {
        match role {
            Role::Max => Self {
                alpha: self.alpha.max_first(value),
                ..self
            },
            Role::Min => Self {
                beta: self.beta.min_first(value),
                ..self
            },
        }
    }

    /// Remaining siblings cannot change the ancestor's choice.
    pub fn is_cutoff(self) -> bool {
        self.alpha >= self.beta
    }
}

/// One discrete, immutable algorithm event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStep {
    pub id: String,
    pub kind: StepKind,
    pub node_id: NodeId,
    /// Markdown explanation, for display only
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta: Option<Score>,
    /// Children skipped by a PRUNE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<usize>,
    /// Path from the root to `node_id`
    pub visited_ids: Vec<NodeId>,
    /// Highlighted path; the parent's path once the node backtracks
    pub active_path: Vec<NodeId>,
}

impl SimulationStep {
    pub(crate) fn new(kind: StepKind, path: &[NodeId], description: String) -> Self {
        let node_id = path.last().cloned().unwrap_or_else(|| NodeId::new(""));
        let active_path = match kind {
            StepKind::Backtrack => path[..path.len().saturating_sub(1)].to_vec(),
            _ => path.to_vec(),
        };
        Self {
            id: format!("{}-{}", kind.tag(), node_id),
            kind,
            node_id,
            description,
            current_value: None,
            alpha: None,
            beta: None,
            remaining: None,
            visited_ids: path.to_vec(),
            active_path,
        }
    }

    pub(crate) fn with_value(mut self, value: Score) -> Self {
        self.current_value = Some(value);
        self
    }

    pub(crate) fn with_bounds(mut self, bounds: Option<Bounds>) -> Self {
        if let Some(b) = bounds {
            self.alpha = Some(b.alpha);
            self.beta = Some(b.beta);
        }
        self
    }

    /// Qualify the id with the child that triggered an update.
    pub(crate) fn for_child(mut self, child: &NodeId) -> Self {
        self.id = format!("{}-{}", self.id, child);
        self
    }

    pub(crate) fn with_remaining(mut self, remaining: usize) -> Self {
        self.remaining = Some(remaining);
        self
    }
}

impl fmt::Display for SimulationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<13} {:<12}", self.kind.to_string(), self.node_id.as_str())?;
        if let Some(v) = self.current_value {
            write!(f, " value={v}")?;
        }
        if let (Some(a), Some(b)) = (self.alpha, self.beta) {
            write!(f, " α={a} β={b}")?;
        }
        if let Some(n) = self.remaining {
            write!(f, " skipped={n}")?;
        }
        Ok(())
    }
}
