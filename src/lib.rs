//! Instrumented minimax and alpha-beta search over small game trees.
//!
//! The engine records every decision as a `SimulationStep`; playback folds a
//! prefix of that log into a renderable snapshot, and a layout pass places the
//! nodes for display.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    layout, reconstruct, search, Algorithm, DomainError, DomainResult, GameTree, NodeId,
    NodeSpec, Oracle, PlaybackSnapshot, Player, Role, Score, SearchConfig, SimulationLog,
    SimulationStep, StepKind, TraversalOrder, TreeEditor, TreeGenerator, TreeLayout,
};
