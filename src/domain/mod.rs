//! Domain layer: game tree model and the search, playback and layout algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod display;
pub mod editor;
pub mod error;
pub mod generator;
pub mod layout;
pub mod oracle;
pub mod playback;
pub mod score;
pub mod search;
pub mod step;

pub use arena::{GameNode, GameTree, NodeId, Role};
pub use builder::{NodeSpec, TreeBuilder};
pub use display::TreeDisplay;
pub use editor::TreeEditor;
pub use error::{DomainError, DomainResult, EditRejection};
pub use generator::TreeGenerator;
pub use layout::{layout, LayoutNode, LayoutParams, TreeEdge, TreeLayout};
pub use oracle::{Grade, Mistake, Oracle, OracleReport};
pub use playback::{reconstruct, PlaybackSnapshot, Player};
pub use score::Score;
pub use search::{search, Algorithm, SearchConfig, SimulationLog, TraversalOrder};
pub use step::{Bounds, SimulationStep, StepKind};
