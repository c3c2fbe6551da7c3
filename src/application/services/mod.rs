//! Application services
//!
//! Concrete structs that orchestrate domain logic. Services that touch disk
//! depend on the `FileSystem` boundary trait.

mod simulation;
mod tree_store;

pub use simulation::SimulationSession;
pub use tree_store::TreeStore;
