//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{SimulationSession, TreeStore};
use crate::config::Settings;
use crate::domain::{GameTree, TreeGenerator};
use crate::domain::DomainResult;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    pub tree_store: TreeStore,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let tree_store = TreeStore::new(Arc::clone(&fs));

        Self {
            settings,
            fs,
            tree_store,
        }
    }

    /// Session over `tree` using the configured search and layout defaults.
    pub fn session(&self, tree: GameTree) -> SimulationSession {
        SimulationSession::new(tree, self.settings.search_config(), self.settings.layout)
    }

    /// Generator seeded and bounded from the `[generator]` section.
    pub fn generator(&self) -> DomainResult<TreeGenerator> {
        self.settings.generator.build()
    }
}
