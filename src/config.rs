//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/abtree/abtree.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `ABTREE_*` prefix, `__` between section and key

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::search::DEFAULT_DEPTH_LIMIT;
use crate::domain::{
    Algorithm, DomainResult, LayoutParams, SearchConfig, TraversalOrder, TreeGenerator,
};

/// Defaults for `run` and the control panel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    pub algorithm: Algorithm,
    pub depth_limit: usize,
    pub order: TraversalOrder,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Minimax,
            depth_limit: DEFAULT_DEPTH_LIMIT,
            order: TraversalOrder::LeftToRight,
        }
    }
}

/// Shape and value range of generated trees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Edges from the root to the deepest leaf
    pub depth: usize,
    pub branching: usize,
    pub min_value: i64,
    /// Exclusive
    pub max_value: i64,
    pub keep_probability: f64,
    /// Fixed seed for reproducible trees
    pub seed: Option<u64>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            depth: 3,
            branching: 2,
            min_value: TreeGenerator::DEFAULT_MIN_VALUE,
            max_value: TreeGenerator::DEFAULT_MAX_VALUE,
            keep_probability: TreeGenerator::DEFAULT_KEEP_PROBABILITY,
            seed: None,
        }
    }
}

impl GeneratorSettings {
    /// Generator with this section's seed, value range and keep probability.
    pub fn build(&self) -> DomainResult<TreeGenerator> {
        let generator = match self.seed {
            Some(seed) => TreeGenerator::with_seed(seed),
            None => TreeGenerator::new(),
        };
        generator
            .with_value_range(self.min_value, self.max_value)?
            .with_keep_probability(self.keep_probability)
    }
}

/// Unified configuration for abtree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub layout: LayoutParams,
    pub generator: GeneratorSettings,
}

/// Get the XDG config directory for abtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "abtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("abtree.toml"))
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// A missing global file is skipped; a missing `local` file is an error.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        let defaults = Config::try_from(&Settings::default()).map_err(config_err)?;
        let mut builder = Config::builder().add_source(defaults);

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("load: global config {}", global_path.display());
                builder = builder.add_source(
                    File::new(&global_path.to_string_lossy(), FileFormat::Toml).required(false),
                );
            }
        }

        if let Some(path) = local {
            debug!("load: local config {}", path.display());
            builder = builder
                .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("ABTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Search parameters for a session, from the `[search]` section.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::new(self.search.algorithm)
            .with_depth_limit(self.search.depth_limit)
            .with_order(self.search.order)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# abtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/abtree/abtree.toml
#   Local:  file given with --config
#   Env:    ABTREE_<SECTION>__<KEY>, e.g. ABTREE_SEARCH__DEPTH_LIMIT=3

[search]
# "minimax" or "alpha-beta"
# algorithm = "minimax"
# Nodes this many levels below the root are evaluated statically
# depth_limit = 10
# "left-to-right" or "right-to-left"
# order = "left-to-right"

[layout]
# node_size = 50.0
# leaf_spacing = 125.0
# level_height = 120.0
# top_margin = 50.0

[generator]
# depth = 3
# branching = 2
# Leaf values are drawn from [min_value, max_value)
# min_value = -50
# max_value = 50
# keep_probability = 0.9
# seed = 42
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
