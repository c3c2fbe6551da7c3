//! Tree persistence service
//!
//! Reads and writes game trees as JSON `NodeSpec` documents.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{GameTree, NodeSpec};
use crate::infrastructure::traits::FileSystem;

pub struct TreeStore {
    fs: Arc<dyn FileSystem>,
}

impl TreeStore {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load and validate a tree file.
    pub fn load(&self, path: &Path) -> ApplicationResult<GameTree> {
        debug!("load: path={}", path.display());
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read tree", path)?;
        let spec = Self::parse(&content)?;
        Ok(GameTree::from_spec(&spec)?)
    }

    /// Write the tree as pretty JSON, creating parent directories.
    pub fn save(&self, tree: &GameTree, path: &Path) -> ApplicationResult<()> {
        debug!("save: path={}", path.display());
        let json = Self::to_json(tree)?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent", path)?;
        self.fs
            .write(path, &json)
            .with_path_context("write tree", path)
    }

    pub fn parse(content: &str) -> ApplicationResult<NodeSpec> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(tree: &GameTree) -> ApplicationResult<String> {
        let spec = tree.to_spec()?;
        let mut json = serde_json::to_string_pretty(&spec)?;
        json.push('\n');
        Ok(json)
    }
}
