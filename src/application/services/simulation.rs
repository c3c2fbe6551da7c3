//! Simulation session service
//!
//! Owns the current tree together with the derived layout and the last event
//! log. Derived state is never patched: an edit swaps in a new tree, recomputes
//! the layout and drops the log, a run replaces the log.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{
    layout, reconstruct, search, Algorithm, GameTree, Grade, LayoutParams, NodeId, Oracle,
    OracleReport, PlaybackSnapshot, Player, SearchConfig, SimulationLog, TraversalOrder,
    TreeEditor, TreeLayout,
};

pub struct SimulationSession {
    tree: GameTree,
    config: SearchConfig,
    params: LayoutParams,
    layout: TreeLayout,
    log: Option<SimulationLog>,
}

impl SimulationSession {
    pub fn new(tree: GameTree, config: SearchConfig, params: LayoutParams) -> Self {
        let layout = layout(&tree, &params);
        Self {
            tree,
            config,
            params,
            layout,
            log: None,
        }
    }

    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    /// Log of the last run, if the tree has not changed since.
    pub fn log(&self) -> Option<&SimulationLog> {
        self.log.as_ref()
    }

    /// Run with the current configuration.
    #[instrument(level = "debug", skip(self))]
    pub fn run(&mut self) -> ApplicationResult<&SimulationLog> {
        let log = search(&self.tree, &self.config)?;
        debug!("run: {} steps, root value {}", log.len(), log.root_value);
        let log: &SimulationLog = self.log.insert(log);
        Ok(log)
    }

    /// Apply control-panel settings and run.
    pub fn run_with(
        &mut self,
        algorithm: Algorithm,
        depth_limit: usize,
        order: TraversalOrder,
    ) -> ApplicationResult<&SimulationLog> {
        self.config = SearchConfig {
            algorithm,
            depth_limit,
            order,
            ..self.config
        };
        self.run()
    }

    /// Snapshot after `cursor` of the last run; the start state without a run.
    pub fn snapshot(&self, cursor: Option<usize>) -> PlaybackSnapshot {
        match &self.log {
            Some(log) => reconstruct(&self.tree, &log.steps, cursor),
            None => PlaybackSnapshot::default(),
        }
    }

    pub fn player(&self) -> Option<Player<'_>> {
        self.log
            .as_ref()
            .map(|log| Player::new(&self.tree, &log.steps))
    }

    pub fn oracle(&self) -> ApplicationResult<OracleReport> {
        Ok(Oracle::evaluate(&self.tree, &self.config)?)
    }

    pub fn grade(&self, answers: &BTreeMap<NodeId, f64>) -> ApplicationResult<Grade> {
        Ok(self.oracle()?.grade(answers))
    }

    pub fn add_child(&mut self, parent: &str) -> ApplicationResult<NodeId> {
        let (tree, id) = TreeEditor::add_child(&self.tree, parent)?;
        self.replace_tree(tree);
        Ok(id)
    }

    pub fn delete_node(&mut self, id: &str) -> ApplicationResult<()> {
        let tree = TreeEditor::delete_node(&self.tree, id)?;
        self.replace_tree(tree);
        Ok(())
    }

    pub fn set_leaf_value(&mut self, id: &str, value: f64) -> ApplicationResult<()> {
        let tree = TreeEditor::set_leaf_value(&self.tree, id, value)?;
        self.replace_tree(tree);
        Ok(())
    }

    /// Swap in a new tree; the old log no longer describes it.
    pub fn replace_tree(&mut self, tree: GameTree) {
        self.layout = layout(&tree, &self.params);
        self.tree = tree;
        self.log = None;
    }
}
