//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::domain::{Algorithm, SearchConfig, TraversalOrder};

/// Step through minimax and alpha-beta search on small game trees
#[derive(Parser, Debug)]
#[command(name = "abtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Local config file layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a random tree
    Generate {
        #[command(flatten)]
        shape: ShapeArgs,
        /// Seed for a reproducible tree
        #[arg(long)]
        seed: Option<u64>,
        /// Write to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Generate a complete tree with every leaf set to 0
    Empty {
        #[command(flatten)]
        shape: ShapeArgs,
        /// Write to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Print a tree file
    Show {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Run a search and print its event log
    Run {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[command(flatten)]
        search: SearchArgs,
        /// Print the log as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the state after a given event
    Snapshot {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Event index; omit for the state before the first event
        index: Option<usize>,
        #[command(flatten)]
        search: SearchArgs,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute node positions
    Layout {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check hand-computed values of internal nodes
    Grade {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Answer as NODE=VALUE, repeatable
        #[arg(short = 'A', long = "answer", value_name = "NODE=VALUE")]
        answers: Vec<String>,
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Edit a tree file in place
    Edit {
        #[command(subcommand)]
        command: EditCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Tree shape; falls back to the `[generator]` config section.
#[derive(Args, Debug, Default)]
pub struct ShapeArgs {
    /// Edges from the root to the leaves
    #[arg(long)]
    pub depth: Option<usize>,
    /// Children per internal node
    #[arg(short, long)]
    pub branching: Option<usize>,
}

/// Run parameters; falls back to the `[search]` config section.
#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// minimax or alpha-beta
    #[arg(short, long)]
    pub algorithm: Option<Algorithm>,
    /// Evaluate nodes at this depth statically
    #[arg(long)]
    pub depth_limit: Option<usize>,
    /// ltr or rtl
    #[arg(long)]
    pub order: Option<TraversalOrder>,
}

impl SearchArgs {
    /// Override `base` with whatever was given on the command line.
    pub fn apply(&self, base: SearchConfig) -> SearchConfig {
        SearchConfig {
            algorithm: self.algorithm.unwrap_or(base.algorithm),
            depth_limit: self.depth_limit.unwrap_or(base.depth_limit),
            order: self.order.unwrap_or(base.order),
            ..base
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum EditCommands {
    /// Append a leaf valued 0 under a node
    AddChild {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        parent: String,
    },

    /// Remove a node and its subtree
    Delete {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        node: String,
    },

    /// Set the value of a leaf
    SetValue {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        node: String,
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print config template
    Template,

    /// Show config paths
    Path,
}
