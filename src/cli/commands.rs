//! Command dispatch

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::{SimulationSession, TreeStore};
use crate::application::ApplicationError;
use crate::cli::args::{
    Cli, Commands, ConfigCommands, EditCommands, SearchArgs, ShapeArgs,
};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::display::annotated;
use crate::domain::{GameTree, NodeId, TreeDisplay};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Commands::Generate {
            shape,
            seed,
            output,
        } => cmd_generate(container, shape, *seed, output.as_deref()),
        Commands::Empty { shape, output } => cmd_empty(container, shape, output.as_deref()),
        Commands::Show { file } => cmd_show(container, file),
        Commands::Run { file, search, json } => cmd_run(container, file, search, *json),
        Commands::Snapshot {
            file,
            index,
            search,
            json,
        } => cmd_snapshot(container, file, *index, search, *json),
        Commands::Layout { file, json } => cmd_layout(container, file, *json),
        Commands::Grade {
            file,
            answers,
            search,
        } => cmd_grade(container, file, answers, search),
        Commands::Edit { command } => cmd_edit(container, command),
        Commands::Config { command } => cmd_config(container, cli.config.as_deref(), command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "abtree", &mut io::stdout());
            Ok(())
        }
    }
}

fn shape(container: &ServiceContainer, args: &ShapeArgs) -> (usize, usize) {
    let defaults = &container.settings.generator;
    (
        args.depth.unwrap_or(defaults.depth),
        args.branching.unwrap_or(defaults.branching),
    )
}

/// Write to `dest`, or print to stdout when absent.
fn emit_tree(container: &ServiceContainer, tree: &GameTree, dest: Option<&Path>) -> CliResult<()> {
    match dest {
        Some(path) => {
            container.tree_store.save(tree, path)?;
            output::action("Wrote", &format!("{} ({} nodes)", path.display(), tree.len()));
        }
        None => write_stdout(&TreeStore::to_json(tree)?)?,
    }
    Ok(())
}

/// Machine-readable output goes straight to stdout, uncolored.
fn write_stdout(text: &str) -> CliResult<()> {
    let mut out = io::stdout().lock();
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|e| InfraError::io("write to stdout", e))?;
    Ok(())
}

fn write_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let mut text = serde_json::to_string_pretty(value).map_err(ApplicationError::from)?;
    text.push('\n');
    write_stdout(&text)
}

#[instrument(level = "debug", skip(container))]
fn cmd_generate(
    container: &ServiceContainer,
    args: &ShapeArgs,
    seed: Option<u64>,
    dest: Option<&Path>,
) -> CliResult<()> {
    let (depth, branching) = shape(container, args);
    let mut settings = container.settings.generator;
    if seed.is_some() {
        settings.seed = seed;
    }
    let mut generator = settings.build().map_err(ApplicationError::from)?;
    let tree = generator
        .random(depth, branching)
        .map_err(ApplicationError::from)?;
    emit_tree(container, &tree, dest)
}

#[instrument(level = "debug", skip(container))]
fn cmd_empty(container: &ServiceContainer, args: &ShapeArgs, dest: Option<&Path>) -> CliResult<()> {
    let (depth, branching) = shape(container, args);
    let generator = container.generator().map_err(ApplicationError::from)?;
    let tree = generator
        .empty(depth, branching)
        .map_err(ApplicationError::from)?;
    emit_tree(container, &tree, dest)
}

fn cmd_show(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let tree = container.tree_store.load(file)?;
    output::info(&tree.to_tree_string());
    Ok(())
}

fn open_session(container: &ServiceContainer, file: &Path, search: &SearchArgs) -> CliResult<SimulationSession> {
    let tree = container.tree_store.load(file)?;
    let config = search.apply(container.settings.search_config());
    debug!("session: {:?}", config);
    Ok(SimulationSession::new(tree, config, container.settings.layout))
}

#[instrument(level = "debug", skip(container))]
fn cmd_run(container: &ServiceContainer, file: &Path, search: &SearchArgs, json: bool) -> CliResult<()> {
    let mut session = open_session(container, file, search)?;
    let log = session.run()?;

    if json {
        return write_json(log);
    }

    output::header(&format!("{} ({})", log.algorithm, log.order));
    for (i, step) in log.steps.iter().enumerate() {
        output::step(i, step);
    }
    println!();
    output::action("Root value", &log.root_value);
    if let Some(best) = &log.best_child {
        output::action("Best move", best);
    }
    output::detail(&format!("{} steps, {} prunes", log.len(), log.prune_count()));
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_snapshot(
    container: &ServiceContainer,
    file: &Path,
    index: Option<usize>,
    search: &SearchArgs,
    json: bool,
) -> CliResult<()> {
    let mut session = open_session(container, file, search)?;
    let total = session.run()?.len();
    if let Some(k) = index.filter(|&k| k >= total) {
        output::warning(&format!("index {k} past the last event, showing {}", total.saturating_sub(1)));
    }
    let snapshot = session.snapshot(index);

    if json {
        return write_json(&snapshot);
    }

    match (snapshot.index, snapshot.kind) {
        (Some(k), Some(kind)) => output::header(&format!("Step {} / {}: {}", k, total.saturating_sub(1), kind)),
        _ => output::header("Start"),
    }
    output::info(&annotated(session.tree(), &snapshot));
    if let Some(text) = &snapshot.explanation {
        output::detail(text);
    }
    Ok(())
}

fn cmd_layout(container: &ServiceContainer, file: &Path, json: bool) -> CliResult<()> {
    let tree = container.tree_store.load(file)?;
    let session = SimulationSession::new(
        tree,
        container.settings.search_config(),
        container.settings.layout,
    );
    let layout = session.layout();

    if json {
        return write_json(layout);
    }

    output::header(&format!("{} x {}", layout.width, layout.height));
    for node in &layout.nodes {
        output::detail(&format!(
            "{:<16} depth={:<2} x={:>8.1} y={:>8.1}",
            node.id.as_str(),
            node.depth,
            node.x,
            node.y
        ));
    }
    Ok(())
}

/// Parse `NODE=VALUE` pairs.
fn parse_answers(raw: &[String]) -> CliResult<BTreeMap<NodeId, f64>> {
    raw.iter()
        .map(|pair| {
            let (node, value) = pair
                .split_once('=')
                .ok_or_else(|| CliError::InvalidArgs(format!("expected NODE=VALUE, got '{pair}'")))?;
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| CliError::InvalidArgs(format!("not a number in '{pair}'")))?;
            Ok((NodeId::new(node.trim()), value))
        })
        .collect()
}

#[instrument(level = "debug", skip(container))]
fn cmd_grade(
    container: &ServiceContainer,
    file: &Path,
    answers: &[String],
    search: &SearchArgs,
) -> CliResult<()> {
    if answers.is_empty() {
        return Err(CliError::Usage("provide at least one --answer NODE=VALUE".into()));
    }
    let answers = parse_answers(answers)?;
    let session = open_session(container, file, search)?;
    let grade = session.grade(&answers)?;

    output::header(&format!("Score: {:.0}%", grade.ratio() * 100.0));
    for node in &grade.correct {
        output::success_detail(node);
    }
    for mistake in &grade.incorrect {
        output::failure(&format!(
            "{}: expected {}, got {}",
            mistake.node, mistake.expected, mistake.given
        ));
    }
    for node in &grade.missing {
        output::detail(&format!("{node}: no answer"));
    }
    if !grade.ignored.is_empty() {
        let ignored: Vec<_> = grade.ignored.iter().map(NodeId::as_str).collect();
        output::warning(&format!("not graded (pruned, leaf or unknown): {}", ignored.join(", ")));
    }
    if grade.is_perfect() {
        output::success("All values correct");
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_edit(container: &ServiceContainer, command: &EditCommands) -> CliResult<()> {
    let file: &PathBuf = match command {
        EditCommands::AddChild { file, .. }
        | EditCommands::Delete { file, .. }
        | EditCommands::SetValue { file, .. } => file,
    };
    let mut session = open_session(container, file, &SearchArgs::default())?;

    match command {
        EditCommands::AddChild { parent, .. } => {
            let id = session.add_child(parent)?;
            let tree = session.tree();
            let ids = tree
                .index_of(id.as_str())
                .map(|idx| tree.path_to(idx))
                .unwrap_or_default();
            let path: Vec<&str> = ids.iter().map(NodeId::as_str).collect();
            output::action("Added", &path.join(" / "));
        }
        EditCommands::Delete { node, .. } => {
            session.delete_node(node)?;
            output::action("Deleted", node);
        }
        EditCommands::SetValue { node, value, .. } => {
            session.set_leaf_value(node, *value)?;
            output::action("Set", &format!("{node} = {value}"));
        }
    }

    container.tree_store.save(session.tree(), file)?;
    Ok(())
}

fn cmd_config(
    container: &ServiceContainer,
    local: Option<&Path>,
    command: &ConfigCommands,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&container.settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let state = if container.fs.exists(&path) { "" } else { " (missing)" };
                    output::action("Global", &format!("{}{state}", path.display()));
                }
                None => output::warning("no config directory for this platform"),
            }
            if let Some(path) = local {
                output::action("Local", &path.display());
            }
        }
    }
    Ok(())
}
