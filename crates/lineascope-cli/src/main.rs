use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use lineascope_core::{ChangeStatus, Config};
use lineascope_engine::{build, ColumnLineageGraph, LineageGraph, TraversalBudget};
use lineascope_snapshot::Snapshot;

/// Lineascope - lineage diff for transformation projects
#[derive(Parser)]
#[command(name = "lineascope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: lineascope.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff two snapshots and summarize node-level changes
    Diff {
        /// Base snapshot JSON
        #[arg(long)]
        base: PathBuf,

        /// Current snapshot JSON
        #[arg(long)]
        current: PathBuf,

        /// Write the changed subgraph as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show everything impacted by the modified nodes
    Impact {
        /// Base snapshot JSON
        #[arg(long)]
        base: PathBuf,

        /// Current snapshot JSON
        #[arg(long)]
        current: PathBuf,

        /// Restrict to the impact of one node id
        #[arg(long)]
        select: Option<String>,
    },

    /// Column-level lineage for one (table, column) selection
    ColumnLineage {
        /// Base snapshot JSON
        #[arg(long)]
        base: PathBuf,

        /// Current snapshot JSON
        #[arg(long)]
        current: PathBuf,

        /// Table node id
        #[arg(long)]
        table: String,

        /// Column name
        #[arg(long)]
        column: String,
    },
}

/// Node-level diff summary written with `--output`
#[derive(Serialize)]
struct DiffReport<'a> {
    added: Vec<&'a str>,
    removed: Vec<&'a str>,
    modified: Vec<&'a str>,
    impacted: Vec<String>,
    changed_subgraph: LineageGraph,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Diff {
            base,
            current,
            output,
        } => run_diff(&base, &current, output.as_deref(), &config),
        Commands::Impact {
            base,
            current,
            select,
        } => run_impact(&base, &current, select.as_deref(), &config),
        Commands::ColumnLineage {
            base,
            current,
            table,
            column,
        } => run_column_lineage(&base, &current, &table, &column, &config),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => {
            let default_path = Path::new("lineascope.toml");
            if default_path.exists() {
                Ok(Config::from_file(default_path)?)
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn load_graph(base: &Path, current: &Path, config: &Config) -> Result<LineageGraph> {
    let base = Snapshot::from_file(base)
        .with_context(|| format!("loading base snapshot {}", base.display()))?;
    let current = Snapshot::from_file(current)
        .with_context(|| format!("loading current snapshot {}", current.display()))?;

    Ok(build(&base, &current, config)?)
}

fn run_diff(base: &Path, current: &Path, output: Option<&Path>, config: &Config) -> Result<()> {
    let graph = load_graph(base, current, config)?;

    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut modified = Vec::new();

    for node in graph.nodes.values() {
        match node.change_status {
            ChangeStatus::Added => added.push(node.id.as_str()),
            ChangeStatus::Removed => removed.push(node.id.as_str()),
            ChangeStatus::Modified => modified.push(node.id.as_str()),
            ChangeStatus::Unchanged => {}
        }
    }
    added.sort();
    removed.sort();
    modified.sort();

    println!("{}", "Lineage diff".bold());
    println!(
        "  {} nodes, {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );
    print_id_list("added", &added, |s| s.green());
    print_id_list("removed", &removed, |s| s.red());
    print_id_list("modified", &modified, |s| s.yellow());

    let impacted = impacted_ids(&graph, &graph.modified_set, config);
    println!(
        "  {} {} node(s) impacted by the change-set",
        "impact:".bold(),
        impacted.len()
    );

    if let Some(path) = output {
        let report = DiffReport {
            added,
            removed,
            modified,
            impacted,
            changed_subgraph: graph.changed_subgraph(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn run_impact(base: &Path, current: &Path, select: Option<&str>, config: &Config) -> Result<()> {
    let graph = load_graph(base, current, config)?;

    let seeds: HashSet<String> = match select {
        Some(id) => {
            anyhow::ensure!(
                graph.get_node(id).is_some(),
                "node '{id}' not found in the merged graph"
            );
            HashSet::from([id.to_string()])
        }
        None => graph.modified_set.clone(),
    };

    let impacted = impacted_ids(&graph, &seeds, config);

    if impacted.is_empty() {
        println!("{}", "No impacted nodes.".green());
        return Ok(());
    }

    println!("{} ({} nodes)", "Impacted".bold(), impacted.len());
    for id in &impacted {
        let marker = if seeds.contains(id) { "*" } else { " " };
        println!("  {marker} {id}");
    }

    Ok(())
}

fn run_column_lineage(
    base: &Path,
    current: &Path,
    table: &str,
    column: &str,
    config: &Config,
) -> Result<()> {
    let graph = load_graph(base, current, config)?;
    let cll = ColumnLineageGraph::build(&graph, table, column)?;

    println!("{} {}", "Column lineage for".bold(), cll.selected);

    let mut columns: Vec<_> = cll.nodes.values().collect();
    columns.sort_by(|a, b| a.id.cmp(&b.id));

    for node in columns {
        let status = match node.change_status {
            ChangeStatus::Added => node.change_status.to_string().green(),
            ChangeStatus::Removed => node.change_status.to_string().red(),
            ChangeStatus::Modified => node.change_status.to_string().yellow(),
            ChangeStatus::Unchanged => node.change_status.to_string().normal(),
        };
        println!(
            "  {} [{}] {}",
            node.id,
            node.transformation,
            status
        );
    }

    for flag in &cll.flags {
        println!("  {} {:?}", "warning:".yellow().bold(), flag);
    }

    Ok(())
}

/// Sorted impact set for a seed set, honoring the configured traversal
/// budget; partial or cycle-tainted results are reported on stderr.
fn impacted_ids(graph: &LineageGraph, seeds: &HashSet<String>, config: &Config) -> Vec<String> {
    let Some(max_visits) = config.traversal_budget else {
        return sorted(graph.impacted_by(seeds));
    };

    let result = graph.impacted_by_bounded(seeds, TraversalBudget { max_visits });
    if result.budget_exceeded {
        eprintln!(
            "{} traversal budget ({max_visits}) exhausted; the impact list is partial",
            "warning:".yellow().bold()
        );
    }
    if result.cycle_detected {
        eprintln!(
            "{} dependency cycle detected; lineage over this slice is unreliable",
            "warning:".yellow().bold()
        );
    }
    sorted(result.nodes)
}

fn print_id_list(label: &str, ids: &[&str], paint: fn(&str) -> colored::ColoredString) {
    if ids.is_empty() {
        return;
    }
    println!("  {} ({})", paint(label).bold(), ids.len());
    for id in ids {
        println!("    {}", paint(id));
    }
}

fn sorted(set: HashSet<String>) -> Vec<String> {
    let mut ids: Vec<String> = set.into_iter().collect();
    ids.sort();
    ids
}
