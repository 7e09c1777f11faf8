//! dynpath CLI tool
//!
//! Command-line interface for composing pathway descriptions with dynpathway-core.
//!
//! ## Commands
//!
//! - `compose <file>`: Compose a focus pathway with context pathways and print the result
//! - `filter <file> --entity <name>`: List the pathways that contain an entity
//!
//! Pathways are referred to by name or title, as written in the TOML description.

use clap::{Parser, Subcommand};
use dynpathway_core::{
    compose::PathwayComposer,
    config::{ComposerConfig, CompositionOption, ConfigProvider, TomlConfigProvider},
    pathway::{CommonEntityFilter, PathwayStore},
    properties::{filter_entities_by_name, Pid},
    PathwayError,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dynpath")]
#[command(author, version, about = "A tool for composing biological pathways around a focus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a focus pathway with context pathways
    Compose {
        /// TOML pathway description
        path: PathBuf,

        /// Focus pathway (default: the first pathway of the description)
        #[arg(long)]
        focus_pathway: Option<String>,

        /// Entity whose node becomes the focus
        #[arg(long)]
        focus_entity: Option<String>,

        /// Context pathway, may be repeated
        #[arg(long = "context")]
        contexts: Vec<String>,

        /// Environment radius around the focus (0 shows context pathways in full)
        #[arg(short, long)]
        radius: Option<u32>,

        /// Keep vertices that share an entity apart
        #[arg(long)]
        keep_duplicates: bool,

        /// Only show vertices with at least one edge
        #[arg(long)]
        only_connected: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the composition as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the pathways containing a representation of an entity
    Filter {
        /// TOML pathway description
        path: PathBuf,

        /// Entity name
        #[arg(short, long)]
        entity: String,
    },
}

fn load_store(path: &Path) -> Result<(PathwayStore, Vec<Pid>), PathwayError> {
    let mut store = PathwayStore::new();
    let pids = store.load_toml(&std::fs::read_to_string(path)?)?;
    tracing::info!("loaded {} pathways from {:?}", pids.len(), path);
    Ok((store, pids))
}

fn lookup(store: &PathwayStore, key: &str) -> Result<Pid, PathwayError> {
    store
        .find(key)
        .map(|graph| graph.pid())
        .ok_or_else(|| PathwayError::NotFound(format!("no pathway named '{key}'")))
}

#[allow(clippy::too_many_arguments)]
fn compose(
    path: PathBuf,
    focus_pathway: Option<String>,
    focus_entity: Option<String>,
    contexts: Vec<String>,
    radius: Option<u32>,
    keep_duplicates: bool,
    only_connected: bool,
    config: Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut composer_config = match config {
        Some(config_path) => TomlConfigProvider::new(config_path).get_config()?,
        None => ComposerConfig::default(),
    };
    if let Some(radius) = radius {
        composer_config.environment_radius = radius;
    }
    if keep_duplicates {
        composer_config.set_option(CompositionOption::RemoveDuplicateVertices, false);
    }
    if only_connected {
        composer_config.set_option(CompositionOption::DisplayOnlyVerticesWithEdges, true);
    }

    let (store, pids) = load_store(&path)?;
    let focus = match focus_pathway {
        Some(key) => lookup(&store, &key)?,
        None => *pids
            .first()
            .ok_or_else(|| PathwayError::NotFound(format!("{path:?} holds no pathways")))?,
    };
    let contexts = contexts
        .iter()
        .map(|key| lookup(&store, key))
        .collect::<Result<Vec<Pid>, PathwayError>>()?;

    let mut composer = PathwayComposer::new(store, composer_config);
    composer.add_pathway(focus)?;
    if let Some(entity) = focus_entity {
        composer.focus_on_entity(&entity)?;
    }
    for pid in contexts {
        composer.add_pathway(pid)?;
    }

    let composition = composer.composition();
    if json {
        let summary = serde_json::json!({
            "config": composer.config(),
            "focus": composer.focus_node().map(|node| node.nid),
            "pathways": composition.displayed().iter().map(|shown| serde_json::json!({
                "pid": shown.graph.pid(),
                "title": shown.graph.title(),
                "role": shown.role,
                "derived_from": shown.graph.derived_from(),
                "could_not_focus": shown.could_not_focus,
            })).collect::<Vec<_>>(),
            "nodes": composition.nodes(),
            "edges": composition.edges(),
            "unresolved": composition.unresolved(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for shown in composition.displayed() {
        let note = if shown.could_not_focus {
            " (could not be focused)"
        } else {
            ""
        };
        println!("{:?} '{}'{note}", shown.role, shown.graph.title());
    }
    println!(
        "{} nodes, {} edges",
        composition.nodes().len(),
        composition.edges().len()
    );
    for node in composition.nodes() {
        let names: Vec<String> = filter_entities_by_name(&node.entities)
            .into_iter()
            .map(|entity| entity.display_name)
            .collect();
        let marker = if node.is_merged { "*" } else { " " };
        println!("{marker} {node}: {}", names.join(", "));
    }
    for edge in composition.edges() {
        let label = |nid| {
            composition
                .node(nid)
                .map(|node| node.label().to_string())
                .unwrap_or_default()
        };
        println!("  {} -> {}", label(&edge.source), label(&edge.target));
    }
    for missing in composition.unresolved() {
        eprintln!(
            "Warning: no node for '{}', edge {} skipped",
            missing.entity, missing.eid
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compose {
            path,
            focus_pathway,
            focus_entity,
            contexts,
            radius,
            keep_duplicates,
            only_connected,
            config,
            json,
        } => compose(
            path,
            focus_pathway,
            focus_entity,
            contexts,
            radius,
            keep_duplicates,
            only_connected,
            config,
            json,
        ),
        Commands::Filter { path, entity } => {
            let (store, _) = load_store(&path)?;
            let Some(entity) = store.entity(&entity).cloned() else {
                eprintln!("Error: unknown entity '{entity}'");
                std::process::exit(1);
            };
            let filter = CommonEntityFilter::new(&store, &[entity], std::iter::empty());
            for graph in filter.apply(&store) {
                println!("{}\t{}", graph.meta().name, graph.title());
            }
            Ok(())
        }
    }
}
