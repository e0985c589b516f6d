mod cli;
mod config;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ExportQuery, NodeArgs};
use config::DaggerConfig;
use dagger::export::{ExportFormat, export_graph};
use dagger::query::output::{
    OutputFormat, format_node_detail, format_nodes, format_paths, format_stats, format_subgraph,
};
use dagger::query::{self, Linkage};
use dagger::{Error, Graph};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = DaggerConfig::read(Path::new("."));
    let level = cli
        .level
        .map(|l| l.as_str().to_owned())
        .or_else(|| config.as_ref().ok().and_then(|c| c.level.clone()))
        .unwrap_or_else(|| "info".to_owned());
    init_tracing(&level);

    let config = config.unwrap_or_else(|err| {
        tracing::warn!("{err:#}. Using defaults.");
        DaggerConfig::default()
    });

    let snapshot = config.snapshot_path(cli.command.snapshot());
    let use_cache = config.cache.enabled && !cli.no_cache;
    let graph = dagger::cache::load_graph(&snapshot, use_cache)
        .with_context(|| format!("failed to load {}", snapshot.display()))?;
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );

    run(&graph, cli.command, cli.format)
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(graph: &Graph, command: Commands, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Node(NodeArgs { id, .. }) => {
            let node = query::find_node(graph, &id).ok_or(Error::UnknownNode { id })?;
            format_node_detail(node, format);
        }

        Commands::Find {
            pattern,
            case_insensitive,
            kind,
            ..
        } => {
            let nodes = query::find_nodes(graph, &pattern, case_insensitive, &kind)?;
            format_nodes(&nodes, format);
        }

        Commands::DependentLibs(a) => {
            format_subgraph(query::dependent_libs(graph, &a.id)?.as_ref(), format)
        }
        Commands::DependentFiles(a) => {
            format_subgraph(query::dependent_files(graph, &a.id)?.as_ref(), format)
        }
        Commands::FileDeps(a) => format_subgraph(query::file_deps(graph, &a.id)?.as_ref(), format),
        Commands::SymbolDeps(a) => {
            format_subgraph(query::symbol_deps(graph, &a.id)?.as_ref(), format)
        }
        Commands::ExplicitLibDeps(a) => {
            format_subgraph(query::explicit_lib_deps(graph, &a.id)?.as_ref(), format)
        }
        Commands::LibDepsOfFile(a) => {
            format_subgraph(query::lib_deps_of_file(graph, &a.id)?.as_ref(), format)
        }
        Commands::ImplicitLibDeps(a) => {
            format_subgraph(query::implicit_lib_deps(graph, &a.id)?.as_ref(), format)
        }

        Commands::DefinedSymbols(a) => format_nodes(&query::defined_symbols(graph, &a.id)?, format),
        Commands::DefinedFiles(a) => format_nodes(&query::defined_files(graph, &a.id)?, format),
        Commands::OwningLib(a) => format_nodes(&query::owning_lib(graph, &a.id)?, format),
        Commands::OwningFile(a) => format_nodes(&query::owning_file(graph, &a.id)?, format),
        Commands::SymbolLeaks(a) => format_nodes(&query::symbol_leaks(graph, &a.id)?, format),

        Commands::FlattenedDeps { node, implicit } => {
            let linkage = if implicit {
                Linkage::Implicit
            } else {
                Linkage::Explicit
            };
            format_nodes(&query::flattened_deps(graph, &node.id, linkage)?, format);
        }

        Commands::LinkPaths { source, target, .. } => {
            let paths = query::link_paths(graph, &source, &target)?.ok_or_else(|| {
                let missing = if graph.contains_node(&source) { target } else { source };
                Error::UnknownNode { id: missing }
            })?;
            format_paths(&paths, "path", format);
        }

        Commands::Cycles(_) => format_paths(&query::detect_cycles(graph), "cycle", format),

        Commands::Stats(_) => format_stats(&query::graph_stats(graph), format),

        Commands::Export {
            query: relation,
            node,
            dot,
            output,
            ..
        } => {
            let export_format = if dot { ExportFormat::Dot } else { ExportFormat::Json };
            let content = match (relation, node) {
                (Some(relation), Some(id)) => {
                    let sub = export_query(graph, relation, &id)?.unwrap_or_default();
                    export_graph(&sub, export_format)?
                }
                _ => export_graph(graph, export_format)?,
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Exported to {}", path.display());
                }
                None => println!("{}", content.trim_end()),
            }
        }
    }

    Ok(())
}

fn export_query(graph: &Graph, relation: ExportQuery, id: &str) -> dagger::Result<Option<Graph>> {
    match relation {
        ExportQuery::DependentLibs => query::dependent_libs(graph, id),
        ExportQuery::DependentFiles => query::dependent_files(graph, id),
        ExportQuery::FileDeps => query::file_deps(graph, id),
        ExportQuery::SymbolDeps => query::symbol_deps(graph, id),
        ExportQuery::ExplicitLibDeps => query::explicit_lib_deps(graph, id),
        ExportQuery::LibDepsOfFile => query::lib_deps_of_file(graph, id),
        ExportQuery::ImplicitLibDeps => query::implicit_lib_deps(graph, id),
    }
}
