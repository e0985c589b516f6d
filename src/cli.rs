use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use dagger::NodeKind;
use dagger::query::output::OutputFormat;

/// Introspect the library-linking graph of a large C/C++ build.
///
/// dagger loads a JSON snapshot of libraries, files, symbols and executables and answers
/// dependency questions about it: who links whom, which symbols a library needs, how
/// two libraries are connected, and where implicit dependencies form cycles.
#[derive(Parser, Debug)]
#[command(
    name = "dagger",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    /// Log level. Overrides the config file; RUST_LOG overrides both.
    #[arg(long, value_enum, global = true)]
    pub level: Option<LogLevel>,

    /// Always parse the JSON snapshot; neither read nor write the binary cache.
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Compact)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// A node id and the snapshot to query.
#[derive(Args, Debug)]
pub struct NodeArgs {
    /// Node id (e.g. "build/libbase.a").
    pub id: String,

    /// Path to the graph snapshot (default: config `snapshot`, else libdeps.json).
    pub snapshot: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Path to the graph snapshot (default: config `snapshot`, else libdeps.json).
    pub snapshot: Option<PathBuf>,
}

/// Subgraph-valued relations that `export --query` can render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportQuery {
    DependentLibs,
    DependentFiles,
    FileDeps,
    SymbolDeps,
    ExplicitLibDeps,
    LibDepsOfFile,
    ImplicitLibDeps,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show one node with all of its attributes.
    Node(NodeArgs),

    /// Find nodes whose id or name matches a regex.
    Find {
        /// Regex pattern (e.g. "libmongo_.*").
        pattern: String,

        /// Path to the graph snapshot.
        snapshot: Option<PathBuf>,

        /// Case-insensitive pattern matching.
        #[arg(short = 'i', long)]
        case_insensitive: bool,

        /// Filter by node kind (comma-separated: library,file,symbol,executable,artifact).
        #[arg(long, value_enum, value_delimiter = ',')]
        kind: Vec<NodeKind>,
    },

    /// Libraries that depend on a library, file or symbol.
    DependentLibs(NodeArgs),

    /// Files that depend on a library, file or symbol.
    DependentFiles(NodeArgs),

    /// Symbols defined by a library or file.
    DefinedSymbols(NodeArgs),

    /// Files that make up a library.
    DefinedFiles(NodeArgs),

    /// Files a library or file depends on.
    FileDeps(NodeArgs),

    /// Symbols a library or file uses.
    SymbolDeps(NodeArgs),

    /// Libraries a library or executable links explicitly.
    ExplicitLibDeps(NodeArgs),

    /// Libraries a file depends on.
    LibDepsOfFile(NodeArgs),

    /// Libraries that define symbols a library uses (computed, never stored).
    ImplicitLibDeps(NodeArgs),

    /// Library that owns a file, or libraries that define a symbol.
    OwningLib(NodeArgs),

    /// Files that define a symbol.
    OwningFile(NodeArgs),

    /// Transitive closure of a library's or executable's link dependencies.
    FlattenedDeps {
        #[command(flatten)]
        node: NodeArgs,

        /// Follow implicit (symbol-derived) dependencies instead of explicit links.
        #[arg(long)]
        implicit: bool,
    },

    /// Every simple explicit link path from one library or executable to another.
    LinkPaths {
        /// Starting library or executable id.
        source: String,

        /// Target library id.
        target: String,

        /// Path to the graph snapshot.
        snapshot: Option<PathBuf>,
    },

    /// Cycles among implicit library dependencies.
    Cycles(SnapshotArgs),

    /// Symbols a library uses that no direct explicit dependency provides.
    SymbolLeaks(NodeArgs),

    /// Node and edge counts for the whole graph.
    Stats(SnapshotArgs),

    /// Render the graph, or one query's result subgraph, as JSON or DOT.
    Export {
        /// Path to the graph snapshot.
        snapshot: Option<PathBuf>,

        /// Export the result of this relation instead of the whole graph.
        #[arg(long, value_enum, requires = "node")]
        query: Option<ExportQuery>,

        /// Node id the --query relation is asked about.
        #[arg(long)]
        node: Option<String>,

        /// Emit Graphviz DOT instead of snapshot JSON.
        #[arg(long)]
        dot: bool,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    /// The snapshot path given on the command line, if any.
    pub fn snapshot(&self) -> Option<&PathBuf> {
        match self {
            Commands::Node(a)
            | Commands::DependentLibs(a)
            | Commands::DependentFiles(a)
            | Commands::DefinedSymbols(a)
            | Commands::DefinedFiles(a)
            | Commands::FileDeps(a)
            | Commands::SymbolDeps(a)
            | Commands::ExplicitLibDeps(a)
            | Commands::LibDepsOfFile(a)
            | Commands::ImplicitLibDeps(a)
            | Commands::OwningLib(a)
            | Commands::OwningFile(a)
            | Commands::SymbolLeaks(a)
            | Commands::FlattenedDeps { node: a, .. } => a.snapshot.as_ref(),
            Commands::Cycles(a) | Commands::Stats(a) => a.snapshot.as_ref(),
            Commands::Find { snapshot, .. }
            | Commands::LinkPaths { snapshot, .. }
            | Commands::Export { snapshot, .. } => snapshot.as_ref(),
        }
    }
}
