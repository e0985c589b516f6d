//! Read-only queries over a loaded [`Graph`].
//!
//! Every function takes `&Graph` and returns nodes, node sets, path lists or a freshly
//! built subgraph; none of them mutates the queried graph.

pub mod accessors;
pub mod cycles;
pub mod find;
pub mod flatten;
pub mod implicit;
pub mod leaks;
pub mod output;
pub mod paths;
pub mod stats;
pub mod subgraph;

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::graph::edge::EdgeType;
use crate::graph::node::{Node, NodeField, NodeKind, ReverseField};

pub use accessors::{
    defined_files, defined_symbols, dependent_files, dependent_libs, explicit_lib_deps,
    file_deps, find_node, lib_deps_of_file, owning_file, owning_lib, symbol_deps,
};
pub use cycles::detect_cycles;
pub use find::find_nodes;
pub use flatten::{Linkage, flattened_deps};
pub use implicit::{ImplicitCache, implicit_lib_deps};
pub use leaks::symbol_leaks;
pub use paths::link_paths;
pub use stats::{GraphStats, graph_stats};
pub use subgraph::{incoming_subgraph, outgoing_subgraph};

/// A direct relation a caller can ask about a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    DependentLibs,
    DependentFiles,
    DefinedSymbols,
    DefinedFiles,
    FileDeps,
    SymbolDeps,
    ExplicitLibDeps,
    LibDepsOfFile,
    ImplicitLibDeps,
    OwningLib,
    OwningFile,
}

impl Relation {
    /// Operation name used in error messages and output.
    pub fn name(self) -> &'static str {
        match self {
            Relation::DependentLibs => "dependent_libs",
            Relation::DependentFiles => "dependent_files",
            Relation::DefinedSymbols => "defined_symbols",
            Relation::DefinedFiles => "defined_files",
            Relation::FileDeps => "file_deps",
            Relation::SymbolDeps => "symbol_deps",
            Relation::ExplicitLibDeps => "explicit_lib_deps",
            Relation::LibDepsOfFile => "lib_deps_of_file",
            Relation::ImplicitLibDeps => "implicit_lib_deps",
            Relation::OwningLib => "owning_lib",
            Relation::OwningFile => "owning_file",
        }
    }
}

/// How a relation is served for one node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Direct targets of the node under an edge type.
    Outgoing(EdgeType),
    /// Reverse index stored on the node; one inbound edge of this type per member.
    Incoming(ReverseField, EdgeType),
    /// Ids held in a relation field of the node.
    Field(NodeField),
    /// Computed at query time, never stored.
    Derived(EdgeType),
}

/// The kind capability table: which relations each node kind supports, and how.
pub fn capability(kind: NodeKind, relation: Relation) -> Option<Access> {
    use Access::{Derived, Field, Incoming, Outgoing};
    use NodeKind::{Executable, File, Library, Symbol};
    use ReverseField::{DependentFiles, DependentLibs};

    let access = match (relation, kind) {
        (Relation::DependentLibs, Library | Executable) => {
            Incoming(DependentLibs, EdgeType::LibToLib)
        }
        (Relation::DependentLibs, File) => Incoming(DependentLibs, EdgeType::LibToFile),
        (Relation::DependentLibs, Symbol) => Incoming(DependentLibs, EdgeType::LibToSym),

        (Relation::DependentFiles, Library | Executable) => {
            Incoming(DependentFiles, EdgeType::FileToLib)
        }
        (Relation::DependentFiles, File) => Incoming(DependentFiles, EdgeType::FileToFile),
        (Relation::DependentFiles, Symbol) => Incoming(DependentFiles, EdgeType::FileToSym),

        (Relation::DefinedSymbols, Library | File) => Field(NodeField::DefinedSymbols),
        (Relation::DefinedFiles, Library) => Field(NodeField::DefinedFiles),

        (Relation::FileDeps, Library) => Outgoing(EdgeType::LibToFile),
        (Relation::FileDeps, File) => Outgoing(EdgeType::FileToFile),

        (Relation::SymbolDeps, Library) => Outgoing(EdgeType::LibToSym),
        (Relation::SymbolDeps, File) => Outgoing(EdgeType::FileToSym),

        (Relation::ExplicitLibDeps, Library) => Outgoing(EdgeType::LibToLib),
        (Relation::ExplicitLibDeps, Executable) => Outgoing(EdgeType::ExeToLib),

        (Relation::LibDepsOfFile, File) => Outgoing(EdgeType::FileToLib),

        (Relation::ImplicitLibDeps, Library | Executable) => Derived(EdgeType::ImplicitLibToLib),

        (Relation::OwningLib, File) => Field(NodeField::Library),
        (Relation::OwningLib, Symbol) => Field(NodeField::DefiningLibs),
        (Relation::OwningFile, Symbol) => Field(NodeField::DefiningFiles),

        _ => return None,
    };
    Some(access)
}

/// Look up `id` and the access path for `relation`, or the matching error.
pub(crate) fn resolve<'g>(
    graph: &'g Graph,
    id: &str,
    relation: Relation,
) -> Result<(&'g Node, Access)> {
    let node = graph.get_node(id).ok_or_else(|| Error::unknown(id))?;
    let access = capability(node.kind(), relation).ok_or_else(|| Error::WrongKind {
        id: id.to_owned(),
        kind: node.kind(),
        operation: relation.name(),
    })?;
    Ok((node, access))
}

/// Look up the nodes for `ids`, skipping ids without a node, sorted by id.
pub(crate) fn collect_nodes<'g, I, S>(graph: &'g Graph, ids: I) -> Vec<&'g Node>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut nodes: Vec<&Node> = ids
        .into_iter()
        .filter_map(|id| graph.get_node(id.as_ref()))
        .collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));
    nodes.dedup_by(|a, b| a.id == b.id);
    nodes
}
