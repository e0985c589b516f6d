//! Direct relation accessors.
//!
//! Each accessor resolves its access path through the kind capability table, then
//! hands off to the subgraph builder or reads the node's relation field.

use crate::error::Result;
use crate::graph::Graph;
use crate::graph::node::Node;

use super::subgraph::{incoming_subgraph, outgoing_subgraph};
use super::{Access, Relation, collect_nodes, implicit, resolve};

/// Serve a subgraph-valued relation.
fn relation_subgraph(graph: &Graph, id: &str, relation: Relation) -> Result<Option<Graph>> {
    let (_, access) = resolve(graph, id, relation)?;
    match access {
        Access::Outgoing(edge_type) => outgoing_subgraph(graph, id, edge_type),
        Access::Incoming(field, edge_type) => incoming_subgraph(graph, id, field, edge_type),
        Access::Derived(_) => implicit::implicit_lib_deps(graph, id),
        Access::Field(_) => unreachable!("field relations are served by relation_nodes"),
    }
}

/// Serve a node-set-valued relation.
fn relation_nodes<'g>(graph: &'g Graph, id: &str, relation: Relation) -> Result<Vec<&'g Node>> {
    let (node, access) = resolve(graph, id, relation)?;
    let ids = match access {
        Access::Field(field) => node.field_ids(field).unwrap_or_default(),
        _ => unreachable!("{} is not a field relation", relation.name()),
    };
    Ok(collect_nodes(graph, ids))
}

/// Return the node with this id, if any.
pub fn find_node<'g>(graph: &'g Graph, id: &str) -> Option<&'g Node> {
    graph.get_node(id)
}

/// Libraries that depend on the given library, file, symbol or executable.
pub fn dependent_libs(graph: &Graph, id: &str) -> Result<Option<Graph>> {
    relation_subgraph(graph, id, Relation::DependentLibs)
}

/// Files that depend on the given library, file, symbol or executable.
pub fn dependent_files(graph: &Graph, id: &str) -> Result<Option<Graph>> {
    relation_subgraph(graph, id, Relation::DependentFiles)
}

/// Files a library contains, or files a file depends on.
pub fn file_deps(graph: &Graph, id: &str) -> Result<Option<Graph>> {
    relation_subgraph(graph, id, Relation::FileDeps)
}

/// Symbols a library or file references.
pub fn symbol_deps(graph: &Graph, id: &str) -> Result<Option<Graph>> {
    relation_subgraph(graph, id, Relation::SymbolDeps)
}

/// Libraries a library or executable names as explicit link dependencies.
pub fn explicit_lib_deps(graph: &Graph, id: &str) -> Result<Option<Graph>> {
    relation_subgraph(graph, id, Relation::ExplicitLibDeps)
}

/// Libraries a file depends on.
pub fn lib_deps_of_file(graph: &Graph, id: &str) -> Result<Option<Graph>> {
    relation_subgraph(graph, id, Relation::LibDepsOfFile)
}

/// Symbols defined in a library or file.
pub fn defined_symbols<'g>(graph: &'g Graph, id: &str) -> Result<Vec<&'g Node>> {
    relation_nodes(graph, id, Relation::DefinedSymbols)
}

/// Files compiled into a library.
pub fn defined_files<'g>(graph: &'g Graph, id: &str) -> Result<Vec<&'g Node>> {
    relation_nodes(graph, id, Relation::DefinedFiles)
}

/// The library owning a file, or every library defining a symbol (multiply-defined
/// symbols yield more than one).
pub fn owning_lib<'g>(graph: &'g Graph, id: &str) -> Result<Vec<&'g Node>> {
    relation_nodes(graph, id, Relation::OwningLib)
}

/// Every file defining a symbol.
pub fn owning_file<'g>(graph: &'g Graph, symbol_id: &str) -> Result<Vec<&'g Node>> {
    relation_nodes(graph, symbol_id, Relation::OwningFile)
}
