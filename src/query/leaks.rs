use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::graph::edge::EdgeType;
use crate::graph::node::{Node, NodeData, NodeKind};

use super::collect_nodes;

/// Symbols `library` uses but neither defines itself nor gets from a direct explicit
/// dependency.
///
/// Only one `LibToLib` hop is considered. Symbols no file defines are ignored, since
/// an unresolvable reference cannot point at a missing link dependency.
pub fn symbol_leaks<'g>(graph: &'g Graph, library: &str) -> Result<Vec<&'g Node>> {
    let node = graph.get_node(library).ok_or_else(|| Error::unknown(library))?;
    if node.kind() != NodeKind::Library {
        return Err(Error::WrongKind {
            id: library.to_owned(),
            kind: node.kind(),
            operation: "symbol_leaks",
        });
    }

    let Some(used) = graph.targets(EdgeType::LibToSym, library) else {
        return Ok(Vec::new());
    };

    let mut available: BTreeSet<&str> = node.defined_symbols().map(String::as_str).collect();
    for dep in graph.targets(EdgeType::LibToLib, library).into_iter().flatten() {
        if let Some(dep_node) = graph.get_node(dep) {
            available.extend(dep_node.defined_symbols().map(String::as_str));
        }
    }

    let leaked = used.iter().filter(|symbol| {
        !available.contains(symbol.as_str()) && is_defined_by_some_file(graph, symbol)
    });
    Ok(collect_nodes(graph, leaked))
}

fn is_defined_by_some_file(graph: &Graph, symbol: &str) -> bool {
    matches!(
        graph.get_node(symbol).map(|n| &n.data),
        Some(NodeData::Symbol(info)) if !info.defining_files.is_empty()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;

    fn ids(nodes: Vec<&Node>) -> Vec<String> {
        nodes.into_iter().map(|n| n.id.clone()).collect()
    }

    /// A -> B -> C explicitly; symbols are defined by files so they count.
    fn layered() -> GraphBuilder {
        GraphBuilder::new()
            .library("A")
            .library("B")
            .library("C")
            .file("a.o", "A")
            .file("b.o", "B")
            .file("c.o", "C")
            .symbol("own")
            .symbol("from_b")
            .symbol("from_c")
            .defines("a.o", "own")
            .defines("b.o", "from_b")
            .defines("c.o", "from_c")
            .link("A", "B")
            .link("B", "C")
    }

    #[test]
    fn test_direct_dependency_covers_symbol() {
        let graph = layered()
            .uses("A", "own")
            .uses("A", "from_b")
            .build()
            .unwrap();
        assert!(symbol_leaks(&graph, "A").unwrap().is_empty());
    }

    #[test]
    fn test_transitive_only_symbol_leaks() {
        let graph = layered().uses("A", "from_c").build().unwrap();
        assert_eq!(ids(symbol_leaks(&graph, "A").unwrap()), vec!["from_c"]);
    }

    #[test]
    fn test_unresolvable_symbols_are_ignored() {
        let graph = layered()
            .symbol("synthetic")
            .uses("A", "synthetic")
            .build()
            .unwrap();
        assert!(symbol_leaks(&graph, "A").unwrap().is_empty());
    }

    #[test]
    fn test_shared_symbol_scenario() {
        // A -> B; B and C define s; A uses s. B covers it.
        let graph = GraphBuilder::new()
            .library("A")
            .library("B")
            .library("C")
            .file("b.o", "B")
            .file("c.o", "C")
            .symbol("s")
            .link("A", "B")
            .defines("b.o", "s")
            .defines("c.o", "s")
            .uses("A", "s")
            .build()
            .unwrap();
        assert!(symbol_leaks(&graph, "A").unwrap().is_empty());
    }

    #[test]
    fn test_query_leaves_graph_untouched() {
        let graph = layered().uses("A", "from_c").build().unwrap();
        let before = graph.clone();
        symbol_leaks(&graph, "A").unwrap();
        assert_eq!(graph, before);
    }

    #[test]
    fn test_errors() {
        let graph = layered().build().unwrap();
        assert!(symbol_leaks(&graph, "Z").unwrap_err().is_not_found());
        assert!(matches!(
            symbol_leaks(&graph, "a.o"),
            Err(Error::WrongKind { .. })
        ));
        assert!(symbol_leaks(&graph, "C").unwrap().is_empty());
    }
}
