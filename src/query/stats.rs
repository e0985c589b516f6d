use std::collections::BTreeMap;

use crate::graph::{Graph, edge::EdgeType, node::{NodeData, NodeKind}};

/// Aggregated statistics derived from a link graph.
#[derive(Debug, serde::Serialize)]
pub struct GraphStats {
    pub libraries: usize,
    pub files: usize,
    pub symbols: usize,
    pub executables: usize,
    pub artifacts: usize,
    /// Edge pair counts per persisted edge type, keyed by snake-case tag.
    pub edges: BTreeMap<&'static str, usize>,
    /// Symbols defined by more than one library.
    pub multiply_defined_symbols: usize,
}

/// Compute statistics from a loaded `Graph`.
pub fn graph_stats(graph: &Graph) -> GraphStats {
    let count = |kind| graph.nodes_of_kind(kind).count();

    let edges: BTreeMap<&'static str, usize> = EdgeType::PERSISTED
        .iter()
        .map(|&edge_type| {
            let pairs = graph
                .edges_of_type(edge_type)
                .values()
                .map(|targets| targets.len())
                .sum::<usize>();
            (edge_type.as_str(), pairs)
        })
        .collect();

    let multiply_defined_symbols = graph
        .nodes()
        .filter(|n| matches!(&n.data, NodeData::Symbol(s) if s.defining_libs.len() > 1))
        .count();

    GraphStats {
        libraries: count(NodeKind::Library),
        files: count(NodeKind::File),
        symbols: count(NodeKind::Symbol),
        executables: count(NodeKind::Executable),
        artifacts: count(NodeKind::Artifact),
        edges,
        multiply_defined_symbols,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;

    #[test]
    fn test_counts() {
        let graph = GraphBuilder::new()
            .executable("app")
            .library("libA")
            .library("libB")
            .file("a.o", "libA")
            .symbol("dup")
            .defines("libA", "dup")
            .defines("libB", "dup")
            .link("app", "libA")
            .link("libA", "libB")
            .build()
            .unwrap();
        let stats = graph_stats(&graph);
        assert_eq!(stats.libraries, 2);
        assert_eq!(stats.files, 1);
        assert_eq!(stats.symbols, 1);
        assert_eq!(stats.executables, 1);
        assert_eq!(stats.edges["lib_to_lib"], 1);
        assert_eq!(stats.edges["exe_to_lib"], 1);
        assert_eq!(stats.edges["lib_to_file"], 1);
        assert_eq!(stats.edges["file_to_sym"], 0);
        assert_eq!(stats.multiply_defined_symbols, 1);
    }
}
