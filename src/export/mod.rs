//! Rendering of a [`Graph`] (usually a query result subgraph) for external tools.

pub mod dot;

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::graph::Graph;
use crate::graph::edge::EdgeType;

pub use dot::render_dot;

/// Output format for graph export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    /// Snapshot JSON, loadable again with `Graph::load` (default).
    #[default]
    Json,
    /// Graphviz DOT.
    Dot,
}

/// petgraph projection of a link graph. Node weights are node ids.
pub struct LinkGraph {
    pub graph: StableDiGraph<String, EdgeType>,
    pub index: HashMap<String, NodeIndex>,
}

impl LinkGraph {
    fn node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_owned());
        self.index.insert(id.to_owned(), idx);
        idx
    }
}

/// Project `graph` into a petgraph `StableDiGraph`.
///
/// Every node becomes a vertex, in id order. Edge endpoints without a node (possible
/// in partial result subgraphs) get a vertex of their own.
pub fn to_petgraph(graph: &Graph) -> LinkGraph {
    let mut out = LinkGraph {
        graph: StableDiGraph::new(),
        index: HashMap::new(),
    };
    for node in graph.nodes() {
        out.node(&node.id);
    }
    for edge_type in graph.edge_types() {
        for (source, targets) in graph.edges_of_type(edge_type) {
            let src = out.node(source);
            for target in targets {
                let tgt = out.node(target);
                out.graph.add_edge(src, tgt, edge_type);
            }
        }
    }
    out
}

/// Serialize `graph` as snapshot JSON. Derived `implicit_lib_to_lib` edges are not
/// part of the snapshot format and are left out.
pub fn render_json(graph: &Graph) -> crate::Result<String> {
    graph.to_json_string()
}

/// Render `graph` in the requested format.
pub fn export_graph(graph: &Graph, format: ExportFormat) -> crate::Result<String> {
    let content = match format {
        ExportFormat::Json => render_json(graph)?,
        ExportFormat::Dot => render_dot(graph)?,
    };
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        ?format,
        "exported graph"
    );
    Ok(content)
}
