use std::fmt::{self, Write};

use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::graph::Graph;
use crate::graph::edge::EdgeType;
use crate::graph::node::NodeKind;

use super::to_petgraph;

/// Escape a string for use inside a double-quoted DOT attribute.
pub fn escape_dot_label(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// DOT fillcolor for a node kind. `None` is an edge endpoint with no node record.
fn kind_fillcolor(kind: Option<NodeKind>) -> &'static str {
    match kind {
        Some(NodeKind::Library) => "#AED6F1",
        Some(NodeKind::File) => "#A9DFBF",
        Some(NodeKind::Symbol) => "#F9E79F",
        Some(NodeKind::Executable) => "#F1948A",
        Some(NodeKind::Artifact) => "#D7BDE2",
        None => "#EAECEE",
    }
}

fn edge_style(edge_type: EdgeType) -> &'static str {
    match edge_type {
        EdgeType::LibToLib | EdgeType::ExeToLib => "style=solid",
        EdgeType::ImplicitLibToLib => "style=dashed color=red",
        EdgeType::LibToFile => "style=dotted arrowhead=odiamond",
        EdgeType::FileToLib | EdgeType::FileToFile => "style=solid color=darkgreen",
        EdgeType::FileToSym | EdgeType::LibToSym => "style=dotted color=gray40",
    }
}

/// Render `graph` as a Graphviz digraph.
///
/// Vertices are labelled with the node's display name and colored by kind; edges are
/// labelled with their edge-type tag.
pub fn render_dot(graph: &Graph) -> Result<String, fmt::Error> {
    let projected = to_petgraph(graph);
    let mut out = String::new();
    writeln!(out, "digraph dagger {{")?;
    writeln!(out, "    rankdir=LR;")?;
    writeln!(out, "    node [shape=box style=filled fontname=monospace];")?;

    for idx in projected.graph.node_indices() {
        let id = &projected.graph[idx];
        let node = graph.get_node(id);
        let label = node.map_or(id.as_str(), |n| n.name.as_str());
        write!(
            out,
            "    n{} [label=\"{}\" tooltip=\"{}\" fillcolor=\"{}\"",
            idx.index(),
            escape_dot_label(label),
            escape_dot_label(id),
            kind_fillcolor(node.map(|n| n.kind())),
        )?;
        if node.is_none() {
            write!(out, " color=gray60 fontcolor=gray40")?;
        }
        writeln!(out, "];")?;
    }

    for edge in projected.graph.edge_references() {
        let edge_type = *edge.weight();
        writeln!(
            out,
            "    n{} -> n{} [label=\"{}\" {}];",
            edge.source().index(),
            edge.target().index(),
            edge_type,
            edge_style(edge_type),
        )?;
    }

    writeln!(out, "}}")?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;

    #[test]
    fn test_escape_dot_label() {
        assert_eq!(escape_dot_label(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(escape_dot_label("plain"), "plain");
    }

    #[test]
    fn test_render_dot_structure() {
        let graph = GraphBuilder::new()
            .executable("app")
            .library("libA")
            .link("app", "libA")
            .build()
            .unwrap();
        let dot = render_dot(&graph).unwrap();
        assert!(dot.starts_with("digraph dagger {"));
        assert!(dot.trim_end().ends_with('}'));
        assert!(dot.contains("label=\"libA\""));
        assert!(dot.contains("label=\"exe_to_lib\""));
        assert_eq!(dot.matches(" -> ").count(), 1);
    }

    #[test]
    fn test_missing_endpoint_rendered_grey() {
        let mut partial = Graph::new();
        partial.insert_edges(EdgeType::ImplicitLibToLib, "X", ["Y"]);
        let dot = render_dot(&partial).unwrap();
        assert!(dot.contains("fontcolor=gray40"));
        assert!(dot.contains("implicit_lib_to_lib"));
    }
}
