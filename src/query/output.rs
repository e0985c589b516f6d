use std::io::IsTerminal;

use crate::graph::Graph;
use crate::graph::node::{Node, NodeData};
use crate::graph::snapshot::NodeRecord;
use crate::query::stats::GraphStats;

/// Output format for query results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Compact one-line-per-result format (default).
    #[default]
    Compact,
    /// Human-readable columnar table with optional ANSI color when stdout is a terminal.
    Table,
    /// Structured JSON suitable for programmatic consumption.
    Json,
}

fn bold(s: &str) -> String {
    if std::io::stdout().is_terminal() {
        format!("\x1b[1m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

fn print_json(value: &impl serde::Serialize) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// ---------------------------------------------------------------------------
// Node output
// ---------------------------------------------------------------------------

/// Format and print a set of nodes.
pub fn format_nodes(nodes: &[&Node], format: OutputFormat) {
    match format {
        OutputFormat::Compact => {
            for n in nodes {
                println!("{} {}", n.kind(), n.id);
            }
            println!("{} nodes", nodes.len());
        }

        OutputFormat::Table => {
            let id_w = nodes.iter().map(|n| n.id.len()).max().unwrap_or(2).max(2);
            let name_w = nodes.iter().map(|n| n.name.len()).max().unwrap_or(4).max(4);

            println!(
                "{}",
                bold(&format!(
                    "{:<10}  {:<id_w$}  {:<name_w$}",
                    "KIND",
                    "ID",
                    "NAME",
                    id_w = id_w,
                    name_w = name_w,
                ))
            );
            println!("{}", "-".repeat(id_w + name_w + 14));
            for n in nodes {
                println!(
                    "{:<10}  {:<id_w$}  {:<name_w$}",
                    n.kind().as_str(),
                    n.id,
                    n.name,
                    id_w = id_w,
                    name_w = name_w,
                );
            }
        }

        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = nodes
                .iter()
                .map(|n| {
                    serde_json::json!({
                        "id": n.id,
                        "name": n.name,
                        "kind": n.kind().as_str(),
                    })
                })
                .collect();
            print_json(&json);
        }
    }
}

/// Format and print every attribute of one node.
pub fn format_node_detail(node: &Node, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_json(&NodeRecord::from(node));
        return;
    }

    let fields: Vec<(&str, Vec<&String>)> = match &node.data {
        NodeData::Library(l) => vec![
            ("defined_symbols", l.defined_symbols.iter().collect()),
            ("defined_files", l.defined_files.iter().collect()),
            ("dependent_libs", l.dependent_libs.iter().collect()),
            ("dependent_files", l.dependent_files.iter().collect()),
        ],
        NodeData::File(f) => vec![
            ("library", vec![&f.library]),
            ("defined_symbols", f.defined_symbols.iter().collect()),
            ("dependent_libs", f.dependent_libs.iter().collect()),
            ("dependent_files", f.dependent_files.iter().collect()),
        ],
        NodeData::Symbol(s) => vec![
            ("defining_libs", s.defining_libs.iter().collect()),
            ("defining_files", s.defining_files.iter().collect()),
            ("dependent_libs", s.dependent_libs.iter().collect()),
            ("dependent_files", s.dependent_files.iter().collect()),
        ],
        NodeData::Executable(e) => vec![
            ("dependent_libs", e.dependent_libs.iter().collect()),
            ("dependent_files", e.dependent_files.iter().collect()),
        ],
        NodeData::Artifact => Vec::new(),
    };

    println!("{} {}", bold("id:"), node.id);
    println!("{} {}", bold("name:"), node.name);
    println!("{} {}", bold("kind:"), node.kind());
    for (label, ids) in fields {
        println!("{} ({})", bold(&format!("{label}:")), ids.len());
        for id in ids {
            println!("  {id}");
        }
    }
}

// ---------------------------------------------------------------------------
// Subgraph output
// ---------------------------------------------------------------------------

/// Format and print a result subgraph. `None` prints an empty result.
pub fn format_subgraph(sub: Option<&Graph>, format: OutputFormat) {
    let edges: Vec<(&str, &str, &str)> = sub
        .map(|g| {
            g.edge_types()
                .flat_map(move |edge_type| {
                    g.edges_of_type(edge_type).iter().flat_map(move |(src, targets)| {
                        targets
                            .iter()
                            .map(move |tgt| (edge_type.as_str(), src.as_str(), tgt.as_str()))
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    match format {
        OutputFormat::Compact => {
            for (edge_type, src, tgt) in &edges {
                println!("{edge_type} {src} -> {tgt}");
            }
            println!("{} edges", edges.len());
        }

        OutputFormat::Table => {
            let src_w = edges.iter().map(|e| e.1.len()).max().unwrap_or(6).max(6);
            println!(
                "{}",
                bold(&format!("{:<20}  {:<src_w$}  {}", "EDGE", "SOURCE", "TARGET", src_w = src_w))
            );
            println!("{}", "-".repeat(src_w + 32));
            for (edge_type, src, tgt) in &edges {
                println!("{:<20}  {:<src_w$}  {}", edge_type, src, tgt, src_w = src_w);
            }
        }

        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = edges
                .iter()
                .map(|(edge_type, src, tgt)| {
                    serde_json::json!({ "type": edge_type, "source": src, "target": tgt })
                })
                .collect();
            print_json(&json);
        }
    }
}

// ---------------------------------------------------------------------------
// Paths and cycles output
// ---------------------------------------------------------------------------

/// Format and print link paths, or cycles when `label` is "cycle".
pub fn format_paths(paths: &[Vec<String>], label: &str, format: OutputFormat) {
    match format {
        OutputFormat::Compact => {
            for path in paths {
                println!("{label} {}", path.join(" -> "));
            }
            println!("{} {label}s found", paths.len());
        }

        OutputFormat::Table => {
            for (i, path) in paths.iter().enumerate() {
                println!("{}", bold(&format!("=== {} {} ===", capitalize(label), i + 1)));
                for id in path {
                    println!("  {id}");
                }
                println!();
            }
            println!("{} {label}s found", paths.len());
        }

        OutputFormat::Json => print_json(&paths),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Stats output
// ---------------------------------------------------------------------------

/// Format and print graph statistics.
pub fn format_stats(stats: &GraphStats, format: OutputFormat) {
    match format {
        OutputFormat::Compact => {
            println!(
                "libraries {} files {} symbols {} executables {} artifacts {}",
                stats.libraries, stats.files, stats.symbols, stats.executables, stats.artifacts,
            );
            let edges: Vec<String> = stats
                .edges
                .iter()
                .map(|(edge_type, n)| format!("{edge_type} {n}"))
                .collect();
            println!("{}", edges.join(" "));
            println!("multiply_defined_symbols {}", stats.multiply_defined_symbols);
        }

        OutputFormat::Table => {
            println!("{}", bold("=== Graph Overview ==="));
            println!("Libraries:    {}", stats.libraries);
            println!("Files:        {}", stats.files);
            println!("Symbols:      {}", stats.symbols);
            println!("Executables:  {}", stats.executables);
            println!("Artifacts:    {}", stats.artifacts);
            println!();
            println!("{}", bold("--- Edges ---"));
            for (edge_type, n) in &stats.edges {
                println!("  {:<14}{}", edge_type, n);
            }
            println!();
            println!("Multiply-defined symbols: {}", stats.multiply_defined_symbols);
        }

        OutputFormat::Json => print_json(stats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("cycle"), "Cycle");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_format_deserializes_lowercase() {
        let f: OutputFormat = serde_json::from_str("\"table\"").unwrap();
        assert_eq!(f, OutputFormat::Table);
    }
}
