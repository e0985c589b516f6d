use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::graph::edge::EdgeType;
use crate::graph::node::NodeKind;

/// One pending DFS step: the node to enter and the path that led to it.
struct Frame {
    node: String,
    path: Vec<String>,
}

/// Enumerate explicit link paths from `source` to `target`.
///
/// The first hop follows `LibToLib` for a library source and `ExeToLib` for an
/// executable; every later hop follows `LibToLib`. The search is a depth-first walk
/// over an explicit frame stack. Each frame owns its copy of the path, and a single
/// visited set is shared by the whole call, so a node reachable through two
/// branches is only expanded from the first one (diamonds can under-report paths).
///
/// - `Ok(None)`: `source` or `target` is unknown.
/// - `Ok(Some(vec![]))`: `source` has no outgoing explicit edges, unless
///   `source == target`, which yields the single path `[source]`.
pub fn link_paths(graph: &Graph, source: &str, target: &str) -> Result<Option<Vec<Vec<String>>>> {
    let (Some(source_node), Some(_)) = (graph.get_node(source), graph.get_node(target)) else {
        return Ok(None);
    };

    let first_hop = match source_node.kind() {
        NodeKind::Library => EdgeType::LibToLib,
        NodeKind::Executable => EdgeType::ExeToLib,
        kind => {
            return Err(Error::WrongKind {
                id: source.to_owned(),
                kind,
                operation: "link_paths",
            });
        }
    };

    let direct = match graph.targets(first_hop, source) {
        Some(direct) if !direct.is_empty() => direct,
        _ if source == target => return Ok(Some(vec![vec![source.to_owned()]])),
        _ => return Ok(Some(Vec::new())),
    };

    let mut paths = Vec::new();
    let mut visited: HashSet<String> = HashSet::from([source.to_owned()]);
    let mut stack: Vec<Frame> = direct
        .iter()
        .rev()
        .map(|lib| Frame {
            node: lib.clone(),
            path: vec![source.to_owned()],
        })
        .collect();
    while let Some(Frame { node, mut path }) = stack.pop() {
        // Every path entry was expanded once, so the path cannot outgrow the visited set.
        debug_assert!(path.len() <= visited.len(), "path revisits an expanded node");

        if node == target {
            path.push(node);
            paths.push(path);
            continue;
        }
        if visited.contains(&node) {
            continue;
        }
        let Some(children) = graph.targets(EdgeType::LibToLib, &node) else {
            continue;
        };

        visited.insert(node.clone());
        path.push(node);
        for child in children.iter().rev() {
            stack.push(Frame {
                node: child.clone(),
                path: path.clone(),
            });
        }
    }

    Ok(Some(paths))
}
