use std::collections::{BTreeSet, HashSet};

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::graph::edge::EdgeType;
use crate::graph::node::{Node, NodeKind};

use super::collect_nodes;
use super::implicit::implicit_targets;

/// Which library-to-library relation a transitive closure follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    /// Stored link dependencies: `LibToLib`, or `ExeToLib` out of an executable.
    Explicit,
    /// Dependencies derived from symbol ownership, recomputed per visited node.
    Implicit,
}

impl Linkage {
    pub fn edge_type(self) -> EdgeType {
        match self {
            Linkage::Explicit => EdgeType::LibToLib,
            Linkage::Implicit => EdgeType::ImplicitLibToLib,
        }
    }

    /// Direct dependencies of `id` under this linkage.
    pub(crate) fn children(self, graph: &Graph, id: &str) -> Option<BTreeSet<String>> {
        match self {
            Linkage::Explicit => {
                let edge_type = match graph.get_node(id).map(Node::kind) {
                    Some(NodeKind::Executable) => EdgeType::ExeToLib,
                    _ => EdgeType::LibToLib,
                };
                graph.targets(edge_type, id).cloned()
            }
            Linkage::Implicit => implicit_targets(graph, id),
        }
    }
}

/// Transitive closure of `root` under `linkage`, breadth-first by rounds.
///
/// Each round expands only nodes discovered for the first time, so every node is
/// expanded at most once and cycles terminate. The root is part of the result only
/// when a cycle leads back to it. Only libraries and executables have link
/// dependencies; other kinds are `WrongKind`.
pub fn flattened_deps<'g>(graph: &'g Graph, root: &str, linkage: Linkage) -> Result<Vec<&'g Node>> {
    let node = graph.get_node(root).ok_or_else(|| Error::unknown(root))?;
    if !matches!(node.kind(), NodeKind::Library | NodeKind::Executable) {
        return Err(Error::WrongKind {
            id: root.to_owned(),
            kind: node.kind(),
            operation: "flattened_deps",
        });
    }

    let (reached, rounds) = closure(root, |id| linkage.children(graph, id));
    tracing::debug!(root, ?linkage, rounds, reached = reached.len(), "flattened dependencies");
    Ok(collect_nodes(graph, &reached))
}

/// Ids reachable from `root` through `children`, and the number of BFS rounds taken.
pub(crate) fn closure<F>(root: &str, mut children: F) -> (BTreeSet<String>, usize)
where
    F: FnMut(&str) -> Option<BTreeSet<String>>,
{
    let mut reached: BTreeSet<String> = BTreeSet::new();
    let mut visited: HashSet<String> = HashSet::from([root.to_owned()]);
    let mut frontier: Vec<String> = vec![root.to_owned()];
    let mut rounds = 0usize;

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for id in &frontier {
            let Some(deps) = children(id) else {
                continue;
            };
            for child in deps {
                reached.insert(child.clone());
                if visited.insert(child.clone()) {
                    next.push(child);
                }
            }
        }
        frontier = next;
        rounds += 1;
    }
    (reached, rounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;

    fn ids(nodes: Vec<&Node>) -> Vec<String> {
        nodes.into_iter().map(|n| n.id.clone()).collect()
    }

    #[test]
    fn test_explicit_chain() {
        let graph = GraphBuilder::new()
            .library("A")
            .library("B")
            .library("C")
            .link("A", "B")
            .link("B", "C")
            .build()
            .unwrap();
        let deps = flattened_deps(&graph, "A", Linkage::Explicit).unwrap();
        assert_eq!(ids(deps), vec!["B", "C"]);
    }

    #[test]
    fn test_root_excluded_without_cycle() {
        let graph = GraphBuilder::new()
            .library("A")
            .library("B")
            .link("A", "B")
            .build()
            .unwrap();
        let deps = ids(flattened_deps(&graph, "A", Linkage::Explicit).unwrap());
        assert!(!deps.contains(&"A".to_owned()));
    }

    #[test]
    fn test_root_included_through_cycle() {
        let graph = GraphBuilder::new()
            .library("A")
            .library("B")
            .library("C")
            .link("A", "B")
            .link("B", "C")
            .link("C", "A")
            .build()
            .unwrap();
        let deps = ids(flattened_deps(&graph, "A", Linkage::Explicit).unwrap());
        assert_eq!(deps, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_executable_root_follows_exe_to_lib() {
        let graph = GraphBuilder::new()
            .executable("app")
            .library("A")
            .library("B")
            .link("app", "A")
            .link("A", "B")
            .build()
            .unwrap();
        let deps = ids(flattened_deps(&graph, "app", Linkage::Explicit).unwrap());
        assert_eq!(deps, vec!["A", "B"]);
    }

    #[test]
    fn test_implicit_closure() {
        // A uses a (defined by B); B uses b (defined by C).
        let graph = GraphBuilder::new()
            .library("A")
            .library("B")
            .library("C")
            .symbol("a")
            .symbol("b")
            .defines("B", "a")
            .defines("C", "b")
            .uses("A", "a")
            .uses("B", "b")
            .build()
            .unwrap();
        let deps = ids(flattened_deps(&graph, "A", Linkage::Implicit).unwrap());
        assert_eq!(deps, vec!["B", "C"]);
        assert!(flattened_deps(&graph, "C", Linkage::Implicit).unwrap().is_empty());
    }

    #[test]
    fn test_non_linkable_root_is_wrong_kind() {
        let graph = GraphBuilder::new()
            .library("A")
            .file("a.o", "A")
            .symbol("s")
            .artifact("out.tar")
            .build()
            .unwrap();
        for id in ["a.o", "s", "out.tar"] {
            for linkage in [Linkage::Explicit, Linkage::Implicit] {
                assert!(matches!(
                    flattened_deps(&graph, id, linkage),
                    Err(Error::WrongKind { operation: "flattened_deps", .. })
                ));
            }
        }
    }

    #[test]
    fn test_unknown_root() {
        let graph = Graph::new();
        assert!(flattened_deps(&graph, "A", Linkage::Explicit)
            .unwrap_err()
            .is_not_found());
    }
}
