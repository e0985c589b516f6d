use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::graph::edge::EdgeType;
use crate::graph::node::ReverseField;

/// Build the subgraph for a direct outgoing relation (`LibToLib`, `FileToSym`, ...).
///
/// - `Err(UnknownNode)`: `source` has no node; callers use this as a plain not-found signal.
/// - `Ok(None)`: `edge_type` has no entry for `source`.
/// - `Ok(Some(g))`: `source` plus its target nodes and the single relation `{source: targets}`.
///
/// Targets without a node in `graph` keep their edge but contribute no node.
pub fn outgoing_subgraph(
    graph: &Graph,
    source: &str,
    edge_type: EdgeType,
) -> Result<Option<Graph>> {
    let source_node = graph.get_node(source).ok_or_else(|| Error::unknown(source))?;

    let Some(targets) = graph.targets(edge_type, source) else {
        return Ok(None);
    };

    let mut sub = Graph::new();
    for id in targets {
        if let Some(node) = graph.get_node(id) {
            sub.insert_node(node.clone());
        }
    }
    sub.insert_node(source_node.clone());
    sub.insert_edges(edge_type, source, targets.iter().cloned());
    Ok(Some(sub))
}

/// Build the subgraph for an incoming relation from the reverse index on `target`.
///
/// Reads the precomputed `field` instead of scanning every edge. `Ok(None)` when the
/// index is empty or the kind carries none; otherwise `target` plus each member, with
/// one `member -> target` edge of `edge_type` per member.
pub fn incoming_subgraph(
    graph: &Graph,
    target: &str,
    field: ReverseField,
    edge_type: EdgeType,
) -> Result<Option<Graph>> {
    let target_node = graph.get_node(target).ok_or_else(|| Error::unknown(target))?;

    let members = match target_node.reverse_index(field) {
        Some(members) if !members.is_empty() => members,
        _ => return Ok(None),
    };

    let mut sub = Graph::new();
    for id in members {
        if let Some(node) = graph.get_node(id) {
            sub.insert_node(node.clone());
        }
        sub.insert_edges(edge_type, id, [target]);
    }
    sub.insert_node(target_node.clone());
    Ok(Some(sub))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;

    fn chain() -> Graph {
        GraphBuilder::new()
            .library("libA")
            .library("libB")
            .library("libC")
            .link("libA", "libB")
            .link("libA", "libC")
            .link("libB", "libC")
            .build()
            .unwrap()
    }

    #[test]
    fn test_outgoing_contains_source_and_targets_only() {
        let graph = chain();
        let sub = outgoing_subgraph(&graph, "libA", EdgeType::LibToLib)
            .unwrap()
            .unwrap();
        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.edge_types().collect::<Vec<_>>(), vec![EdgeType::LibToLib]);
        assert_eq!(sub.targets(EdgeType::LibToLib, "libA").unwrap().len(), 2);
        assert!(sub.targets(EdgeType::LibToLib, "libB").is_none());
    }

    #[test]
    fn test_outgoing_unknown_source() {
        let graph = chain();
        let err = outgoing_subgraph(&graph, "libZ", EdgeType::LibToLib).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_outgoing_without_entry_is_none() {
        let graph = chain();
        assert!(outgoing_subgraph(&graph, "libC", EdgeType::LibToLib)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_incoming_points_members_at_target() {
        let graph = chain();
        let sub = incoming_subgraph(
            &graph,
            "libC",
            ReverseField::DependentLibs,
            EdgeType::LibToLib,
        )
        .unwrap()
        .unwrap();
        assert_eq!(sub.node_count(), 3);
        assert!(sub.targets(EdgeType::LibToLib, "libA").unwrap().contains("libC"));
        assert!(sub.targets(EdgeType::LibToLib, "libB").unwrap().contains("libC"));
    }

    #[test]
    fn test_incoming_empty_index_is_none() {
        let graph = chain();
        assert!(incoming_subgraph(
            &graph,
            "libA",
            ReverseField::DependentLibs,
            EdgeType::LibToLib
        )
        .unwrap()
        .is_none());
    }

    #[test]
    fn test_subgraph_does_not_touch_source_graph() {
        let graph = chain();
        let before = graph.clone();
        let _ = outgoing_subgraph(&graph, "libA", EdgeType::LibToLib).unwrap();
        assert_eq!(graph, before);
    }
}
