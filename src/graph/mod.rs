pub mod builder;
pub mod edge;
pub mod node;
pub mod snapshot;

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

use edge::EdgeType;
use node::{Node, NodeKind};

/// Adjacency relation for one edge type: source id -> target ids.
pub type Adjacency = BTreeMap<String, BTreeSet<String>>;

static EMPTY_ADJACENCY: Adjacency = BTreeMap::new();

/// The in-memory link graph: nodes keyed by id plus one adjacency map per edge type.
///
/// A loaded graph is never mutated by queries. Query results are new, usually partial,
/// `Graph` instances that only carry the nodes needed to render one relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Graph {
    nodes: BTreeMap<String, Node>,
    edges: BTreeMap<EdgeType, Adjacency>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a node by id. Absence is a normal outcome.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// The adjacency relation for `edge_type`, empty if no edges of that type exist.
    ///
    /// A missing source key means "no outgoing edges of this type".
    pub fn edges_of_type(&self, edge_type: EdgeType) -> &Adjacency {
        self.edges.get(&edge_type).unwrap_or(&EMPTY_ADJACENCY)
    }

    /// Direct targets of `source` under `edge_type`, if the relation has an entry for it.
    pub fn targets(&self, edge_type: EdgeType, source: &str) -> Option<&BTreeSet<String>> {
        self.edges.get(&edge_type).and_then(|adj| adj.get(source))
    }

    /// All nodes, ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All nodes of one kind, ordered by id.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.kind() == kind)
    }

    /// Edge types that have at least one source entry.
    pub fn edge_types(&self) -> impl Iterator<Item = EdgeType> + '_ {
        self.edges
            .iter()
            .filter(|(_, adj)| !adj.is_empty())
            .map(|(edge_type, _)| *edge_type)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of individual (source, target) pairs across all edge types.
    pub fn edge_count(&self) -> usize {
        self.edges
            .values()
            .flat_map(|adj| adj.values())
            .map(BTreeSet::len)
            .sum()
    }

    /// Insert a node, replacing any node with the same id.
    pub fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Add `targets` to the relation entry for `source`, creating it (possibly empty).
    pub fn insert_edges<I, S>(&mut self, edge_type: EdgeType, source: &str, targets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edges
            .entry(edge_type)
            .or_default()
            .entry(source.to_owned())
            .or_default()
            .extend(targets.into_iter().map(Into::into));
    }

    /// Check the fully-loaded invariants: every referenced id has a node, edge endpoints
    /// have the kinds their edge type requires, and no derived relation is stored.
    pub fn validate(&self) -> Result<()> {
        for (edge_type, adjacency) in &self.edges {
            if !edge_type.is_persisted() {
                return Err(Error::malformed(format!(
                    "edge type '{edge_type}' is derived and cannot be stored"
                )));
            }
            for (source, targets) in adjacency {
                self.check_endpoint(*edge_type, source, edge_type.source_kinds(), "source")?;
                for target in targets {
                    self.check_endpoint(*edge_type, target, edge_type.target_kinds(), "target")?;
                }
            }
        }

        for node in self.nodes.values() {
            if let Some(missing) = node
                .referenced_ids()
                .into_iter()
                .find(|id| !self.nodes.contains_key(*id))
            {
                return Err(Error::malformed(format!(
                    "node '{}' references undefined id '{missing}'",
                    node.id
                )));
            }
        }

        Ok(())
    }

    fn check_endpoint(
        &self,
        edge_type: EdgeType,
        id: &str,
        allowed: &[NodeKind],
        end: &str,
    ) -> Result<()> {
        let Some(node) = self.nodes.get(id) else {
            return Err(Error::malformed(format!(
                "{edge_type} edge {end} '{id}' is not a defined node"
            )));
        };
        if !allowed.contains(&node.kind()) {
            return Err(Error::malformed(format!(
                "{edge_type} edge {end} '{id}' is a {}, expected {}",
                node.kind(),
                allowed
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(" or ")
            )));
        }
        Ok(())
    }
}
