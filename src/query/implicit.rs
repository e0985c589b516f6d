use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use crate::error::Result;
use crate::graph::Graph;
use crate::graph::edge::EdgeType;
use crate::graph::node::NodeData;

use super::{Relation, resolve};

/// Libraries that actually provide the symbols `id` references, excluding `id` itself.
///
/// Walks `LibToSym` from `id` and collects each symbol's `defining_libs`. Symbols
/// without a node are skipped. Returns `None` when nothing remains. No kind check.
pub fn implicit_targets(graph: &Graph, id: &str) -> Option<BTreeSet<String>> {
    let symbols = graph.targets(EdgeType::LibToSym, id)?;

    let mut deps = BTreeSet::new();
    for symbol in symbols {
        if let Some(NodeData::Symbol(info)) = graph.get_node(symbol).map(|n| &n.data) {
            deps.extend(info.defining_libs.iter().filter(|lib| *lib != id).cloned());
        }
    }

    if deps.is_empty() { None } else { Some(deps) }
}

/// Derive the implicit library dependencies of a library or executable.
///
/// The result is a subgraph holding the node, its implicit dependencies and one
/// `ImplicitLibToLib` record. `Ok(None)` when the node references no symbols or every
/// referenced symbol resolves only to the node itself.
pub fn implicit_lib_deps(graph: &Graph, id: &str) -> Result<Option<Graph>> {
    let (node, _) = resolve(graph, id, Relation::ImplicitLibDeps)?;

    let Some(deps) = implicit_targets(graph, id) else {
        return Ok(None);
    };

    let mut sub = Graph::new();
    for dep in &deps {
        if let Some(dep_node) = graph.get_node(dep) {
            sub.insert_node(dep_node.clone());
        }
    }
    sub.insert_node(node.clone());
    sub.insert_edges(EdgeType::ImplicitLibToLib, id, deps);
    Ok(Some(sub))
}

/// Memoized implicit targets for one graph.
///
/// The cache borrows the graph it was built for, so it cannot outlive that graph or be
/// reused against a reloaded one. It is `Sync`: rayon workers in `detect_cycles` share
/// one instance.
pub struct ImplicitCache<'g> {
    graph: &'g Graph,
    memo: Mutex<HashMap<String, Option<BTreeSet<String>>>>,
}

impl<'g> ImplicitCache<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Same result as [`implicit_targets`], computed at most once per id.
    pub fn targets(&self, id: &str) -> Option<BTreeSet<String>> {
        if let Ok(memo) = self.memo.lock() {
            if let Some(cached) = memo.get(id) {
                return cached.clone();
            }
        }
        let computed = implicit_targets(self.graph, id);
        if let Ok(mut memo) = self.memo.lock() {
            memo.insert(id.to_owned(), computed.clone());
        }
        computed
    }
}
