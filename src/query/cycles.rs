use std::collections::{BTreeSet, HashSet};

use rayon::prelude::*;

use crate::graph::Graph;
use crate::graph::node::NodeKind;

use super::flatten::closure;
use super::implicit::ImplicitCache;

/// Detect implicit-dependency cycles between libraries.
///
/// For each library whose implicit closure contains itself, a depth-first search over
/// the implicit relation (seeded at that library) reports the first walk that revisits
/// a node already on its own path. Only closed walks `[X, ..., X]` are kept, and
/// rotations of the same cycle are reported once, starting at the smallest id.
///
/// Implicit targets are memoized for the duration of this call only.
pub fn detect_cycles(graph: &Graph) -> Vec<Vec<String>> {
    let libraries: Vec<&str> = graph
        .nodes_of_kind(NodeKind::Library)
        .map(|n| n.id.as_str())
        .collect();

    let cache = ImplicitCache::new(graph);

    // Closure checks run in parallel and share one memo of implicit targets.
    let cyclic: Vec<&str> = libraries
        .par_iter()
        .filter(|lib| closure(lib, |id| cache.targets(id)).0.contains(**lib))
        .copied()
        .collect();

    tracing::debug!(
        libraries = libraries.len(),
        cyclic = cyclic.len(),
        "checked implicit closures"
    );

    let mut cycles: BTreeSet<Vec<String>> = BTreeSet::new();
    for lib in cyclic {
        if let Some(walk) = first_repeating_walk(&cache, lib) {
            if walk.first() == walk.last() {
                cycles.insert(canonical_rotation(walk));
            }
        }
    }
    cycles.into_iter().collect()
}

/// Depth-first search over the implicit relation from `start`, returning the first
/// walk that reaches a node already on its own path, with that node appended.
///
/// Each frame carries its own path, so a node is only "visited" relative to its own
/// ancestors. Path entries are distinct, so a path never outgrows the set of ids seen.
fn first_repeating_walk(cache: &ImplicitCache<'_>, start: &str) -> Option<Vec<String>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut stack: Vec<(String, Vec<String>)> = vec![(start.to_owned(), Vec::new())];

    while let Some((node, mut path)) = stack.pop() {
        if path.contains(&node) {
            path.push(node);
            return Some(path);
        }
        seen.insert(node.clone());
        debug_assert!(path.len() < seen.len(), "walk repeats a node on its own path");

        let Some(deps) = cache.targets(&node) else {
            continue;
        };
        path.push(node);
        for dep in deps.iter().rev() {
            stack.push((dep.clone(), path.clone()));
        }
    }
    None
}

/// Rotate a closed walk `[X, ..., X]` so it starts and ends at its smallest id.
fn canonical_rotation(mut walk: Vec<String>) -> Vec<String> {
    walk.pop();
    let Some(min_pos) = walk
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
    else {
        return walk;
    };
    walk.rotate_left(min_pos);
    if let Some(first) = walk.first().cloned() {
        walk.push(first);
    }
    walk
}
