pub mod envelope;

use std::path::Path;

use crate::error::Result;
use crate::graph::Graph;

use envelope::{load_cache, save_cache, snapshot_meta};

/// Load a snapshot, reusing the binary cache beside it when it is still fresh.
///
/// Cache problems never fail the load: a stale, corrupt or unwritable cache only
/// costs a JSON parse.
pub fn load_graph(snapshot: &Path, use_cache: bool) -> Result<Graph> {
    if !use_cache {
        return Graph::load(snapshot);
    }

    let meta = snapshot_meta(snapshot);
    if let Some(meta) = &meta {
        if let Some(envelope) = load_cache(snapshot) {
            if &envelope.snapshot_meta == meta {
                tracing::debug!(path = %snapshot.display(), "using cached graph");
                return Ok(envelope.graph);
            }
            tracing::debug!(path = %snapshot.display(), "graph cache is stale");
        }
    }

    let graph = Graph::load(snapshot)?;
    if let Some(meta) = meta {
        if let Err(err) = save_cache(snapshot, meta, &graph) {
            tracing::warn!("failed to write graph cache: {err}");
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;

    #[test]
    fn test_load_graph_writes_then_reuses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("libdeps.json");
        let graph = GraphBuilder::new()
            .library("libA")
            .library("libB")
            .link("libA", "libB")
            .build()
            .unwrap();
        graph.save(&snapshot).unwrap();

        let first = load_graph(&snapshot, true).unwrap();
        assert!(envelope::cache_path(&snapshot).exists());
        let second = load_graph(&snapshot, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_cache_skips_cache_file() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("libdeps.json");
        GraphBuilder::new().library("libA").build().unwrap().save(&snapshot).unwrap();

        load_graph(&snapshot, false).unwrap();
        assert!(!envelope::cache_path(&snapshot).exists());
    }
}
