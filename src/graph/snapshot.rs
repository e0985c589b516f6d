//! Persisted JSON snapshot form of a link graph.
//!
//! The snapshot is produced by build instrumentation. Loading is all-or-nothing: any
//! schema violation yields `Error::MalformedGraph` and no graph.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::Graph;
use super::edge::EdgeType;
use super::node::{ExecutableInfo, FileInfo, LibraryInfo, Node, NodeData, SymbolInfo};

/// Top-level snapshot document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotDocument {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: BTreeMap<EdgeType, BTreeMap<String, BTreeSet<String>>>,
}

/// One node entry, tagged by `kind`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeRecord {
    Library {
        id: String,
        name: String,
        #[serde(default)]
        defined_symbols: BTreeSet<String>,
        #[serde(default)]
        defined_files: BTreeSet<String>,
        #[serde(default)]
        dependent_libs: BTreeSet<String>,
        #[serde(default)]
        dependent_files: BTreeSet<String>,
    },
    File {
        id: String,
        name: String,
        library: String,
        #[serde(default)]
        defined_symbols: BTreeSet<String>,
        #[serde(default)]
        dependent_libs: BTreeSet<String>,
        #[serde(default)]
        dependent_files: BTreeSet<String>,
    },
    Symbol {
        id: String,
        name: String,
        #[serde(default)]
        defining_libs: BTreeSet<String>,
        #[serde(default)]
        defining_files: BTreeSet<String>,
        #[serde(default)]
        dependent_libs: BTreeSet<String>,
        #[serde(default)]
        dependent_files: BTreeSet<String>,
    },
    Executable {
        id: String,
        name: String,
        #[serde(default)]
        dependent_libs: BTreeSet<String>,
        #[serde(default)]
        dependent_files: BTreeSet<String>,
    },
    Artifact {
        id: String,
        name: String,
    },
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        match record {
            NodeRecord::Library {
                id,
                name,
                defined_symbols,
                defined_files,
                dependent_libs,
                dependent_files,
            } => Node::new(
                id,
                name,
                NodeData::Library(LibraryInfo {
                    defined_symbols,
                    defined_files,
                    dependent_libs,
                    dependent_files,
                }),
            ),
            NodeRecord::File {
                id,
                name,
                library,
                defined_symbols,
                dependent_libs,
                dependent_files,
            } => Node::new(
                id,
                name,
                NodeData::File(FileInfo {
                    library,
                    defined_symbols,
                    dependent_libs,
                    dependent_files,
                }),
            ),
            NodeRecord::Symbol {
                id,
                name,
                defining_libs,
                defining_files,
                dependent_libs,
                dependent_files,
            } => Node::new(
                id,
                name,
                NodeData::Symbol(SymbolInfo {
                    defining_libs,
                    defining_files,
                    dependent_libs,
                    dependent_files,
                }),
            ),
            NodeRecord::Executable {
                id,
                name,
                dependent_libs,
                dependent_files,
            } => Node::new(
                id,
                name,
                NodeData::Executable(ExecutableInfo {
                    dependent_libs,
                    dependent_files,
                }),
            ),
            NodeRecord::Artifact { id, name } => Node::new(id, name, NodeData::Artifact),
        }
    }
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        let id = node.id.clone();
        let name = node.name.clone();
        match node.data.clone() {
            NodeData::Library(l) => NodeRecord::Library {
                id,
                name,
                defined_symbols: l.defined_symbols,
                defined_files: l.defined_files,
                dependent_libs: l.dependent_libs,
                dependent_files: l.dependent_files,
            },
            NodeData::File(f) => NodeRecord::File {
                id,
                name,
                library: f.library,
                defined_symbols: f.defined_symbols,
                dependent_libs: f.dependent_libs,
                dependent_files: f.dependent_files,
            },
            NodeData::Symbol(s) => NodeRecord::Symbol {
                id,
                name,
                defining_libs: s.defining_libs,
                defining_files: s.defining_files,
                dependent_libs: s.dependent_libs,
                dependent_files: s.dependent_files,
            },
            NodeData::Executable(e) => NodeRecord::Executable {
                id,
                name,
                dependent_libs: e.dependent_libs,
                dependent_files: e.dependent_files,
            },
            NodeData::Artifact => NodeRecord::Artifact { id, name },
        }
    }
}

impl Graph {
    /// Load and validate a snapshot from disk.
    pub fn load(path: &Path) -> Result<Graph> {
        let file = std::fs::File::open(path).map_err(|source| Error::GraphUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: SnapshotDocument = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| {
                if e.is_io() {
                    Error::GraphUnavailable {
                        path: path.to_path_buf(),
                        source: e.into(),
                    }
                } else {
                    Error::malformed(e.to_string())
                }
            })?;
        let graph = Self::from_document(doc)?;
        tracing::debug!(
            path = %path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "loaded graph snapshot"
        );
        Ok(graph)
    }

    /// Parse and validate a snapshot from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Graph> {
        let doc: SnapshotDocument =
            serde_json::from_reader(reader).map_err(|e| Error::malformed(e.to_string()))?;
        Self::from_document(doc)
    }

    /// Parse and validate a snapshot held in memory.
    pub fn from_json_str(json: &str) -> Result<Graph> {
        let doc: SnapshotDocument =
            serde_json::from_str(json).map_err(|e| Error::malformed(e.to_string()))?;
        Self::from_document(doc)
    }

    /// Build a graph from a parsed document, rejecting duplicates and dangling ids.
    pub fn from_document(doc: SnapshotDocument) -> Result<Graph> {
        let mut graph = Graph::new();
        for record in doc.nodes {
            let node = Node::from(record);
            if graph.contains_node(&node.id) {
                return Err(Error::malformed(format!("duplicate node id '{}'", node.id)));
            }
            graph.insert_node(node);
        }
        for (edge_type, adjacency) in doc.edges {
            for (source, targets) in adjacency {
                graph.insert_edges(edge_type, &source, targets);
            }
        }
        graph.validate()?;
        Ok(graph)
    }

    /// Convert back to the persisted document form.
    pub fn to_document(&self) -> SnapshotDocument {
        SnapshotDocument {
            nodes: self.nodes().map(NodeRecord::from).collect(),
            edges: self
                .edges
                .iter()
                .filter(|(edge_type, _)| edge_type.is_persisted())
                .map(|(edge_type, adj)| (*edge_type, adj.clone()))
                .collect(),
        }
    }

    /// Pretty-printed JSON snapshot.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_document())
            .map_err(|e| Error::malformed(e.to_string()))
    }

    /// Write the snapshot atomically: temp file in the target directory, then rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => std::path::PathBuf::from("."),
        };
        let fail = |e: std::io::Error| Error::write_failed(path, e);
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(fail)?;
        serde_json::to_writer_pretty(&mut tmp, &self.to_document())
            .map_err(|e| Error::write_failed(path, e))?;
        tmp.as_file().flush().map_err(fail)?;
        tmp.persist(path).map_err(|e| Error::write_failed(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "nodes": [
            {"kind": "library", "id": "libA", "name": "A",
             "defined_files": ["a.o"], "dependent_libs": ["app"]},
            {"kind": "library", "id": "libB", "name": "B",
             "defined_symbols": ["s"], "dependent_libs": ["libA"]},
            {"kind": "file", "id": "a.o", "name": "a.o", "library": "libA"},
            {"kind": "symbol", "id": "s", "name": "s",
             "defining_libs": ["libB"], "dependent_libs": ["libA"]},
            {"kind": "executable", "id": "app", "name": "app"}
        ],
        "edges": {
            "lib_to_lib": {"libA": ["libB"]},
            "lib_to_file": {"libA": ["a.o"]},
            "lib_to_sym": {"libA": ["s"]},
            "exe_to_lib": {"app": ["libA"]}
        }
    }"#;

    fn assert_malformed(json: &str) {
        match Graph::from_json_str(json) {
            Err(Error::MalformedGraph { .. }) => {}
            other => panic!("expected MalformedGraph, got {other:?}"),
        }
    }

    #[test]
    fn test_load_sample() {
        let graph = Graph::from_json_str(SAMPLE).unwrap();
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.targets(EdgeType::LibToLib, "libA").unwrap().contains("libB"));
    }

    #[test]
    fn test_roundtrip_preserves_graph() {
        let graph = Graph::from_json_str(SAMPLE).unwrap();
        let json = graph.to_json_string().unwrap();
        let reloaded = Graph::from_json_str(&json).unwrap();
        assert_eq!(graph, reloaded);
    }

    #[test]
    fn test_missing_name_is_malformed() {
        assert_malformed(r#"{"nodes": [{"kind": "library", "id": "libA"}]}"#);
    }

    #[test]
    fn test_file_without_library_is_malformed() {
        assert_malformed(r#"{"nodes": [{"kind": "file", "id": "a.o", "name": "a.o"}]}"#);
    }

    #[test]
    fn test_unknown_kind_is_malformed() {
        assert_malformed(r#"{"nodes": [{"kind": "widget", "id": "w", "name": "w"}]}"#);
    }

    #[test]
    fn test_unknown_edge_type_is_malformed() {
        assert_malformed(
            r#"{"nodes": [{"kind": "library", "id": "libA", "name": "A"}],
                "edges": {"lib_to_widget": {"libA": []}}}"#,
        );
    }

    #[test]
    fn test_persisted_implicit_edges_are_malformed() {
        assert_malformed(
            r#"{"nodes": [{"kind": "library", "id": "libA", "name": "A"},
                          {"kind": "library", "id": "libB", "name": "B"}],
                "edges": {"implicit_lib_to_lib": {"libA": ["libB"]}}}"#,
        );
    }

    #[test]
    fn test_undefined_edge_target_is_malformed() {
        assert_malformed(
            r#"{"nodes": [{"kind": "library", "id": "libA", "name": "A"}],
                "edges": {"lib_to_lib": {"libA": ["libZ"]}}}"#,
        );
    }

    #[test]
    fn test_duplicate_id_is_malformed() {
        assert_malformed(
            r#"{"nodes": [{"kind": "library", "id": "libA", "name": "A"},
                          {"kind": "symbol", "id": "libA", "name": "A"}]}"#,
        );
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = Graph::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::GraphUnavailable { .. }));
    }

    #[test]
    fn test_unreadable_path_is_unavailable() {
        // Opening a directory succeeds on Unix; reading from it fails.
        let dir = tempfile::tempdir().unwrap();
        let err = Graph::load(dir.path()).unwrap_err();
        assert!(
            matches!(err, Error::GraphUnavailable { .. }),
            "expected GraphUnavailable, got {err:?}"
        );
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let graph = Graph::from_json_str(SAMPLE).unwrap();
        let err = graph.save(&dir.path().join("absent").join("graph.json")).unwrap_err();
        assert!(matches!(err, Error::WriteFailed { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libdeps.json");
        let graph = Graph::from_json_str(SAMPLE).unwrap();
        graph.save(&path).unwrap();
        assert_eq!(Graph::load(&path).unwrap(), graph);
    }
}
