//! Programmatic graph construction that keeps reverse indices consistent.
//!
//! Snapshots produced by build instrumentation already carry every reverse index. This
//! builder is for callers (and tests) that assemble a graph by hand: each relation
//! method records the forward edge and the matching node fields in one step.

use crate::error::Result;

use super::Graph;
use super::edge::EdgeType;
use super::node::{ExecutableInfo, FileInfo, LibraryInfo, Node, NodeData, SymbolInfo};

/// Incrementally assembles a fully-linked [`Graph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn library(mut self, id: &str) -> Self {
        self.graph
            .insert_node(Node::new(id, id, NodeData::Library(LibraryInfo::default())));
        self
    }

    pub fn executable(mut self, id: &str) -> Self {
        self.graph.insert_node(Node::new(
            id,
            id,
            NodeData::Executable(ExecutableInfo::default()),
        ));
        self
    }

    pub fn symbol(mut self, id: &str) -> Self {
        self.graph
            .insert_node(Node::new(id, id, NodeData::Symbol(SymbolInfo::default())));
        self
    }

    pub fn artifact(mut self, id: &str) -> Self {
        self.graph.insert_node(Node::new(id, id, NodeData::Artifact));
        self
    }

    /// Add a file compiled into `library`, recording the `LibToFile` edge and
    /// the library's `defined_files`.
    pub fn file(mut self, id: &str, library: &str) -> Self {
        self.graph.insert_node(Node::new(
            id,
            id,
            NodeData::File(FileInfo {
                library: library.to_owned(),
                ..FileInfo::default()
            }),
        ));
        self.graph.insert_edges(EdgeType::LibToFile, library, [id]);
        self.with_node(library, |data| {
            if let NodeData::Library(l) = data {
                l.defined_files.insert(id.to_owned());
            }
        });
        self.with_node(id, |data| {
            if let NodeData::File(f) = data {
                f.dependent_libs.insert(library.to_owned());
            }
        });
        self
    }

    /// Explicit link dependency from a library or executable onto a library.
    pub fn link(mut self, from: &str, to: &str) -> Self {
        let edge_type = match self.graph.get_node(from).map(Node::kind) {
            Some(super::node::NodeKind::Executable) => EdgeType::ExeToLib,
            _ => EdgeType::LibToLib,
        };
        self.graph.insert_edges(edge_type, from, [to]);
        self.with_node(to, |data| {
            if let NodeData::Library(l) = data {
                l.dependent_libs.insert(from.to_owned());
            }
        });
        self
    }

    /// `definer` (a library or a file) defines `symbol`. A file definition also
    /// counts as a definition by the file's library.
    pub fn defines(mut self, definer: &str, symbol: &str) -> Self {
        let owning_lib = match self.graph.get_node(definer).map(|n| &n.data) {
            Some(NodeData::File(f)) => Some(f.library.clone()),
            _ => None,
        };
        self.with_node(definer, |data| match data {
            NodeData::Library(l) => {
                l.defined_symbols.insert(symbol.to_owned());
            }
            NodeData::File(f) => {
                f.defined_symbols.insert(symbol.to_owned());
            }
            _ => {}
        });
        let is_file = owning_lib.is_some();
        self.with_node(symbol, |data| {
            if let NodeData::Symbol(s) = data {
                if is_file {
                    s.defining_files.insert(definer.to_owned());
                } else {
                    s.defining_libs.insert(definer.to_owned());
                }
            }
        });
        if let Some(lib) = owning_lib {
            return self.defines(&lib, symbol);
        }
        self
    }

    /// A library or executable references `symbol` (`LibToSym`).
    pub fn uses(mut self, user: &str, symbol: &str) -> Self {
        self.graph.insert_edges(EdgeType::LibToSym, user, [symbol]);
        self.with_node(symbol, |data| {
            if let NodeData::Symbol(s) = data {
                s.dependent_libs.insert(user.to_owned());
            }
        });
        self
    }

    /// A file references `symbol` (`FileToSym`).
    pub fn file_uses(mut self, file: &str, symbol: &str) -> Self {
        self.graph.insert_edges(EdgeType::FileToSym, file, [symbol]);
        self.with_node(symbol, |data| {
            if let NodeData::Symbol(s) = data {
                s.dependent_files.insert(file.to_owned());
            }
        });
        self
    }

    /// A file depends on another file (`FileToFile`).
    pub fn file_depends(mut self, from: &str, to: &str) -> Self {
        self.graph.insert_edges(EdgeType::FileToFile, from, [to]);
        self.with_node(to, |data| {
            if let NodeData::File(f) = data {
                f.dependent_files.insert(from.to_owned());
            }
        });
        self
    }

    /// A file depends on a library (`FileToLib`).
    pub fn file_links(mut self, file: &str, library: &str) -> Self {
        self.graph.insert_edges(EdgeType::FileToLib, file, [library]);
        self.with_node(library, |data| {
            if let NodeData::Library(l) = data {
                l.dependent_files.insert(file.to_owned());
            }
        });
        self
    }

    /// Validate and return the graph.
    pub fn build(self) -> Result<Graph> {
        self.graph.validate()?;
        Ok(self.graph)
    }

    fn with_node(&mut self, id: &str, f: impl FnOnce(&mut NodeData)) {
        if let Some(mut node) = self.graph.nodes.remove(id) {
            f(&mut node.data);
            self.graph.insert_node(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_records_reverse_index() {
        let graph = GraphBuilder::new()
            .library("libA")
            .library("libB")
            .link("libA", "libB")
            .build()
            .unwrap();
        let NodeData::Library(ref b) = graph.get_node("libB").unwrap().data else {
            panic!("libB should be a library");
        };
        assert!(b.dependent_libs.contains("libA"));
    }

    #[test]
    fn test_exe_link_uses_exe_to_lib() {
        let graph = GraphBuilder::new()
            .executable("app")
            .library("libA")
            .link("app", "libA")
            .build()
            .unwrap();
        assert!(graph.targets(EdgeType::ExeToLib, "app").is_some());
        assert!(graph.targets(EdgeType::LibToLib, "app").is_none());
    }

    #[test]
    fn test_file_definition_propagates_to_library() {
        let graph = GraphBuilder::new()
            .library("libA")
            .file("a.o", "libA")
            .symbol("s")
            .defines("a.o", "s")
            .build()
            .unwrap();
        let NodeData::Symbol(ref s) = graph.get_node("s").unwrap().data else {
            panic!("s should be a symbol");
        };
        assert!(s.defining_files.contains("a.o"));
        assert!(s.defining_libs.contains("libA"));
    }

    #[test]
    fn test_dangling_relation_fails_build() {
        let result = GraphBuilder::new().library("libA").link("libA", "libMissing").build();
        assert!(result.is_err());
    }
}
