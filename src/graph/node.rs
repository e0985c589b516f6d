use std::collections::BTreeSet;
use std::fmt;

/// The closed set of node kinds in a link graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
    clap::ValueEnum,
)]
pub enum NodeKind {
    /// A static or shared library.
    Library,
    /// A source/object file compiled into a library.
    File,
    /// A linker symbol (usually a mangled name).
    Symbol,
    /// A linked executable.
    Executable,
    /// Reserved for build artifacts; no query currently supports it.
    Artifact,
}

impl NodeKind {
    /// Lowercase tag used in snapshots and output.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Library => "library",
            NodeKind::File => "file",
            NodeKind::Symbol => "symbol",
            NodeKind::Executable => "executable",
            NodeKind::Artifact => "artifact",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relations carried by a library node.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LibraryInfo {
    pub defined_symbols: BTreeSet<String>,
    pub defined_files: BTreeSet<String>,
    /// Libraries and executables naming this library as an explicit dependency.
    pub dependent_libs: BTreeSet<String>,
    /// Files that depend on this library.
    pub dependent_files: BTreeSet<String>,
}

/// Relations carried by a file node.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileInfo {
    /// The single library this file is compiled into.
    pub library: String,
    pub defined_symbols: BTreeSet<String>,
    pub dependent_libs: BTreeSet<String>,
    pub dependent_files: BTreeSet<String>,
}

/// Relations carried by a symbol node.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SymbolInfo {
    /// More than one entry means the symbol is multiply defined.
    pub defining_libs: BTreeSet<String>,
    pub defining_files: BTreeSet<String>,
    pub dependent_libs: BTreeSet<String>,
    pub dependent_files: BTreeSet<String>,
}

/// Relations carried by an executable node.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExecutableInfo {
    pub dependent_libs: BTreeSet<String>,
    pub dependent_files: BTreeSet<String>,
}

/// Kind-specific payload of a node.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NodeData {
    Library(LibraryInfo),
    File(FileInfo),
    Symbol(SymbolInfo),
    Executable(ExecutableInfo),
    Artifact,
}

/// Which reverse index an incoming-edge query reads off the target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReverseField {
    DependentLibs,
    DependentFiles,
}

/// A forward relation field stored on the node itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeField {
    DefinedSymbols,
    DefinedFiles,
    /// The owning library of a file (a single id).
    Library,
    DefiningLibs,
    DefiningFiles,
}

/// A node in the link graph: a library, file, symbol or executable.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    /// Stable identifier (a path or a mangled name).
    pub id: String,
    /// Display name.
    pub name: String,
    pub data: NodeData,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, data: NodeData) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Library(_) => NodeKind::Library,
            NodeData::File(_) => NodeKind::File,
            NodeData::Symbol(_) => NodeKind::Symbol,
            NodeData::Executable(_) => NodeKind::Executable,
            NodeData::Artifact => NodeKind::Artifact,
        }
    }

    /// Read a reverse index. `None` when this kind carries no such index.
    pub fn reverse_index(&self, field: ReverseField) -> Option<&BTreeSet<String>> {
        match (&self.data, field) {
            (NodeData::Library(l), ReverseField::DependentLibs) => Some(&l.dependent_libs),
            (NodeData::Library(l), ReverseField::DependentFiles) => Some(&l.dependent_files),
            (NodeData::File(f), ReverseField::DependentLibs) => Some(&f.dependent_libs),
            (NodeData::File(f), ReverseField::DependentFiles) => Some(&f.dependent_files),
            (NodeData::Symbol(s), ReverseField::DependentLibs) => Some(&s.dependent_libs),
            (NodeData::Symbol(s), ReverseField::DependentFiles) => Some(&s.dependent_files),
            (NodeData::Executable(e), ReverseField::DependentLibs) => Some(&e.dependent_libs),
            (NodeData::Executable(e), ReverseField::DependentFiles) => Some(&e.dependent_files),
            (NodeData::Artifact, _) => None,
        }
    }

    /// Ids stored in a forward relation field. `None` when this kind has no such field.
    pub fn field_ids(&self, field: NodeField) -> Option<Vec<&str>> {
        let set = match (&self.data, field) {
            (NodeData::Library(l), NodeField::DefinedSymbols) => &l.defined_symbols,
            (NodeData::Library(l), NodeField::DefinedFiles) => &l.defined_files,
            (NodeData::File(f), NodeField::DefinedSymbols) => &f.defined_symbols,
            (NodeData::File(f), NodeField::Library) => return Some(vec![f.library.as_str()]),
            (NodeData::Symbol(s), NodeField::DefiningLibs) => &s.defining_libs,
            (NodeData::Symbol(s), NodeField::DefiningFiles) => &s.defining_files,
            _ => return None,
        };
        Some(set.iter().map(String::as_str).collect())
    }

    /// Symbols this node defines; empty for kinds that define none.
    pub fn defined_symbols(&self) -> impl Iterator<Item = &String> {
        let set = match &self.data {
            NodeData::Library(l) => Some(&l.defined_symbols),
            NodeData::File(f) => Some(&f.defined_symbols),
            _ => None,
        };
        set.into_iter().flatten()
    }

    /// Every id this node references through its relation fields.
    pub fn referenced_ids(&self) -> Vec<&str> {
        let sets: Vec<&BTreeSet<String>> = match &self.data {
            NodeData::Library(l) => vec![
                &l.defined_symbols,
                &l.defined_files,
                &l.dependent_libs,
                &l.dependent_files,
            ],
            NodeData::File(f) => vec![&f.defined_symbols, &f.dependent_libs, &f.dependent_files],
            NodeData::Symbol(s) => vec![
                &s.defining_libs,
                &s.defining_files,
                &s.dependent_libs,
                &s.dependent_files,
            ],
            NodeData::Executable(e) => vec![&e.dependent_libs, &e.dependent_files],
            NodeData::Artifact => Vec::new(),
        };
        let mut ids: Vec<&str> = sets.into_iter().flatten().map(String::as_str).collect();
        if let NodeData::File(ref f) = self.data {
            ids.push(f.library.as_str());
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_kind_matches_payload() {
        let lib = Node::new("libA", "A", NodeData::Library(LibraryInfo::default()));
        let exe = Node::new("app", "app", NodeData::Executable(ExecutableInfo::default()));
        assert_eq!(lib.kind(), NodeKind::Library);
        assert_eq!(exe.kind(), NodeKind::Executable);
        assert_eq!(Node::new("x", "x", NodeData::Artifact).kind(), NodeKind::Artifact);
    }

    #[test]
    fn test_executable_has_no_defined_symbols_field() {
        let exe = Node::new("app", "app", NodeData::Executable(ExecutableInfo::default()));
        assert!(exe.field_ids(NodeField::DefinedSymbols).is_none());
        assert_eq!(exe.defined_symbols().count(), 0);
    }

    #[test]
    fn test_file_library_field_is_single_id() {
        let file = Node::new(
            "a.o",
            "a.o",
            NodeData::File(FileInfo {
                library: "libA".into(),
                ..FileInfo::default()
            }),
        );
        assert_eq!(file.field_ids(NodeField::Library), Some(vec!["libA"]));
    }

    #[test]
    fn test_referenced_ids_cover_all_fields() {
        let sym = Node::new(
            "s",
            "s",
            NodeData::Symbol(SymbolInfo {
                defining_libs: set(&["libA", "libB"]),
                defining_files: set(&["a.o"]),
                ..SymbolInfo::default()
            }),
        );
        let ids = sym.referenced_ids();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&"a.o"));
    }

    #[test]
    fn test_artifact_has_no_reverse_index() {
        let art = Node::new("x", "x", NodeData::Artifact);
        assert!(art.reverse_index(ReverseField::DependentLibs).is_none());
    }
}
