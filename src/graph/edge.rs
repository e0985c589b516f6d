use std::fmt;

use super::node::NodeKind;

/// The type of a directed edge between two nodes in the link graph.
///
/// Each type is a separate relation with fixed endpoint kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Library -> Library: an explicit link dependency.
    LibToLib,
    /// Library -> File: the library contains the file.
    LibToFile,
    /// File -> Library: the file depends on the library.
    FileToLib,
    /// File -> File: the file depends on another file.
    FileToFile,
    /// File -> Symbol: the file references the symbol.
    FileToSym,
    /// Library (or Executable) -> Symbol: the node references the symbol.
    LibToSym,
    /// Executable -> Library: an explicit link dependency of an executable.
    ExeToLib,
    /// Library -> Library inferred from symbol ownership. Never persisted.
    ImplicitLibToLib,
}

impl EdgeType {
    /// Every edge type that may appear in a snapshot.
    pub const PERSISTED: [EdgeType; 7] = [
        EdgeType::LibToLib,
        EdgeType::LibToFile,
        EdgeType::FileToLib,
        EdgeType::FileToFile,
        EdgeType::FileToSym,
        EdgeType::LibToSym,
        EdgeType::ExeToLib,
    ];

    pub fn is_persisted(self) -> bool {
        self != EdgeType::ImplicitLibToLib
    }

    /// Node kinds allowed at the source end.
    pub fn source_kinds(self) -> &'static [NodeKind] {
        match self {
            EdgeType::LibToLib
            | EdgeType::LibToFile
            | EdgeType::ImplicitLibToLib => &[NodeKind::Library],
            EdgeType::LibToSym => &[NodeKind::Library, NodeKind::Executable],
            EdgeType::FileToLib | EdgeType::FileToFile | EdgeType::FileToSym => &[NodeKind::File],
            EdgeType::ExeToLib => &[NodeKind::Executable],
        }
    }

    /// Node kinds allowed at the target end.
    pub fn target_kinds(self) -> &'static [NodeKind] {
        match self {
            EdgeType::LibToLib
            | EdgeType::FileToLib
            | EdgeType::ExeToLib
            | EdgeType::ImplicitLibToLib => &[NodeKind::Library],
            EdgeType::LibToFile | EdgeType::FileToFile => &[NodeKind::File],
            EdgeType::FileToSym | EdgeType::LibToSym => &[NodeKind::Symbol],
        }
    }

    /// Snake-case tag, as used in snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeType::LibToLib => "lib_to_lib",
            EdgeType::LibToFile => "lib_to_file",
            EdgeType::FileToLib => "file_to_lib",
            EdgeType::FileToFile => "file_to_file",
            EdgeType::FileToSym => "file_to_sym",
            EdgeType::LibToSym => "lib_to_sym",
            EdgeType::ExeToLib => "exe_to_lib",
            EdgeType::ImplicitLibToLib => "implicit_lib_to_lib",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_is_not_persisted() {
        assert!(!EdgeType::ImplicitLibToLib.is_persisted());
        assert!(EdgeType::PERSISTED.iter().all(|e| e.is_persisted()));
    }

    #[test]
    fn test_tag_matches_serde_name() {
        for edge in EdgeType::PERSISTED {
            let json = serde_json::to_string(&edge).unwrap();
            assert_eq!(json, format!("\"{}\"", edge.as_str()));
        }
    }

    #[test]
    fn test_exe_to_lib_endpoints() {
        assert_eq!(EdgeType::ExeToLib.source_kinds(), &[NodeKind::Executable]);
        assert_eq!(EdgeType::ExeToLib.target_kinds(), &[NodeKind::Library]);
    }
}
