//! Error types for graph loading and queries.
//!
//! Load errors (`MalformedGraph`, `GraphUnavailable`) are fatal to the load attempt and
//! never leave a partial graph behind. Query errors split into "not found"
//! (`UnknownNode`, a normal outcome callers are expected to check) and caller mistakes
//! (`WrongKind`, an operation invoked on a node kind that does not support it).

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::graph::node::NodeKind;

/// Result type for dagger operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the graph store and the query engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The snapshot was readable but violates the schema.
    #[error("malformed graph snapshot: {reason}")]
    MalformedGraph { reason: String },

    /// The snapshot could not be read at all.
    #[error("graph snapshot {} is unavailable: {source}", path.display())]
    GraphUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No node with this id exists in the queried graph.
    #[error("unknown node id '{id}'")]
    UnknownNode { id: String },

    /// The node exists but its kind does not support the operation.
    #[error("'{operation}' is not supported for {kind} node '{id}'")]
    WrongKind {
        id: String,
        kind: NodeKind,
        operation: &'static str,
    },

    /// Writing a snapshot or cache file failed.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A node search pattern is not a valid regex.
    #[error("invalid node pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Rendering a graph to text failed.
    #[error("failed to render graph: {0}")]
    Render(#[from] std::fmt::Error),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedGraph {
            reason: reason.into(),
        }
    }

    pub(crate) fn write_failed(path: &Path, source: impl Into<std::io::Error>) -> Self {
        Self::WriteFailed {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    pub(crate) fn unknown(id: &str) -> Self {
        Self::UnknownNode { id: id.to_owned() }
    }

    /// Returns `true` for the recoverable "no such node" outcome.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownNode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_node_is_not_found() {
        assert!(Error::unknown("libfoo").is_not_found());
        assert!(!Error::malformed("bad").is_not_found());
    }

    #[test]
    fn test_wrong_kind_message_names_operation() {
        let err = Error::WrongKind {
            id: "bin/app".into(),
            kind: NodeKind::Executable,
            operation: "defined_symbols",
        };
        assert_eq!(
            err.to_string(),
            "'defined_symbols' is not supported for executable node 'bin/app'"
        );
    }
}
