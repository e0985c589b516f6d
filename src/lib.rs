//! Introspection of the library-linking graph produced by a large C/C++ build.
//!
//! A [`Graph`] is loaded once from a JSON snapshot and then answered read-only queries
//! through [`query`]: direct relations, transitive closures, link paths, implicit
//! dependency cycles and symbol leaks. Results that are graphs are new [`Graph`]s and
//! can be rendered with [`export`].

pub mod cache;
pub mod error;
pub mod export;
pub mod graph;
pub mod query;

pub use error::{Error, Result};
pub use graph::Graph;
pub use graph::edge::EdgeType;
pub use graph::node::{Node, NodeKind};
