use regex::RegexBuilder;

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::graph::node::{Node, NodeKind};

/// Find nodes whose id or display name matches the regex `pattern`.
///
/// - `case_insensitive`: enable case-insensitive regex matching
/// - `kind_filter`: if non-empty, only include nodes of these kinds
///
/// Returns results sorted by id.
pub fn find_nodes<'g>(
    graph: &'g Graph,
    pattern: &str,
    case_insensitive: bool,
    kind_filter: &[NodeKind],
) -> Result<Vec<&'g Node>> {
    let re = RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        })?;

    // Graph iteration is already ordered by id.
    let results = graph
        .nodes()
        .filter(|n| kind_filter.is_empty() || kind_filter.contains(&n.kind()))
        .filter(|n| re.is_match(&n.id) || re.is_match(&n.name))
        .collect();

    Ok(results)
}
