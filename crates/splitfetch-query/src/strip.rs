//! Fetch-directive stripping.
//!
//! Produces a query equivalent to the original with every fetch directive
//! spliced out, used to obtain the unfiltered root result set. Filtering,
//! ordering, and paging directives are preserved unchanged.

use crate::query::{QueryNode, QuerySpec};

/// Remove every fetch directive from a node tree, recursively.
///
/// Each `Fetch` node is replaced by its input sub-expression; all other
/// nodes are rebuilt around their stripped inputs.
#[must_use]
pub fn strip_fetch_directives(node: QueryNode) -> QueryNode {
    match node {
        QueryNode::Source { .. } => node,
        QueryNode::Fetch { input, .. } => strip_fetch_directives(*input),
        QueryNode::Filter { input, predicate } => QueryNode::Filter {
            input: Box::new(strip_fetch_directives(*input)),
            predicate,
        },
        QueryNode::OrderBy {
            input,
            property,
            descending,
        } => QueryNode::OrderBy {
            input: Box::new(strip_fetch_directives(*input)),
            property,
            descending,
        },
        QueryNode::Skip { input, count } => QueryNode::Skip {
            input: Box::new(strip_fetch_directives(*input)),
            count,
        },
        QueryNode::Take { input, count } => QueryNode::Take {
            input: Box::new(strip_fetch_directives(*input)),
            count,
        },
        QueryNode::First { input } => QueryNode::First {
            input: Box::new(strip_fetch_directives(*input)),
        },
    }
}

impl QuerySpec {
    /// An equivalent query with all fetch directives removed.
    ///
    /// The result is plain (split flag cleared) so it executes verbatim on
    /// the backend.
    #[must_use]
    pub fn stripped(&self) -> QuerySpec {
        QuerySpec::from_node(strip_fetch_directives(self.clone().into_node()))
    }
}
