//! Query descriptors.
//!
//! A `QuerySpec` is the abstract, executable representation of one query:
//! an expression tree of directive nodes over a root entity source. The
//! split loader rewrites these trees (stripping fetch directives, building
//! filtered child queries); the execution collaborator consumes them as-is.
//!
//! Builder calls wrap the tree outward, so the innermost `Fetch` node is the
//! first directive the caller declared. The fetch-path analyzer relies on
//! that ordering.

use crate::expr::Expr;
use splitfetch_core::EntityType;

/// Whether a fetch directive starts a chain or extends the enclosing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Attaches to the query's root entity type.
    Root,
    /// Attaches to the most recently declared enclosing fetch directive.
    Then,
}

/// The body of a fetch directive.
///
/// Only simple property accesses can be split; anything else is rejected at
/// analysis time with `UnsupportedFetchShape`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchBody {
    /// A plain navigation property access.
    Property(&'static str),
    /// A computed expression (description only, never analyzable).
    Computed(&'static str),
}

/// One node of a query descriptor tree.
#[derive(Debug, Clone)]
pub enum QueryNode {
    /// The root entity source.
    Source {
        /// Root entity type.
        entity: &'static EntityType,
    },
    /// Filter rows by a predicate.
    Filter {
        /// Upstream node.
        input: Box<QueryNode>,
        /// The predicate.
        predicate: Expr,
    },
    /// Order rows by a property.
    OrderBy {
        /// Upstream node.
        input: Box<QueryNode>,
        /// Ordering property.
        property: &'static str,
        /// Descending order when true.
        descending: bool,
    },
    /// Skip the first `count` rows.
    Skip {
        /// Upstream node.
        input: Box<QueryNode>,
        /// Rows to skip.
        count: u64,
    },
    /// Keep at most `count` rows.
    Take {
        /// Upstream node.
        input: Box<QueryNode>,
        /// Maximum rows.
        count: u64,
    },
    /// Reduce the result to a single entity (or none).
    First {
        /// Upstream node.
        input: Box<QueryNode>,
    },
    /// Eagerly load a navigation alongside the query.
    Fetch {
        /// Upstream node.
        input: Box<QueryNode>,
        /// The navigation to load.
        body: FetchBody,
        /// Chain position.
        kind: FetchKind,
    },
}

impl QueryNode {
    /// The upstream node, if this node has one.
    #[must_use]
    pub fn input(&self) -> Option<&QueryNode> {
        match self {
            QueryNode::Source { .. } => None,
            QueryNode::Filter { input, .. }
            | QueryNode::OrderBy { input, .. }
            | QueryNode::Skip { input, .. }
            | QueryNode::Take { input, .. }
            | QueryNode::First { input }
            | QueryNode::Fetch { input, .. } => Some(input),
        }
    }
}

/// An abstract query over one root entity type.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    root: QueryNode,
    split: bool,
}

impl QuerySpec {
    /// Start a query over all rows of an entity type.
    #[must_use]
    pub fn source(entity: &'static EntityType) -> Self {
        Self {
            root: QueryNode::Source { entity },
            split: false,
        }
    }

    /// Build a query from an existing node tree.
    #[must_use]
    pub fn from_node(root: QueryNode) -> Self {
        Self { root, split: false }
    }

    /// Add a filter directive.
    #[must_use]
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.root = QueryNode::Filter {
            input: Box::new(self.root),
            predicate,
        };
        self
    }

    /// Add an ordering directive.
    #[must_use]
    pub fn order_by(mut self, property: &'static str, descending: bool) -> Self {
        self.root = QueryNode::OrderBy {
            input: Box::new(self.root),
            property,
            descending,
        };
        self
    }

    /// Skip the first `count` rows.
    #[must_use]
    pub fn skip(mut self, count: u64) -> Self {
        self.root = QueryNode::Skip {
            input: Box::new(self.root),
            count,
        };
        self
    }

    /// Keep at most `count` rows.
    #[must_use]
    pub fn take(mut self, count: u64) -> Self {
        self.root = QueryNode::Take {
            input: Box::new(self.root),
            count,
        };
        self
    }

    /// Reduce the result to a single entity.
    #[must_use]
    pub fn first(mut self) -> Self {
        self.root = QueryNode::First {
            input: Box::new(self.root),
        };
        self
    }

    /// Eagerly load a navigation of the root entity type.
    #[must_use]
    pub fn fetch(self, navigation: &'static str) -> Self {
        self.fetch_body(FetchBody::Property(navigation), FetchKind::Root)
    }

    /// Eagerly load a navigation of the most recently fetched navigation.
    #[must_use]
    pub fn then_fetch(self, navigation: &'static str) -> Self {
        self.fetch_body(FetchBody::Property(navigation), FetchKind::Then)
    }

    /// Add a fetch directive with an explicit body and kind.
    #[must_use]
    pub fn fetch_body(mut self, body: FetchBody, kind: FetchKind) -> Self {
        self.root = QueryNode::Fetch {
            input: Box::new(self.root),
            body,
            kind,
        };
        self
    }

    /// The root node of the descriptor tree.
    #[must_use]
    pub fn node(&self) -> &QueryNode {
        &self.root
    }

    /// Consume the descriptor, returning its node tree.
    #[must_use]
    pub fn into_node(self) -> QueryNode {
        self.root
    }

    /// The root entity type this query selects from.
    #[must_use]
    pub fn entity(&self) -> &'static EntityType {
        let mut node = &self.root;
        loop {
            match node {
                QueryNode::Source { entity } => return entity,
                other => {
                    // Every non-source node has an input by construction.
                    node = other.input().expect("non-source node without input");
                }
            }
        }
    }

    /// Whether split loading has been enabled on this query.
    #[must_use]
    pub fn is_split(&self) -> bool {
        self.split
    }

    /// Whether this query reduces to a single entity.
    #[must_use]
    pub fn is_single_shape(&self) -> bool {
        let mut node = Some(&self.root);
        while let Some(n) = node {
            if matches!(n, QueryNode::First { .. }) {
                return true;
            }
            node = n.input();
        }
        false
    }

    pub(crate) fn set_split(&mut self, value: bool) {
        self.split = value;
    }
}

/// Enable split loading on a query.
///
/// The wrapped query executes through the split-query state machine instead
/// of a single joined query. Applying this more than once is a no-op.
#[must_use]
pub fn enable_split_loading(mut spec: QuerySpec) -> QuerySpec {
    spec.set_split(true);
    spec
}
