//! Query descriptors and fetch-path analysis for splitfetch.
//!
//! `splitfetch-query` is the **query rewriting layer**. It provides the
//! abstract query descriptor plus every transform the split loader applies
//! before execution:
//!
//! - **Descriptors**: `QuerySpec` / `QueryNode` model one query as an
//!   expression tree, including its fetch directives.
//! - **Analysis**: `extract_fetch_paths` turns directives into a forest of
//!   `FetchPath` nodes; `organize_by_level` orders them for execution.
//! - **Rewrites**: `QuerySpec::stripped` removes fetch directives;
//!   `build_child_query` produces the per-level filtered queries.
//!
//! Descriptors execute through the `QueryBackend` trait in
//! `splitfetch-session`; most users go through the `splitfetch` facade.

pub mod child;
pub mod expr;
pub mod fetch;
pub mod level;
pub mod query;
pub mod strip;

pub use child::{build_child_query, collect_parent_keys};
pub use expr::Expr;
pub use fetch::{FetchPath, PathId, extract_fetch_paths};
pub use level::organize_by_level;
pub use query::{FetchBody, FetchKind, QueryNode, QuerySpec, enable_split_loading};
pub use strip::strip_fetch_directives;
