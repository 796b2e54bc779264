//! Splitfetch - eager loading without the cartesian explosion.
//!
//! Joining a query's eagerly loaded collections into one result set
//! multiplies rows: a parent with N phases and M shipments comes back
//! N x M times. Splitfetch rewrites such a query into one query per
//! fetched navigation, filtered by the parent key set, and reassembles
//! the object graph in memory instead.
//!
//! # Quick Start
//!
//! ```ignore
//! use splitfetch::{
//!     EntityType, FieldInfo, MemoryBackend, NavigationInfo, NavigationKind,
//!     QuerySpec, Session, enable_split_loading,
//! };
//!
//! static PHASE_FIELDS: &[FieldInfo] = &[
//!     FieldInfo::new("id", "id").primary_key(true),
//!     FieldInfo::new("order_id", "order_id"),
//! ];
//! static PHASE: EntityType = EntityType::new("Phase", "phases", PHASE_FIELDS, &[]);
//!
//! fn phase_type() -> &'static EntityType {
//!     &PHASE
//! }
//!
//! static ORDER_FIELDS: &[FieldInfo] = &[FieldInfo::new("id", "id").primary_key(true)];
//! static ORDER_NAVS: &[NavigationInfo] =
//!     &[NavigationInfo::new("phases", NavigationKind::Collection, phase_type)
//!         .foreign_key(&["order_id"])];
//! static ORDER: EntityType = EntityType::new("Order", "orders", ORDER_FIELDS, ORDER_NAVS);
//!
//! let mut session = Session::new(MemoryBackend::new());
//! let query = enable_split_loading(QuerySpec::source(&ORDER).fetch("phases"));
//! let orders = session.execute(&query)?;
//! # Ok::<(), splitfetch::Error>(())
//! ```
//!
//! # How it runs
//!
//! 1. Fetch directives are analyzed into a forest of fetch paths; every
//!    mapping problem surfaces here, before any query executes.
//! 2. The root query runs with the directives stripped.
//! 3. Each fetch path runs one child query filtered by its parents' keys,
//!    shallowest paths first.
//! 4. Children attach to parents through an identity map, so the same row
//!    reached through two paths is one shared instance, and every touched
//!    navigation is marked loaded.

pub use splitfetch_core::{
    BackReference, BackendError, CollectionState, EntityData, EntityRef, EntityType, Error,
    FieldInfo, LoadState, NavigationInfo, NavigationKind, ReferenceState, Result, Value,
    resolve_back_reference,
};

pub use splitfetch_query::{
    Expr, FetchBody, FetchKind, FetchPath, PathId, QueryNode, QuerySpec, build_child_query,
    collect_parent_keys, enable_split_loading, extract_fetch_paths, organize_by_level,
    strip_fetch_directives,
};

pub use splitfetch_session::{
    CancelToken, IdentityMap, LoadResult, MemoryBackend, QueryBackend, QueryResult, Session,
    hash_key, hydrate,
};
