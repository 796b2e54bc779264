//! The query-execution boundary.
//!
//! The split loader treats query execution as a black box: hand a
//! descriptor to the backend, get back materialized entities. Backends own
//! SQL generation, connections, and transactions; this crate only inspects
//! the *shape* of what comes back.

use splitfetch_core::{EntityData, EntityType, Result, Value};
use splitfetch_query::QuerySpec;

/// The materialized result of one executed query.
#[derive(Debug)]
pub enum QueryResult {
    /// A collection-shaped result.
    Entities(Vec<EntityData>),
    /// A single-entity result (e.g. a first/single query).
    Single(Option<EntityData>),
    /// A scalar result.
    Scalar(Value),
}

/// A query-execution collaborator.
pub trait QueryBackend {
    /// Execute a query descriptor and materialize its result.
    ///
    /// Errors raised here pass through the split loader unchanged.
    fn execute(&mut self, spec: &QuerySpec) -> Result<QueryResult>;

    /// Post-hydration lifecycle callback, fired after each fetch path's
    /// children have been merged into the graph.
    ///
    /// The executor invokes this best-effort: a failure is logged and
    /// ignored, never surfaced, since nothing about the hydration depends
    /// on it.
    fn on_entities_loaded(&mut self, entity: &'static EntityType, count: usize) -> Result<()> {
        let _ = (entity, count);
        Ok(())
    }
}
