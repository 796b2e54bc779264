//! Child query building.
//!
//! For a fetch path and a set of already-materialized parents, builds the
//! filtered query selecting child rows whose back-reference key falls in
//! the parents' primary-key set. The query is returned, never executed.

use crate::expr::Expr;
use crate::fetch::FetchPath;
use crate::query::QuerySpec;
use splitfetch_core::{EntityRef, Result, Value};

/// Collect the distinct, non-null primary keys of `parents`.
///
/// Keys are read through entity metadata, not off the domain model, so
/// proxy-like records only need their key property populated. Null keys
/// (unsaved parents) are skipped.
pub fn collect_parent_keys(parents: &[EntityRef]) -> Result<Vec<Value>> {
    let mut keys: Vec<Value> = Vec::new();
    for parent in parents {
        let pk = parent.read().expect("lock poisoned").primary_key()?;
        if pk.is_null() {
            continue;
        }
        if !keys.contains(&pk) {
            keys.push(pk);
        }
    }
    Ok(keys)
}

/// Build the child query for one fetch path.
///
/// Returns `None` when no parent contributes a usable key (the caller skips
/// the path without issuing a query). Nested direct-reference fetches are
/// re-applied so the child query stays eagerly loaded for simple
/// references.
pub fn build_child_query(path: &FetchPath, parents: &[EntityRef]) -> Result<Option<QuerySpec>> {
    let keys = collect_parent_keys(parents)?;
    if keys.is_empty() {
        return Ok(None);
    }

    let mut spec = QuerySpec::source(path.child_entity)
        .filter(Expr::key_in(path.back_reference.key_property, keys));
    for navigation in &path.nested_fetches {
        spec = spec.fetch(navigation);
    }
    Ok(Some(spec))
}
