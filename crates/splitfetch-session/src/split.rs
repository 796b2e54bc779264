//! The split-query execution state machine.
//!
//! A split-enabled query runs in phases: analyze the fetch forest, execute
//! the stripped root query, then walk the forest level by level issuing one
//! filtered child query per path and stitching the results back onto their
//! parents. All analysis errors surface before the first query executes.

use crate::backend::{QueryBackend, QueryResult};
use crate::cancel::CancelToken;
use crate::hydrate::hydrate;
use crate::identity_map::IdentityMap;
use splitfetch_core::{EntityData, EntityRef, Error, Result, Value};
use splitfetch_query::{
    FetchPath, PathId, QuerySpec, build_child_query, extract_fetch_paths, organize_by_level,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// The materialized, graph-stitched result of one execution.
#[derive(Debug)]
pub enum LoadResult {
    /// A collection of root entities.
    Entities(Vec<EntityRef>),
    /// A single root entity, or none.
    Single(Option<EntityRef>),
    /// A scalar value.
    Scalar(Value),
}

impl LoadResult {
    /// The root entities, when the result is collection-shaped.
    #[must_use]
    pub fn as_entities(&self) -> Option<&[EntityRef]> {
        match self {
            LoadResult::Entities(entities) => Some(entities),
            _ => None,
        }
    }
}

/// Executes queries through a backend, applying split loading where the
/// query asks for it.
#[derive(Debug)]
pub struct Session<B: QueryBackend> {
    backend: B,
}

impl<B: QueryBackend> Session<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consume the session, returning its backend.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Execute a query, honoring cancellation.
    ///
    /// The token is checked once, at entry. A token tripped mid-execution
    /// takes effect on the next call.
    ///
    /// # Errors
    ///
    /// Returns `Error::Cancelled` when the token is already tripped,
    /// otherwise as [`Session::execute`].
    pub fn execute_cancellable(
        &mut self,
        spec: &QuerySpec,
        token: &CancelToken,
    ) -> Result<LoadResult> {
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.execute(spec)
    }

    /// Execute a query.
    ///
    /// Non-split queries, queries without fetch directives, and
    /// single-entity queries pass through to the backend unchanged.
    ///
    /// # Errors
    ///
    /// Analysis errors (`InvalidFetchChain`, `UnsupportedKey`,
    /// `MappingNotFound`, `UnsupportedFetchShape`) surface before any query
    /// executes. Backend errors pass through unchanged.
    #[tracing::instrument(skip_all, fields(entity = spec.entity().name))]
    pub fn execute(&mut self, spec: &QuerySpec) -> Result<LoadResult> {
        if !spec.is_split() {
            return self.passthrough(spec);
        }

        // Analyze up front so mapping problems beat I/O.
        let paths = extract_fetch_paths(spec)?;
        if paths.is_empty() {
            debug!("split enabled but no fetch directives, passing through");
            return self.passthrough(spec);
        }
        if spec.is_single_shape() {
            debug!("single-entity query, split loading skipped");
            return self.passthrough(spec);
        }

        let stripped = spec.stripped();
        let roots = match self.backend.execute(&stripped)? {
            QueryResult::Entities(rows) => rows,
            // A backend that reduces the root to a single entity or a
            // scalar gets its result returned unmodified.
            QueryResult::Single(row) => {
                return Ok(LoadResult::Single(row.map(EntityData::into_ref)));
            }
            QueryResult::Scalar(value) => return Ok(LoadResult::Scalar(value)),
        };
        if roots.is_empty() {
            debug!("root query returned no rows, skipping child queries");
            return Ok(LoadResult::Entities(Vec::new()));
        }

        let mut identity = IdentityMap::new();
        let mut root_refs = Vec::with_capacity(roots.len());
        for row in roots {
            let (entity, _) = identity.intern(row)?;
            root_refs.push(entity);
        }

        // Parents per path: `None` keys the root level.
        let mut parents: HashMap<Option<PathId>, Vec<EntityRef>> = HashMap::new();
        parents.insert(None, root_refs.clone());

        for level in organize_by_level(&paths) {
            for id in level {
                let path = &paths[id];
                let Some(level_parents) = parents.get(&path.parent_path) else {
                    continue;
                };
                if level_parents.is_empty() {
                    continue;
                }
                let level_parents = level_parents.clone();
                self.load_path(path, &level_parents, &mut identity)?;
                parents.insert(Some(path.id), collect_children(path, &level_parents));
            }
        }

        info!(
            roots = root_refs.len(),
            paths = paths.len(),
            interned = identity.len(),
            "split execution complete"
        );
        Ok(LoadResult::Entities(root_refs))
    }

    /// Execute one fetch path's child query and merge the results.
    fn load_path(
        &mut self,
        path: &FetchPath,
        parents: &[EntityRef],
        identity: &mut IdentityMap,
    ) -> Result<()> {
        // Parents whose navigation is already populated keep it; only the
        // rest warrant a query.
        let pending: Vec<EntityRef> = parents
            .iter()
            .filter(|p| {
                !p.read()
                    .expect("lock poisoned")
                    .is_navigation_loaded(path.navigation)
            })
            .cloned()
            .collect();
        if pending.is_empty() {
            debug!(navigation = path.navigation, "all parents already loaded");
            return Ok(());
        }

        let Some(child_query) = build_child_query(path, &pending)? else {
            debug!(navigation = path.navigation, "no usable parent keys");
            return Ok(());
        };
        let rows = match self.backend.execute(&child_query)? {
            QueryResult::Entities(rows) => rows,
            other => {
                return Err(Error::Contract(format!(
                    "child query for navigation '{}' returned a non-collection result: {other:?}",
                    path.navigation,
                )));
            }
        };

        let mut children = Vec::with_capacity(rows.len());
        for row in rows {
            let (child, _) = identity.intern(row)?;
            children.push(child);
        }
        hydrate(path, &pending, &children)?;

        if let Err(err) = self
            .backend
            .on_entities_loaded(path.child_entity, children.len())
        {
            debug!(
                entity = path.child_entity.name,
                error = %err,
                "post-load callback failed, continuing"
            );
        }
        Ok(())
    }

    fn passthrough(&mut self, spec: &QuerySpec) -> Result<LoadResult> {
        Ok(match self.backend.execute(spec)? {
            QueryResult::Entities(rows) => {
                LoadResult::Entities(rows.into_iter().map(EntityData::into_ref).collect())
            }
            QueryResult::Single(row) => LoadResult::Single(row.map(EntityData::into_ref)),
            QueryResult::Scalar(value) => LoadResult::Scalar(value),
        })
    }
}

/// Gather every child reachable through one path's navigation, across all
/// of its parents. These become the parent set for paths nested deeper.
fn collect_children(path: &FetchPath, parents: &[EntityRef]) -> Vec<EntityRef> {
    let mut children = Vec::new();
    for parent in parents {
        let guard = parent.read().expect("lock poisoned");
        if path.is_collection {
            if let Some(state) = guard.collection(path.navigation) {
                children.extend(state.items.iter().map(Arc::clone));
            }
        } else if let Some(state) = guard.reference(path.navigation) {
            children.extend(state.target.iter().map(Arc::clone));
        }
    }
    children
}
