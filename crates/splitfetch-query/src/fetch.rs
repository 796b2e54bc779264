//! Fetch-path extraction.
//!
//! Walks a query's fetch directives in declaration order and builds the
//! directed forest of `FetchPath` nodes the split executor processes level
//! by level. Chain attachment uses an explicit stack: a root-level fetch
//! starts a new chain, a then-fetch extends the most recently declared one.

use crate::query::{FetchBody, FetchKind, QueryNode, QuerySpec};
use splitfetch_core::{
    BackReference, EntityType, Error, Result, resolve_back_reference,
};

/// Index of a fetch path within one extracted forest.
pub type PathId = usize;

/// One navigation to eagerly load, positioned in its nesting chain.
#[derive(Debug, Clone)]
pub struct FetchPath {
    /// Index of this path in the forest.
    pub id: PathId,

    /// True for collection navigations, false for single references.
    pub is_collection: bool,

    /// The entity type the navigation is declared on.
    pub parent_entity: &'static EntityType,

    /// The entity type the navigation targets.
    pub child_entity: &'static EntityType,

    /// The navigation property on the parent.
    pub navigation: &'static str,

    /// The resolved child-side join key.
    pub back_reference: BackReference,

    /// The path this one nests under; `None` for root-level fetches.
    pub parent_path: Option<PathId>,

    /// 0 for root-level fetches, parent's depth + 1 for nested ones.
    pub depth: usize,

    /// Direct-reference navigations to eager-load on the child query
    /// itself (flattened chains that add no collection level).
    pub nested_fetches: Vec<&'static str>,
}

/// Extract the fetch-path forest from a query descriptor.
///
/// Paths are returned in encounter order. All mapping problems surface
/// here, before any query executes.
///
/// # Errors
///
/// - `InvalidFetchChain` for a then-fetch with no enclosing chain.
/// - `UnsupportedFetchShape` for a non-property fetch body.
/// - `MappingNotFound` / `UnsupportedKey` from back-reference resolution.
pub fn extract_fetch_paths(spec: &QuerySpec) -> Result<Vec<FetchPath>> {
    let mut directives = Vec::new();
    collect_directives(spec.node(), &mut directives);

    let root_entity = spec.entity();
    let mut paths: Vec<FetchPath> = Vec::new();
    let mut stack: Vec<PathId> = Vec::new();

    for (body, kind) in directives {
        let property = match body {
            FetchBody::Property(p) => *p,
            FetchBody::Computed(detail) => {
                return Err(Error::UnsupportedFetchShape {
                    detail: (*detail).to_string(),
                });
            }
        };

        match kind {
            FetchKind::Root => {
                let path = build_path(&paths, root_entity, property, None)?;
                let id = path.id;
                paths.push(path);
                // A new root-level fetch starts a fresh chain.
                stack.clear();
                stack.push(id);
            }
            FetchKind::Then => {
                let Some(&top) = stack.last() else {
                    return Err(Error::InvalidFetchChain {
                        navigation: property.to_string(),
                    });
                };
                let enclosing = paths[top].child_entity;
                let nav = enclosing
                    .navigation(property)
                    .ok_or_else(|| Error::MappingNotFound {
                        entity: enclosing.name,
                        detail: format!("navigation '{property}' is not declared"),
                    })?;

                if nav.is_collection() {
                    let path = build_path(&paths, enclosing, property, Some(top))?;
                    let id = path.id;
                    paths.push(path);
                    stack.push(id);
                } else {
                    // A reference adds no collection level; it rides along
                    // on the enclosing path's child query.
                    paths[top].nested_fetches.push(nav.name);
                }
            }
        }
    }

    Ok(paths)
}

/// Collect fetch directives in declaration order (innermost node first).
fn collect_directives<'a>(
    node: &'a QueryNode,
    out: &mut Vec<(&'a FetchBody, FetchKind)>,
) {
    if let Some(input) = node.input() {
        collect_directives(input, out);
    }
    if let QueryNode::Fetch { body, kind, .. } = node {
        out.push((body, *kind));
    }
}

fn build_path(
    paths: &[FetchPath],
    parent_entity: &'static EntityType,
    property: &'static str,
    parent_path: Option<PathId>,
) -> Result<FetchPath> {
    let nav = parent_entity
        .navigation(property)
        .ok_or_else(|| Error::MappingNotFound {
            entity: parent_entity.name,
            detail: format!("navigation '{property}' is not declared"),
        })?;
    let back_reference = resolve_back_reference(parent_entity, property)?;
    let depth = parent_path.map_or(0, |p| paths[p].depth + 1);

    Ok(FetchPath {
        id: paths.len(),
        is_collection: nav.is_collection(),
        parent_entity,
        child_entity: back_reference.child,
        navigation: nav.name,
        back_reference,
        parent_path,
        depth,
        nested_fetches: Vec::new(),
    })
}
