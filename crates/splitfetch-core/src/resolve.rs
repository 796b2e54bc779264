//! Back-reference resolution from entity metadata.
//!
//! Given a navigation on a parent type, this resolves the child-side
//! property that carries the foreign key back to the parent. The result is
//! a pure function of static metadata, so resolutions are memoized in a
//! process-wide map: the key space is bounded by the schema and mappings do
//! not change at runtime, so no eviction is needed. Reads are safe from
//! concurrent executions against different sessions.

use crate::entity::EntityType;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// A resolved parent→child join: the child-side property holding the
/// foreign key, together with both endpoint types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackReference {
    /// The parent entity type the navigation was declared on.
    pub parent: &'static EntityType,
    /// The child entity type the navigation targets.
    pub child: &'static EntityType,
    /// The navigation property on the parent.
    pub navigation: &'static str,
    /// The property on the child that carries the parent key.
    pub key_property: &'static str,
    /// The foreign-key column backing `key_property`.
    pub key_column: &'static str,
}

type Cache = RwLock<HashMap<(&'static str, &'static str), BackReference>>;

fn cache() -> &'static Cache {
    static CACHE: OnceLock<Cache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Resolve the back-reference property for `navigation` on `parent`.
///
/// # Errors
///
/// - `MappingNotFound` when the navigation does not exist, declares no
///   foreign key, or its key column matches no property on the child type
///   (column matching is ASCII case-insensitive).
/// - `UnsupportedKey` when the foreign key spans more than one column;
///   composite keys fail here, before any query is built.
pub fn resolve_back_reference(
    parent: &'static EntityType,
    navigation: &str,
) -> Result<BackReference> {
    let nav = parent
        .navigation(navigation)
        .ok_or_else(|| Error::MappingNotFound {
            entity: parent.name,
            detail: format!("navigation '{navigation}' is not declared"),
        })?;

    let key = (parent.name, nav.name);
    if let Some(hit) = cache().read().expect("lock poisoned").get(&key) {
        return Ok(*hit);
    }

    if nav.foreign_key.is_empty() {
        return Err(Error::MappingNotFound {
            entity: parent.name,
            detail: format!("navigation '{}' declares no foreign-key column", nav.name),
        });
    }
    if nav.foreign_key.len() > 1 {
        return Err(Error::UnsupportedKey {
            entity: parent.name,
            navigation: nav.name,
            columns: nav.foreign_key.len(),
        });
    }

    let column = nav.foreign_key[0];
    let child = nav.target();
    let property = child
        .field_by_column(column)
        .ok_or_else(|| Error::MappingNotFound {
            entity: child.name,
            detail: format!("no property matches foreign-key column '{column}'"),
        })?;

    let resolved = BackReference {
        parent,
        child,
        navigation: nav.name,
        key_property: property.name,
        key_column: column,
    };
    cache()
        .write()
        .expect("lock poisoned")
        .insert(key, resolved);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{NavigationInfo, NavigationKind};
    use crate::field::FieldInfo;

    static PHASE_FIELDS: &[FieldInfo] = &[
        FieldInfo::new("id", "id").primary_key(true),
        FieldInfo::new("order_id", "OrderId"),
    ];
    static PHASE: EntityType = EntityType::new("RPhase", "phases", PHASE_FIELDS, &[]);

    fn phase_type() -> &'static EntityType {
        &PHASE
    }

    static ORDER_FIELDS: &[FieldInfo] = &[FieldInfo::new("id", "id").primary_key(true)];
    static ORDER_NAVS: &[NavigationInfo] = &[
        NavigationInfo::new("phases", NavigationKind::Collection, phase_type)
            .foreign_key(&["orderid"]),
        NavigationInfo::new("regional_phases", NavigationKind::Collection, phase_type)
            .foreign_key(&["order_id", "region"]),
        NavigationInfo::new("unmapped", NavigationKind::Collection, phase_type),
        NavigationInfo::new("ghost", NavigationKind::Collection, phase_type)
            .foreign_key(&["no_such_column"]),
    ];
    static ORDER: EntityType = EntityType::new("ROrder", "orders", ORDER_FIELDS, ORDER_NAVS);

    #[test]
    fn test_resolves_case_insensitively() {
        let r = resolve_back_reference(&ORDER, "phases").unwrap();
        assert_eq!(r.child.name, "RPhase");
        assert_eq!(r.key_property, "order_id");
        assert_eq!(r.key_column, "orderid");
    }

    #[test]
    fn test_composite_key_fails_fast() {
        let err = resolve_back_reference(&ORDER, "regional_phases").unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedKey {
                entity: "ROrder",
                navigation: "regional_phases",
                columns: 2,
            }
        ));
    }

    #[test]
    fn test_missing_navigation() {
        let err = resolve_back_reference(&ORDER, "shipments").unwrap_err();
        assert!(matches!(err, Error::MappingNotFound { entity: "ROrder", .. }));
    }

    #[test]
    fn test_no_foreign_key_declared() {
        let err = resolve_back_reference(&ORDER, "unmapped").unwrap_err();
        assert!(matches!(err, Error::MappingNotFound { entity: "ROrder", .. }));
    }

    #[test]
    fn test_unmatched_column() {
        let err = resolve_back_reference(&ORDER, "ghost").unwrap_err();
        assert!(matches!(err, Error::MappingNotFound { entity: "RPhase", .. }));
    }

    #[test]
    fn test_cache_returns_same_resolution() {
        let a = resolve_back_reference(&ORDER, "phases").unwrap();
        let b = resolve_back_reference(&ORDER, "phases").unwrap();
        assert_eq!(a, b);
    }
}
