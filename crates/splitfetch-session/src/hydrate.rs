//! Graph reassembly.
//!
//! Takes the children one fetch path's query produced and merges them into
//! their parents, keyed by the resolved back-reference. Every touched
//! navigation comes out marked `Loaded`, including the ones that matched
//! nothing.

use crate::identity_map::hash_key;
use splitfetch_core::{EntityRef, Error, Result, Value};
use splitfetch_query::FetchPath;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Merge `children` into `parents` along one fetch path.
///
/// Returns the number of children that found a parent. Children whose
/// back-reference value is null are skipped; parents without a match get an
/// empty loaded collection (or an untouched loaded reference).
///
/// # Errors
///
/// Returns `Error::Contract` when a child record's type does not match the
/// path's child entity.
#[tracing::instrument(skip_all, fields(
    navigation = path.navigation,
    parent = path.parent_entity.name,
    child = path.child_entity.name,
))]
pub fn hydrate(path: &FetchPath, parents: &[EntityRef], children: &[EntityRef]) -> Result<usize> {
    // Bucket children by their back-reference value.
    let mut buckets: HashMap<u64, Vec<EntityRef>> = HashMap::new();
    let mut linked = 0usize;

    for child in children {
        let guard = child.read().expect("lock poisoned");
        if guard.entity_type() != path.child_entity {
            return Err(Error::Contract(format!(
                "expected {} rows for navigation '{}', got {}",
                path.child_entity.name,
                path.navigation,
                guard.entity_type().name,
            )));
        }
        let key = guard
            .get(path.back_reference.key_property)
            .cloned()
            .unwrap_or(Value::Null);
        if key.is_null() {
            trace!(
                child = guard.entity_type().name,
                key_property = path.back_reference.key_property,
                "skipping child with null back-reference"
            );
            continue;
        }
        drop(guard);
        buckets.entry(hash_key(&key)).or_default().push(Arc::clone(child));
    }

    for parent in parents {
        let pk = parent.read().expect("lock poisoned").primary_key()?;
        let matched: Vec<EntityRef> = if pk.is_null() {
            Vec::new()
        } else {
            buckets.get(&hash_key(&pk)).cloned().unwrap_or_default()
        };
        linked += matched.len();

        let mut guard = parent.write().expect("lock poisoned");
        if path.is_collection {
            guard.set_collection_loaded(path.navigation, matched);
        } else {
            guard.set_reference_loaded(path.navigation, matched.into_iter().next());
        }
    }

    debug!(
        parents = parents.len(),
        children = children.len(),
        linked,
        "hydrated fetch path"
    );
    Ok(linked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitfetch_core::{EntityData, EntityType, FieldInfo, NavigationInfo, NavigationKind};
    use splitfetch_query::{QuerySpec, extract_fetch_paths};

    static LINE_FIELDS: &[FieldInfo] = &[
        FieldInfo::new("id", "id").primary_key(true),
        FieldInfo::new("invoice_id", "invoice_id"),
    ];
    static LINE: EntityType = EntityType::new("HLine", "lines", LINE_FIELDS, &[]);

    fn line_type() -> &'static EntityType {
        &LINE
    }

    static INVOICE_FIELDS: &[FieldInfo] = &[FieldInfo::new("id", "id").primary_key(true)];
    static INVOICE_NAVS: &[NavigationInfo] = &[
        NavigationInfo::new("lines", NavigationKind::Collection, line_type)
            .foreign_key(&["invoice_id"]),
        NavigationInfo::new("summary", NavigationKind::Reference, line_type)
            .foreign_key(&["invoice_id"]),
    ];
    static INVOICE: EntityType =
        EntityType::new("HInvoice", "invoices", INVOICE_FIELDS, INVOICE_NAVS);

    fn invoice(id: i64) -> EntityRef {
        EntityData::with_values(&INVOICE, vec![("id", Value::BigInt(id))]).into_ref()
    }

    fn line(id: i64, invoice_id: Value) -> EntityRef {
        EntityData::with_values(&LINE, vec![("id", Value::BigInt(id)), ("invoice_id", invoice_id)])
            .into_ref()
    }

    fn lines_path() -> FetchPath {
        let q = QuerySpec::source(&INVOICE).fetch("lines");
        extract_fetch_paths(&q).unwrap().remove(0)
    }

    #[test]
    fn test_children_attach_to_their_parent_only() {
        let p1 = invoice(1);
        let p2 = invoice(2);
        let children = vec![
            line(10, Value::BigInt(1)),
            line(11, Value::BigInt(2)),
            line(12, Value::BigInt(1)),
        ];

        let linked = hydrate(&lines_path(), &[Arc::clone(&p1), Arc::clone(&p2)], &children)
            .unwrap();
        assert_eq!(linked, 3);

        let g1 = p1.read().unwrap();
        let g2 = p2.read().unwrap();
        assert_eq!(g1.collection("lines").unwrap().items.len(), 2);
        assert_eq!(g2.collection("lines").unwrap().items.len(), 1);
    }

    #[test]
    fn test_parent_without_children_gets_empty_loaded_collection() {
        let p = invoice(7);
        hydrate(&lines_path(), &[Arc::clone(&p)], &[]).unwrap();

        let guard = p.read().unwrap();
        assert!(guard.is_navigation_loaded("lines"));
        assert!(guard.collection("lines").unwrap().items.is_empty());
    }

    #[test]
    fn test_null_back_reference_is_skipped() {
        let p = invoice(1);
        let children = vec![line(10, Value::Null), line(11, Value::BigInt(1))];

        let linked = hydrate(&lines_path(), &[Arc::clone(&p)], &children).unwrap();
        assert_eq!(linked, 1);
        assert_eq!(p.read().unwrap().collection("lines").unwrap().items.len(), 1);
    }

    #[test]
    fn test_wrong_child_type_is_a_contract_error() {
        let p = invoice(1);
        let stray = EntityData::with_values(&INVOICE, vec![("id", Value::BigInt(9))]).into_ref();

        let err = hydrate(&lines_path(), &[p], &[stray]).unwrap_err();
        assert!(matches!(err, Error::Contract(_)));
    }

    #[test]
    fn test_reference_path_assigns_single_target() {
        let q = QuerySpec::source(&INVOICE).fetch("summary");
        let path = extract_fetch_paths(&q).unwrap().remove(0);
        assert!(!path.is_collection);

        let p = invoice(1);
        let children = vec![line(10, Value::BigInt(1))];
        hydrate(&path, &[Arc::clone(&p)], &children).unwrap();

        let guard = p.read().unwrap();
        assert!(guard.is_navigation_loaded("summary"));
        assert!(guard.reference("summary").unwrap().target.is_some());
    }
}
