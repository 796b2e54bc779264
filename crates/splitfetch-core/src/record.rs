//! Materialized entity records.
//!
//! `EntityData` is the in-memory form of one database row, tagged with its
//! `EntityType`. Navigation state (collections and single references) lives
//! on the record itself together with an explicit `LoadState` flag, so any
//! lazy-loading machinery in the surrounding system can consult the flag
//! instead of re-querying a collection the split loader already populated.

use crate::entity::{EntityType, NavigationKind};
use crate::error::{Error, Result};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A shared, mutable reference to an entity record.
///
/// All references to the same primary key within one split-query execution
/// resolve to the same `EntityRef` (see the session identity map).
pub type EntityRef = Arc<RwLock<EntityData>>;

/// Load state of one navigation on one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// The navigation has not been populated; lazy machinery may fetch it.
    #[default]
    NotLoaded,
    /// The navigation is fully populated; lazy machinery must not re-fetch.
    Loaded,
}

/// State of a collection navigation on one entity.
#[derive(Debug, Default)]
pub struct CollectionState {
    /// Whether the collection is fully loaded.
    pub state: LoadState,
    /// The loaded children (meaningful only when `state` is `Loaded`).
    pub items: Vec<EntityRef>,
}

/// State of a single-reference navigation on one entity.
#[derive(Debug, Default)]
pub struct ReferenceState {
    /// Whether the reference has been resolved.
    pub state: LoadState,
    /// The referenced entity, if any.
    pub target: Option<EntityRef>,
}

/// One materialized entity instance.
#[derive(Debug)]
pub struct EntityData {
    entity_type: &'static EntityType,
    values: Vec<(&'static str, Value)>,
    collections: HashMap<&'static str, CollectionState>,
    references: HashMap<&'static str, ReferenceState>,
}

impl EntityData {
    /// Create an empty record of the given type.
    #[must_use]
    pub fn new(entity_type: &'static EntityType) -> Self {
        Self {
            entity_type,
            values: Vec::new(),
            collections: HashMap::new(),
            references: HashMap::new(),
        }
    }

    /// Create a record with initial property values.
    #[must_use]
    pub fn with_values(
        entity_type: &'static EntityType,
        values: Vec<(&'static str, Value)>,
    ) -> Self {
        Self {
            entity_type,
            values,
            collections: HashMap::new(),
            references: HashMap::new(),
        }
    }

    /// The entity type of this record.
    #[must_use]
    pub fn entity_type(&self) -> &'static EntityType {
        self.entity_type
    }

    /// Get a property value by name.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| *name == property)
            .map(|(_, v)| v)
    }

    /// Set a property value, replacing any existing one.
    pub fn set(&mut self, property: &'static str, value: Value) {
        for (name, v) in &mut self.values {
            if *name == property {
                *v = value;
                return;
            }
        }
        self.values.push((property, value));
    }

    /// All property values in declaration order.
    #[must_use]
    pub fn values(&self) -> &[(&'static str, Value)] {
        &self.values
    }

    /// The primary-key value of this record.
    ///
    /// Returns `Value::Null` when the record carries no value for the key
    /// property (e.g. an unsaved instance).
    pub fn primary_key(&self) -> Result<Value> {
        let field = self
            .entity_type
            .primary_key_field()
            .ok_or(Error::MissingPrimaryKey {
                entity: self.entity_type.name,
            })?;
        Ok(self.get(field.name).cloned().unwrap_or(Value::Null))
    }

    /// The state of a collection navigation, if one has been created.
    #[must_use]
    pub fn collection(&self, navigation: &str) -> Option<&CollectionState> {
        self.collections.get(navigation)
    }

    /// The state of a reference navigation, if one has been created.
    #[must_use]
    pub fn reference(&self, navigation: &str) -> Option<&ReferenceState> {
        self.references.get(navigation)
    }

    /// Check whether a navigation is marked fully loaded.
    #[must_use]
    pub fn is_navigation_loaded(&self, navigation: &str) -> bool {
        match self.entity_type.navigation(navigation).map(|n| n.kind) {
            Some(NavigationKind::Collection) => self
                .collections
                .get(navigation)
                .is_some_and(|c| c.state == LoadState::Loaded),
            Some(NavigationKind::Reference) => self
                .references
                .get(navigation)
                .is_some_and(|r| r.state == LoadState::Loaded),
            None => false,
        }
    }

    /// Populate a collection navigation and mark it fully loaded.
    ///
    /// If a loaded collection already exists for this navigation it is
    /// cleared and repopulated in place, so re-hydration across overlapping
    /// fetch paths stays idempotent.
    pub fn set_collection_loaded(&mut self, navigation: &'static str, items: Vec<EntityRef>) {
        let entry = self.collections.entry(navigation).or_default();
        entry.items.clear();
        entry.items.extend(items);
        entry.state = LoadState::Loaded;
    }

    /// Resolve a reference navigation and mark it loaded.
    ///
    /// An existing target is never overwritten by `None`; hydration without
    /// a match leaves whatever was already assigned.
    pub fn set_reference_loaded(&mut self, navigation: &'static str, target: Option<EntityRef>) {
        let entry = self.references.entry(navigation).or_default();
        if target.is_some() {
            entry.target = target;
        }
        entry.state = LoadState::Loaded;
    }

    /// Wrap this record into a shared reference.
    #[must_use]
    pub fn into_ref(self) -> EntityRef {
        Arc::new(RwLock::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::NavigationInfo;
    use crate::field::FieldInfo;

    static ITEM_FIELDS: &[FieldInfo] = &[
        FieldInfo::new("id", "id").primary_key(true),
        FieldInfo::new("order_id", "order_id"),
    ];
    static ITEM: EntityType = EntityType::new("Item", "items", ITEM_FIELDS, &[]);

    fn item_type() -> &'static EntityType {
        &ITEM
    }

    static ORDER_FIELDS: &[FieldInfo] = &[FieldInfo::new("id", "id").primary_key(true)];
    static ORDER_NAVS: &[NavigationInfo] =
        &[NavigationInfo::new("items", NavigationKind::Collection, item_type)
            .foreign_key(&["order_id"])];
    static ORDER: EntityType = EntityType::new("Order", "orders", ORDER_FIELDS, ORDER_NAVS);

    fn order(id: i64) -> EntityData {
        EntityData::with_values(&ORDER, vec![("id", Value::BigInt(id))])
    }

    fn item(id: i64, order_id: i64) -> EntityData {
        EntityData::with_values(
            &ITEM,
            vec![("id", Value::BigInt(id)), ("order_id", Value::BigInt(order_id))],
        )
    }

    #[test]
    fn test_get_and_set() {
        let mut o = order(1);
        assert_eq!(o.get("id"), Some(&Value::BigInt(1)));
        o.set("id", Value::BigInt(2));
        assert_eq!(o.get("id"), Some(&Value::BigInt(2)));
        assert_eq!(o.values().len(), 1);
    }

    #[test]
    fn test_primary_key() {
        assert_eq!(order(9).primary_key().unwrap(), Value::BigInt(9));
    }

    #[test]
    fn test_primary_key_missing_value_is_null() {
        let o = EntityData::new(&ORDER);
        assert_eq!(o.primary_key().unwrap(), Value::Null);
    }

    #[test]
    fn test_primary_key_unmapped_type_fails() {
        static BARE: EntityType = EntityType::new("Bare", "bares", &[], &[]);
        let b = EntityData::new(&BARE);
        assert!(matches!(
            b.primary_key(),
            Err(Error::MissingPrimaryKey { entity: "Bare" })
        ));
    }

    #[test]
    fn test_collection_load_state() {
        let mut o = order(1);
        assert!(!o.is_navigation_loaded("items"));

        o.set_collection_loaded("items", vec![item(10, 1).into_ref()]);
        assert!(o.is_navigation_loaded("items"));
        assert_eq!(o.collection("items").unwrap().items.len(), 1);
    }

    #[test]
    fn test_collection_repopulate_in_place() {
        let mut o = order(1);
        o.set_collection_loaded("items", vec![item(10, 1).into_ref(), item(11, 1).into_ref()]);
        o.set_collection_loaded("items", vec![item(12, 1).into_ref()]);

        let state = o.collection("items").unwrap();
        assert_eq!(state.state, LoadState::Loaded);
        assert_eq!(state.items.len(), 1);
    }

    #[test]
    fn test_empty_collection_is_loaded_not_absent() {
        let mut o = order(1);
        o.set_collection_loaded("items", Vec::new());
        assert!(o.is_navigation_loaded("items"));
        assert!(o.collection("items").unwrap().items.is_empty());
    }

    #[test]
    fn test_reference_keeps_existing_target() {
        static PROFILE: EntityType = EntityType::new("Profile", "profiles", ITEM_FIELDS, &[]);
        fn profile_type() -> &'static EntityType {
            &PROFILE
        }
        static USER_NAVS: &[NavigationInfo] =
            &[NavigationInfo::new("profile", NavigationKind::Reference, profile_type)
                .foreign_key(&["order_id"])];
        static USER: EntityType = EntityType::new("User", "users", ORDER_FIELDS, USER_NAVS);

        let mut u = EntityData::with_values(&USER, vec![("id", Value::BigInt(1))]);
        let target = EntityData::new(&PROFILE).into_ref();
        u.set_reference_loaded("profile", Some(Arc::clone(&target)));
        u.set_reference_loaded("profile", None);

        let state = u.reference("profile").unwrap();
        assert_eq!(state.state, LoadState::Loaded);
        assert!(state.target.is_some());
    }
}
