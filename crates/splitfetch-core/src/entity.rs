//! Entity type metadata.
//!
//! Entity types are described by `'static` metadata in the same style the
//! rest of the workspace uses for relationship handling: const builders over
//! plain structs, registered once and looked up at analysis time. The
//! split-loading engine never reflects over concrete Rust structs; it walks
//! this metadata instead.

use crate::field::FieldInfo;

/// The shape of a navigation property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// One-to-many: the navigation holds a collection of children.
    Collection,
    /// Single reference where the *target* row carries the foreign key
    /// (one-to-one child). References whose key lives on the parent side
    /// are eager-loaded by the backend, not split.
    Reference,
}

/// Metadata about a navigation property on an entity type.
#[derive(Debug, Clone, Copy)]
pub struct NavigationInfo {
    /// Name of the navigation property on the parent.
    pub name: &'static str,

    /// Collection or single reference.
    pub kind: NavigationKind,

    /// Function pointer returning the target entity type.
    ///
    /// A function pointer (rather than a direct reference) keeps mutually
    /// referencing `static` entity types constructible in const context.
    pub target_fn: fn() -> &'static EntityType,

    /// Foreign-key column(s) on the *target* table pointing back at the
    /// parent. Split loading requires exactly one column; composite keys
    /// are rejected at resolution time.
    pub foreign_key: &'static [&'static str],
}

impl NavigationInfo {
    /// Create a new navigation with required fields.
    #[must_use]
    pub const fn new(
        name: &'static str,
        kind: NavigationKind,
        target_fn: fn() -> &'static EntityType,
    ) -> Self {
        Self {
            name,
            kind,
            target_fn,
            foreign_key: &[],
        }
    }

    /// Set the foreign-key column(s) on the target table.
    #[must_use]
    pub const fn foreign_key(mut self, columns: &'static [&'static str]) -> Self {
        self.foreign_key = columns;
        self
    }

    /// The target (child) entity type of this navigation.
    #[must_use]
    pub fn target(&self) -> &'static EntityType {
        (self.target_fn)()
    }

    /// Check whether this navigation holds a collection.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self.kind, NavigationKind::Collection)
    }
}

/// Metadata describing one entity type (schema identity, not storage layout).
#[derive(Debug)]
pub struct EntityType {
    /// Semantic type name (unique within a schema).
    pub name: &'static str,

    /// Backing table name.
    pub table: &'static str,

    /// Persistent properties.
    pub fields: &'static [FieldInfo],

    /// Navigation properties.
    pub navigations: &'static [NavigationInfo],
}

impl EntityType {
    /// Create a new entity type.
    #[must_use]
    pub const fn new(
        name: &'static str,
        table: &'static str,
        fields: &'static [FieldInfo],
        navigations: &'static [NavigationInfo],
    ) -> Self {
        Self {
            name,
            table,
            fields,
            navigations,
        }
    }

    /// Find a field by property name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Find a field by column name (ASCII case-insensitive).
    #[must_use]
    pub fn field_by_column(&self, column: &str) -> Option<&'static FieldInfo> {
        self.fields.iter().find(|f| f.matches_column(column))
    }

    /// Find a navigation by property name.
    #[must_use]
    pub fn navigation(&self, name: &str) -> Option<&'static NavigationInfo> {
        self.navigations.iter().find(|n| n.name == name)
    }

    /// The primary-key field, if one is declared.
    #[must_use]
    pub fn primary_key_field(&self) -> Option<&'static FieldInfo> {
        self.fields.iter().find(|f| f.primary_key)
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        // Entity identity is the semantic type name; field slices may be
        // distinct statics for the same schema type.
        self.name == other.name
    }
}

impl Eq for EntityType {}
