//! Field and column metadata.

/// Metadata about one persistent property of an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// Property name on the entity
    pub name: &'static str,
    /// Database column name (may differ from the property name)
    pub column: &'static str,
    /// Whether this property is (part of) the primary key
    pub primary_key: bool,
}

impl FieldInfo {
    /// Create a new field with minimal required data.
    #[must_use]
    pub const fn new(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            primary_key: false,
        }
    }

    /// Mark this field as (part of) the primary key.
    #[must_use]
    pub const fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self
    }

    /// Check whether this field's column matches `column`, ignoring ASCII case.
    #[must_use]
    pub fn matches_column(&self, column: &str) -> bool {
        self.column.eq_ignore_ascii_case(column)
    }
}
