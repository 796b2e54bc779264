//! Identity map: one in-memory instance per primary key.
//!
//! The map is scoped to a single split-query execution. Once an entity is
//! interned, every further occurrence of the same (entity type, primary
//! key) pair during that execution resolves to the same `EntityRef`. The
//! first writer wins and existing instances are never replaced. This keeps
//! back-references intact when the same row is discovered through two
//! different fetch paths.

use splitfetch_core::{EntityData, EntityRef, EntityType, Result, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Hash a key value into a stable 64-bit identifier.
#[must_use]
pub fn hash_key(value: &Value) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hasher;

    let mut hasher = DefaultHasher::new();
    hash_single_value(value, &mut hasher);
    hasher.finish()
}

fn hash_single_value(v: &Value, hasher: &mut impl std::hash::Hasher) {
    use std::hash::Hash;

    match v {
        Value::Null => 0u8.hash(hasher),
        Value::Bool(b) => {
            1u8.hash(hasher);
            b.hash(hasher);
        }
        Value::Int(i) => {
            2u8.hash(hasher);
            i.hash(hasher);
        }
        Value::BigInt(i) => {
            3u8.hash(hasher);
            i.hash(hasher);
        }
        Value::Double(f) => {
            4u8.hash(hasher);
            f.to_bits().hash(hasher);
        }
        Value::Text(s) => {
            5u8.hash(hasher);
            s.hash(hasher);
        }
        Value::Bytes(b) => {
            6u8.hash(hasher);
            b.hash(hasher);
        }
        Value::Uuid(u) => {
            7u8.hash(hasher);
            u.hash(hasher);
        }
        Value::Json(j) => {
            8u8.hash(hasher);
            j.to_string().hash(hasher);
        }
    }
}

/// Per-execution identity map keyed by (entity type name, primary-key hash).
#[derive(Default)]
pub struct IdentityMap {
    entries: HashMap<(&'static str, u64), EntityRef>,
}

impl IdentityMap {
    /// Create a new empty identity map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Intern an entity record.
    ///
    /// If an instance with the same key already exists, the new record is
    /// discarded and the existing reference returned (`false` in the second
    /// tuple slot). Otherwise the record is wrapped, stored, and returned
    /// as newly inserted (`true`).
    pub fn intern(&mut self, entity: EntityData) -> Result<(EntityRef, bool)> {
        let pk = entity.primary_key()?;
        let key = (entity.entity_type().name, hash_key(&pk));

        if let Some(existing) = self.entries.get(&key) {
            return Ok((Arc::clone(existing), false));
        }

        let entry = entity.into_ref();
        self.entries.insert(key, Arc::clone(&entry));
        Ok((entry, true))
    }

    /// Get a canonical instance by entity type and primary key.
    #[must_use]
    pub fn get(&self, entity_type: &'static EntityType, pk: &Value) -> Option<EntityRef> {
        self.entries
            .get(&(entity_type.name, hash_key(pk)))
            .map(Arc::clone)
    }

    /// Check whether an instance exists for the given key.
    #[must_use]
    pub fn contains(&self, entity_type: &'static EntityType, pk: &Value) -> bool {
        self.entries.contains_key(&(entity_type.name, hash_key(pk)))
    }

    /// Number of interned instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all interned instances.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
