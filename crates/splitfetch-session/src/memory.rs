//! An in-memory query backend.
//!
//! Holds rows per entity type and interprets query descriptors directly,
//! giving the split executor something real to run against in tests and
//! demos. Root-level fetch directives are honored the way a naive
//! join-based loader would honor them: the navigation is populated inline
//! while the rows materialize. Then-fetch directives are outside what a
//! single query can express here and are ignored with a debug log; the
//! split executor never sends them anyway.

use crate::backend::{QueryBackend, QueryResult};
use splitfetch_core::{
    EntityData, EntityType, Error, Result, Value, resolve_back_reference,
};
use splitfetch_query::{FetchBody, FetchKind, QueryNode, QuerySpec};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

type Row = Vec<(&'static str, Value)>;

/// A query backend over in-memory tables.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: HashMap<&'static str, (&'static EntityType, Vec<Row>)>,
    executed: usize,
    log: Vec<&'static str>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one row into an entity's table.
    pub fn insert(&mut self, entity: &'static EntityType, values: Row) {
        self.tables
            .entry(entity.name)
            .or_insert((entity, Vec::new()))
            .1
            .push(values);
    }

    /// Number of queries executed so far.
    #[must_use]
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Root entity names of executed queries, in execution order.
    #[must_use]
    pub fn execution_log(&self) -> &[&'static str] {
        &self.log
    }

    fn all_rows(&self, entity: &'static EntityType) -> Vec<EntityData> {
        self.tables
            .get(entity.name)
            .map(|(ty, rows)| {
                rows.iter()
                    .map(|row| EntityData::with_values(ty, row.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn rows_for(&self, node: &QueryNode) -> Result<Vec<EntityData>> {
        match node {
            QueryNode::Source { entity } => Ok(self.all_rows(entity)),
            QueryNode::Filter { input, predicate } => {
                let mut rows = self.rows_for(input)?;
                rows.retain(|row| predicate.evaluate(row));
                Ok(rows)
            }
            QueryNode::OrderBy {
                input,
                property,
                descending,
            } => {
                let mut rows = self.rows_for(input)?;
                rows.sort_by(|a, b| {
                    let ord = cmp_values(a.get(property), b.get(property));
                    if *descending { ord.reverse() } else { ord }
                });
                Ok(rows)
            }
            QueryNode::Skip { input, count } => {
                let mut rows = self.rows_for(input)?;
                let count = usize::try_from(*count).unwrap_or(usize::MAX);
                if count >= rows.len() {
                    rows.clear();
                } else {
                    rows.drain(..count);
                }
                Ok(rows)
            }
            QueryNode::Take { input, count } => {
                let mut rows = self.rows_for(input)?;
                rows.truncate(usize::try_from(*count).unwrap_or(usize::MAX));
                Ok(rows)
            }
            QueryNode::First { input } => {
                let mut rows = self.rows_for(input)?;
                rows.truncate(1);
                Ok(rows)
            }
            QueryNode::Fetch { input, body, kind } => {
                let mut rows = self.rows_for(input)?;
                match (body, kind) {
                    (FetchBody::Property(navigation), FetchKind::Root) => {
                        for row in &mut rows {
                            self.attach_navigation(row, navigation)?;
                        }
                    }
                    (_, FetchKind::Then) => {
                        debug!(?body, "ignoring then-fetch directive");
                    }
                    (FetchBody::Computed(detail), FetchKind::Root) => {
                        return Err(Error::UnsupportedFetchShape {
                            detail: (*detail).to_string(),
                        });
                    }
                }
                Ok(rows)
            }
        }
    }

    /// Populate one navigation on a freshly materialized row.
    fn attach_navigation(&self, row: &mut EntityData, navigation: &str) -> Result<()> {
        let entity = row.entity_type();
        let nav = entity
            .navigation(navigation)
            .ok_or_else(|| Error::MappingNotFound {
                entity: entity.name,
                detail: format!("navigation '{navigation}' is not declared"),
            })?;
        let back = resolve_back_reference(entity, nav.name)?;
        let pk = row.primary_key()?;

        let matched: Vec<EntityData> = self
            .all_rows(back.child)
            .into_iter()
            .filter(|child| {
                child
                    .get(back.key_property)
                    .is_some_and(|v| !v.is_null() && *v == pk)
            })
            .collect();

        if nav.is_collection() {
            let items = matched.into_iter().map(EntityData::into_ref).collect();
            row.set_collection_loaded(nav.name, items);
        } else {
            let target = matched.into_iter().next().map(EntityData::into_ref);
            row.set_reference_loaded(nav.name, target);
        }
        Ok(())
    }
}

impl QueryBackend for MemoryBackend {
    fn execute(&mut self, spec: &QuerySpec) -> Result<QueryResult> {
        self.executed += 1;
        self.log.push(spec.entity().name);

        let rows = self.rows_for(spec.node())?;
        if spec.is_single_shape() {
            Ok(QueryResult::Single(rows.into_iter().next()))
        } else {
            Ok(QueryResult::Entities(rows))
        }
    }
}

/// Ordering between two optional values, NULLs first, mirroring the
/// comparison rules filters use.
fn cmp_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), Some(_)) => Ordering::Less,
        (Some(_), None | Some(Value::Null)) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::Uuid(a), Value::Uuid(b)) => a.cmp(b),
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitfetch_core::{FieldInfo, NavigationInfo, NavigationKind};
    use splitfetch_query::Expr;

    static SONG_FIELDS: &[FieldInfo] = &[
        FieldInfo::new("id", "id").primary_key(true),
        FieldInfo::new("album_id", "album_id"),
        FieldInfo::new("title", "title"),
    ];
    static SONG: EntityType = EntityType::new("MSong", "songs", SONG_FIELDS, &[]);

    fn song_type() -> &'static EntityType {
        &SONG
    }

    static ALBUM_FIELDS: &[FieldInfo] = &[
        FieldInfo::new("id", "id").primary_key(true),
        FieldInfo::new("year", "year"),
    ];
    static ALBUM_NAVS: &[NavigationInfo] =
        &[NavigationInfo::new("songs", NavigationKind::Collection, song_type)
            .foreign_key(&["album_id"])];
    static ALBUM: EntityType = EntityType::new("MAlbum", "albums", ALBUM_FIELDS, ALBUM_NAVS);

    fn backend() -> MemoryBackend {
        let mut b = MemoryBackend::new();
        b.insert(&ALBUM, vec![("id", Value::BigInt(1)), ("year", Value::Int(1969))]);
        b.insert(&ALBUM, vec![("id", Value::BigInt(2)), ("year", Value::Int(1971))]);
        b.insert(
            &SONG,
            vec![
                ("id", Value::BigInt(10)),
                ("album_id", Value::BigInt(1)),
                ("title", Value::from("Alpha")),
            ],
        );
        b.insert(
            &SONG,
            vec![
                ("id", Value::BigInt(11)),
                ("album_id", Value::BigInt(1)),
                ("title", Value::from("Beta")),
            ],
        );
        b
    }

    fn entities(result: QueryResult) -> Vec<EntityData> {
        match result {
            QueryResult::Entities(rows) => rows,
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_source_returns_all_rows() {
        let mut b = backend();
        let rows = entities(b.execute(&QuerySpec::source(&ALBUM)).unwrap());
        assert_eq!(rows.len(), 2);
        assert_eq!(b.executed(), 1);
        assert_eq!(b.execution_log(), &["MAlbum"]);
    }

    #[test]
    fn test_filter_and_order() {
        let mut b = backend();
        let q = QuerySpec::source(&SONG)
            .filter(Expr::eq("album_id", 1_i64))
            .order_by("title", true);
        let rows = entities(b.execute(&q).unwrap());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("title"), Some(&Value::from("Beta")));
    }

    #[test]
    fn test_skip_take() {
        let mut b = backend();
        let q = QuerySpec::source(&SONG).order_by("id", false).skip(1).take(1);
        let rows = entities(b.execute(&q).unwrap());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id"), Some(&Value::BigInt(11)));
    }

    #[test]
    fn test_first_is_single_shaped() {
        let mut b = backend();
        let q = QuerySpec::source(&ALBUM).order_by("id", false).first();
        match b.execute(&q).unwrap() {
            QueryResult::Single(Some(row)) => {
                assert_eq!(row.get("id"), Some(&Value::BigInt(1)));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_root_fetch_populates_collection_inline() {
        let mut b = backend();
        let q = QuerySpec::source(&ALBUM).fetch("songs");
        let rows = entities(b.execute(&q).unwrap());

        assert!(rows[0].is_navigation_loaded("songs"));
        assert_eq!(rows[0].collection("songs").unwrap().items.len(), 2);
        assert!(rows[1].collection("songs").unwrap().items.is_empty());
    }

    #[test]
    fn test_unknown_table_is_empty() {
        static GHOST: EntityType = EntityType::new("MGhost", "ghosts", ALBUM_FIELDS, &[]);
        let mut b = backend();
        let rows = entities(b.execute(&QuerySpec::source(&GHOST)).unwrap());
        assert!(rows.is_empty());
    }
}
