//! Predicate expressions for query descriptors.
//!
//! Predicates are built against entity *properties*, not columns; the
//! backend decides how to translate them. `evaluate` gives in-memory
//! backends (and tests) reference semantics: comparisons involving NULL are
//! false, matching SQL three-valued logic collapsed to a boolean.

use splitfetch_core::{EntityData, Value};

/// A filter predicate over one entity record.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `property = value`
    Eq {
        /// Property name on the entity.
        property: &'static str,
        /// Comparand.
        value: Value,
    },
    /// `property <> value`
    Ne {
        /// Property name on the entity.
        property: &'static str,
        /// Comparand.
        value: Value,
    },
    /// `property > value`
    Gt {
        /// Property name on the entity.
        property: &'static str,
        /// Comparand.
        value: Value,
    },
    /// `property < value`
    Lt {
        /// Property name on the entity.
        property: &'static str,
        /// Comparand.
        value: Value,
    },
    /// `property IN (values...)`, the filter shape child queries use to
    /// select rows whose parent key is in a key set.
    KeyIn {
        /// Property name on the entity.
        property: &'static str,
        /// The key set.
        values: Vec<Value>,
    },
    /// Logical AND.
    And(Box<Expr>, Box<Expr>),
    /// Logical OR.
    Or(Box<Expr>, Box<Expr>),
    /// Logical NOT.
    Not(Box<Expr>),
}

impl Expr {
    /// `property = value`
    #[must_use]
    pub fn eq(property: &'static str, value: impl Into<Value>) -> Self {
        Expr::Eq {
            property,
            value: value.into(),
        }
    }

    /// `property <> value`
    #[must_use]
    pub fn ne(property: &'static str, value: impl Into<Value>) -> Self {
        Expr::Ne {
            property,
            value: value.into(),
        }
    }

    /// `property > value`
    #[must_use]
    pub fn gt(property: &'static str, value: impl Into<Value>) -> Self {
        Expr::Gt {
            property,
            value: value.into(),
        }
    }

    /// `property < value`
    #[must_use]
    pub fn lt(property: &'static str, value: impl Into<Value>) -> Self {
        Expr::Lt {
            property,
            value: value.into(),
        }
    }

    /// `property IN (values...)`
    #[must_use]
    pub fn key_in(property: &'static str, values: Vec<Value>) -> Self {
        Expr::KeyIn { property, values }
    }

    /// Combine with another predicate via AND.
    #[must_use]
    pub fn and(self, other: Expr) -> Self {
        Expr::And(Box::new(self), Box::new(other))
    }

    /// Combine with another predicate via OR.
    #[must_use]
    pub fn or(self, other: Expr) -> Self {
        Expr::Or(Box::new(self), Box::new(other))
    }

    /// Negate this predicate.
    #[must_use]
    pub fn negate(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Evaluate this predicate against one entity record.
    #[must_use]
    pub fn evaluate(&self, entity: &EntityData) -> bool {
        match self {
            Expr::Eq { property, value } => {
                compare(entity.get(property), value).is_some_and(|o| o == std::cmp::Ordering::Equal)
            }
            Expr::Ne { property, value } => {
                compare(entity.get(property), value).is_some_and(|o| o != std::cmp::Ordering::Equal)
            }
            Expr::Gt { property, value } => compare(entity.get(property), value)
                .is_some_and(|o| o == std::cmp::Ordering::Greater),
            Expr::Lt { property, value } => {
                compare(entity.get(property), value).is_some_and(|o| o == std::cmp::Ordering::Less)
            }
            Expr::KeyIn { property, values } => entity
                .get(property)
                .is_some_and(|v| !v.is_null() && values.contains(v)),
            Expr::And(a, b) => a.evaluate(entity) && b.evaluate(entity),
            Expr::Or(a, b) => a.evaluate(entity) || b.evaluate(entity),
            Expr::Not(inner) => !inner.evaluate(entity),
        }
    }
}

/// Compare an entity value against a comparand. `None` when either side is
/// NULL/missing or the values are not comparable.
fn compare(actual: Option<&Value>, expected: &Value) -> Option<std::cmp::Ordering> {
    let actual = actual?;
    if actual.is_null() || expected.is_null() {
        return None;
    }
    match (actual, expected) {
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
        (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
        _ => {
            let a = actual.as_f64()?;
            let b = expected.as_f64()?;
            a.partial_cmp(&b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitfetch_core::{EntityType, FieldInfo};

    static FIELDS: &[FieldInfo] = &[
        FieldInfo::new("id", "id").primary_key(true),
        FieldInfo::new("name", "name"),
        FieldInfo::new("age", "age"),
    ];
    static PERSON: EntityType = EntityType::new("Person", "people", FIELDS, &[]);

    fn person(id: i64, name: &str, age: Option<i64>) -> EntityData {
        EntityData::with_values(
            &PERSON,
            vec![
                ("id", Value::BigInt(id)),
                ("name", Value::from(name)),
                ("age", Value::from(age)),
            ],
        )
    }

    #[test]
    fn test_eq_and_ne() {
        let p = person(1, "Ada", Some(36));
        assert!(Expr::eq("name", "Ada").evaluate(&p));
        assert!(Expr::ne("name", "Bob").evaluate(&p));
        assert!(!Expr::eq("name", "Bob").evaluate(&p));
    }

    #[test]
    fn test_numeric_comparison_across_widths() {
        let p = person(1, "Ada", Some(36));
        assert!(Expr::gt("age", 30_i32).evaluate(&p));
        assert!(Expr::lt("age", 40_i64).evaluate(&p));
    }

    #[test]
    fn test_null_never_matches() {
        let p = person(1, "Ada", None);
        assert!(!Expr::eq("age", 36_i64).evaluate(&p));
        assert!(!Expr::ne("age", 36_i64).evaluate(&p));
        assert!(!Expr::key_in("age", vec![Value::Null]).evaluate(&p));
    }

    #[test]
    fn test_key_in() {
        let p = person(2, "Bob", Some(20));
        assert!(Expr::key_in("id", vec![Value::BigInt(1), Value::BigInt(2)]).evaluate(&p));
        assert!(!Expr::key_in("id", vec![Value::BigInt(3)]).evaluate(&p));
    }

    #[test]
    fn test_boolean_combinators() {
        let p = person(1, "Ada", Some(36));
        let e = Expr::eq("name", "Ada").and(Expr::gt("age", 30_i64));
        assert!(e.evaluate(&p));
        let e = Expr::eq("name", "Bob").or(Expr::gt("age", 30_i64));
        assert!(e.evaluate(&p));
        assert!(Expr::eq("name", "Bob").negate().evaluate(&p));
    }

    #[test]
    fn test_missing_property_is_false() {
        let p = person(1, "Ada", Some(36));
        assert!(!Expr::eq("height", 180_i64).evaluate(&p));
    }
}
