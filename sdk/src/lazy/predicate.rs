//! Per-field predicates built from a field name and a raw value

use crate::entity::{FieldRegistry, FieldValue, Predicate};
use crate::lazy::convert::{convert_to_type, try_parse_numeric};
use crate::lazy::error::QueryError;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// One column of a global search: field name and the raw search text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalTerm {
    pub field: String,
    pub value: String,
}

impl GlobalTerm {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Builds predicates the query layer cannot express generically
pub struct FilterPredicateBuilder;

impl FilterPredicateBuilder {
    /// Field equals `value` after converting `value` to the field's type.
    pub fn equality<T>(field: &str, value: &Value) -> Result<Predicate<T>, QueryError>
    where
        T: FieldRegistry + 'static,
    {
        let def = T::find_field(field).ok_or_else(|| QueryError::field_not_found::<T>(field))?;
        let expected = convert_to_type(value, def.field_type.scalar).map_err(|source| {
            QueryError::TypeConversion {
                field: def.name.to_string(),
                source,
            }
        })?;
        let name = def.name;

        Ok(Arc::new(move |row: &T| {
            row.field_value(name)
                .and_then(|actual| actual.compare(&expected))
                == Some(Ordering::Equal)
        }))
    }

    /// Textual field contains `value` (case-sensitive). Null fields never match.
    pub fn contains<T>(field: &str, value: &str) -> Result<Predicate<T>, QueryError>
    where
        T: FieldRegistry + 'static,
    {
        let def = T::find_field(field).ok_or_else(|| QueryError::field_not_found::<T>(field))?;
        if !def.field_type.scalar.is_textual() {
            return Err(QueryError::UnsupportedFieldType {
                field: def.name.to_string(),
                field_type: def.field_type.to_string(),
                operation: "Contains".to_string(),
            });
        }
        let name = def.name;
        let needle = value.to_string();

        Ok(Arc::new(move |row: &T| {
            matches!(row.field_value(name), Some(FieldValue::String(s)) if s.contains(&needle))
        }))
    }

    /// Predicate that matches nothing; the neutral start of an OR chain
    pub fn none<T: 'static>() -> Predicate<T> {
        Arc::new(|_: &T| false)
    }

    pub fn or<T: 'static>(left: Predicate<T>, right: Predicate<T>) -> Predicate<T> {
        Arc::new(move |row: &T| left(row) || right(row))
    }

    /// OR of one predicate per term: equality on numeric fields (terms that do
    /// not parse as a number are skipped), containment on everything else.
    /// With no usable term the result matches nothing.
    pub fn global<T>(terms: &[GlobalTerm]) -> Result<Predicate<T>, QueryError>
    where
        T: FieldRegistry + 'static,
    {
        let mut predicate = Self::none::<T>();

        for term in terms {
            let def = T::find_field(&term.field)
                .ok_or_else(|| QueryError::field_not_found::<T>(&term.field))?;

            let next = if def.field_type.is_numeric() {
                if try_parse_numeric(&term.value, def.field_type.scalar).is_none() {
                    debug!(
                        "Skipping global term '{}' for numeric field '{}'",
                        term.value, def.name
                    );
                    continue;
                }
                Self::equality::<T>(def.name, &Value::String(term.value.clone()))?
            } else {
                Self::contains::<T>(def.name, &term.value)?
            };

            predicate = Self::or(predicate, next);
        }

        Ok(predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone)]
    struct Part {
        code: String,
        note: Option<String>,
        stock: i32,
        active: bool,
    }

    crate::entity_fields!(Part {
        code: String => "code",
        note: Option<String> => "note",
        stock: i32 => "stock",
        active: bool => "active",
    });

    fn part(code: &str, note: Option<&str>, stock: i32) -> Part {
        Part {
            code: code.to_string(),
            note: note.map(str::to_string),
            stock,
            active: true,
        }
    }

    #[test]
    fn equality_coerces_the_value() {
        let p = FilterPredicateBuilder::equality::<Part>("Stock", &json!("12")).unwrap();
        assert!(p(&part("a", None, 12)));
        assert!(!p(&part("a", None, 13)));
    }

    #[test]
    fn equality_rejects_unknown_field() {
        let err = FilterPredicateBuilder::equality::<Part>("colour", &json!("red")).err();
        assert!(matches!(err, Some(QueryError::FieldNotFound { field, .. }) if field == "colour"));
    }

    #[test]
    fn contains_is_case_sensitive_and_skips_nulls() {
        let p = FilterPredicateBuilder::contains::<Part>("note", "Brass").unwrap();
        assert!(p(&part("a", Some("Brass fitting"), 1)));
        assert!(!p(&part("a", Some("brass fitting"), 1)));
        assert!(!p(&part("a", None, 1)));
    }

    #[test]
    fn contains_requires_textual_field() {
        let err = FilterPredicateBuilder::contains::<Part>("active", "true").err();
        assert!(matches!(err, Some(QueryError::UnsupportedFieldType { .. })));
    }

    #[test]
    fn global_ors_terms_together() {
        let p = FilterPredicateBuilder::global::<Part>(&[
            GlobalTerm::new("code", "X"),
            GlobalTerm::new("stock", "5"),
        ])
        .unwrap();

        assert!(p(&part("AX-1", None, 0)));
        assert!(p(&part("B-2", None, 5)));
        assert!(!p(&part("B-3", None, 6)));
    }

    #[test]
    fn global_without_usable_terms_matches_nothing() {
        let terms = [GlobalTerm::new("stock", "lots")];
        let p = FilterPredicateBuilder::global::<Part>(&terms).unwrap();
        assert!(!p(&part("A", None, 1)));

        let empty = FilterPredicateBuilder::global::<Part>(&[]).unwrap();
        assert!(!empty(&part("A", None, 1)));
    }
}
