//! Turns a [`QueryDescriptor`] into a filtered, ordered and paged query

use crate::entity::{
    FieldDef, FieldRegistry, FieldValue, Predicate, Queryable, ScalarType, SortDirection, SortKey,
    Timestamp,
};
use crate::lazy::convert::{convert_to_type, has_value, parse_bool, value_text};
use crate::lazy::descriptor::{FilterScope, FilterSpec, MatchMode, QueryDescriptor, SortMeta};
use crate::lazy::error::QueryError;
use crate::lazy::predicate::{FilterPredicateBuilder, GlobalTerm};
use crate::result::QueryResult;
use chrono::NaiveDate;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Stateless lazy-loading query engine.
///
/// Validation happens before anything is applied, so a rejected descriptor
/// never yields a partially filtered query.
#[derive(Debug, Clone, Copy, Default)]
pub struct LazyQueryEngine;

impl LazyQueryEngine {
    pub fn new() -> Self {
        Self
    }

    /// Apply filters and ordering from `descriptor` to `query`.
    pub fn filter_and_order<T, Q>(
        &self,
        descriptor: &QueryDescriptor,
        query: Q,
    ) -> Result<Q, QueryError>
    where
        T: FieldRegistry + 'static,
        Q: Queryable<T>,
    {
        let numeric_fields: HashSet<&'static str> = T::fields()
            .iter()
            .filter(|f| f.field_type.is_numeric())
            .map(|f| f.name)
            .collect();

        let (global_terms, local_filters) = split_filters(descriptor);

        let invalid: Vec<String> = local_filters
            .iter()
            .filter(|(key, _)| T::find_field(key).is_none())
            .map(|(key, _)| key.to_string())
            .collect();
        if !invalid.is_empty() {
            return Err(QueryError::InvalidFilterColumn { columns: invalid });
        }

        let invalid: Vec<String> = global_terms
            .iter()
            .filter(|term| T::find_field(&term.field).is_none())
            .map(|term| term.field.clone())
            .collect();
        if !invalid.is_empty() {
            return Err(QueryError::InvalidGlobalFilterColumn { columns: invalid });
        }

        let global = if global_terms.is_empty() {
            None
        } else {
            Some(FilterPredicateBuilder::global::<T>(&global_terms)?)
        };
        let ordering = sort_keys::<T>(descriptor)?;

        let mut query = query;
        for (key, spec) in local_filters {
            let Some(def) = T::find_field(key) else {
                continue;
            };

            // numeric columns get the value converted up front; a value that
            // does not convert leaves the query unchanged. `in` converts per element.
            let convert_up_front =
                numeric_fields.contains(def.name) && spec.match_mode != MatchMode::In;
            let converted = if convert_up_front {
                match convert_to_type(&spec.value, def.field_type.scalar) {
                    Ok(value) => Some(value),
                    Err(err) => {
                        debug!("Ignoring filter on '{}': {}", def.name, err);
                        continue;
                    }
                }
            } else {
                None
            };

            match local_predicate::<T>(def, spec, converted) {
                Some(predicate) => query = query.filter(predicate),
                None => debug!(
                    "Filter on '{}' with mode '{}' left the query unchanged",
                    def.name, spec.match_mode
                ),
            }
        }

        if let Some(predicate) = global {
            query = query.filter(predicate);
        }

        if let Some(keys) = ordering {
            query = query.order_by(keys);
        }

        Ok(query)
    }

    /// Filter, order, count and page in one go.
    pub fn execute<T, Q>(
        &self,
        descriptor: &QueryDescriptor,
        query: Q,
    ) -> Result<QueryResult<T>, QueryError>
    where
        T: FieldRegistry + 'static,
        Q: Queryable<T>,
    {
        let (first, rows) = match (descriptor.first, descriptor.rows) {
            (Some(first), Some(rows)) => (first, rows),
            (first, rows) => {
                let mut missing = Vec::new();
                if first.is_none() {
                    missing.push("First");
                }
                if rows.is_none() {
                    missing.push("Rows");
                }
                return Err(QueryError::MissingPagination { missing });
            }
        };

        let query = self.filter_and_order(descriptor, query)?;
        let total = query.count();
        let data = query.page(first.max(0) as usize, rows.max(0) as usize);

        Ok(QueryResult::success(total, data))
    }
}

/// Global terms (every entry of `global_filters` plus global-scope entries of
/// `filters`, value rendered as text) and local filters (local-scope entries
/// that carry a value).
fn split_filters(descriptor: &QueryDescriptor) -> (Vec<GlobalTerm>, Vec<(&str, &FilterSpec)>) {
    let filters = descriptor.filters.iter().flatten();
    let global_filters = descriptor.global_filters.iter().flatten();

    let global = global_filters
        .chain(filters.clone().filter(|(_, spec)| spec.scope == FilterScope::Global))
        .map(|(key, spec)| {
            GlobalTerm::new(key.as_str(), value_text(&spec.value).unwrap_or_default())
        })
        .collect();

    let local = filters
        .filter(|(_, spec)| spec.scope == FilterScope::Local && has_value(&spec.value))
        .map(|(key, spec)| (key.as_str(), spec))
        .collect();

    (global, local)
}

fn sort_keys<T: FieldRegistry>(
    descriptor: &QueryDescriptor,
) -> Result<Option<Vec<SortKey>>, QueryError> {
    let multi: &[SortMeta] = descriptor.multi_sort.as_deref().unwrap_or(&[]);

    if !multi.is_empty() {
        let invalid: Vec<String> = multi
            .iter()
            .filter(|meta| T::find_field(&meta.field).is_none())
            .map(|meta| meta.field.clone())
            .collect();
        if !invalid.is_empty() {
            return Err(QueryError::InvalidSortColumn { columns: invalid });
        }

        let keys = multi
            .iter()
            .filter_map(|meta| {
                T::find_field(&meta.field).map(|def| SortKey {
                    field: def.name,
                    direction: SortDirection::from_order(meta.order),
                })
            })
            .collect();
        return Ok(Some(keys));
    }

    match descriptor.sort_field.as_deref() {
        Some(field) if !field.is_empty() => {
            let def = T::find_field(field).ok_or_else(|| QueryError::InvalidSortColumn {
                columns: vec![field.to_string()],
            })?;
            Ok(Some(vec![SortKey {
                field: def.name,
                direction: SortDirection::from_order(descriptor.sort_order),
            }]))
        }
        _ => Ok(None),
    }
}

/// Predicate for one local filter, or `None` when the mode does not apply to
/// the field or the value cannot be used.
fn local_predicate<T>(
    def: &FieldDef,
    spec: &FilterSpec,
    converted: Option<FieldValue>,
) -> Option<Predicate<T>>
where
    T: FieldRegistry + 'static,
{
    let name = def.name;
    let scalar = def.field_type.scalar;
    let text = value_text(&spec.value)?;
    let operand = || converted.clone().or_else(|| convert_to_type(&spec.value, scalar).ok());

    match &spec.match_mode {
        MatchMode::StartsWith if scalar.is_textual() => {
            text_predicate(name, move |s| s.starts_with(text.as_str()))
        }
        MatchMode::EndsWith if scalar.is_textual() => {
            text_predicate(name, move |s| s.ends_with(text.as_str()))
        }
        MatchMode::NotContains if scalar.is_textual() => {
            text_predicate(name, move |s| !s.contains(text.as_str()))
        }
        MatchMode::Contains if scalar == ScalarType::Boolean => {
            let flag = FieldValue::Boolean(parse_bool(&text)?);
            compare_predicate(name, flag, |ord| ord == Ordering::Equal)
        }
        MatchMode::Contains if scalar.is_textual() => {
            text_predicate(name, move |s| s.contains(text.as_str()))
        }
        MatchMode::Equals | MatchMode::Is => {
            compare_predicate(name, operand()?, |ord| ord == Ordering::Equal)
        }
        MatchMode::NotEquals => {
            let expected = operand()?;
            Some(Arc::new(move |row: &T| {
                row.field_value(name)
                    .map(|actual| actual.compare(&expected) != Some(Ordering::Equal))
                    .unwrap_or(false)
            }))
        }
        MatchMode::Gt => compare_predicate(name, operand()?, |ord| ord == Ordering::Greater),
        MatchMode::Lt => compare_predicate(name, operand()?, |ord| ord == Ordering::Less),
        MatchMode::DateIs if scalar == ScalarType::Timestamp => {
            date_predicate(name, &text, false, |field, day| field == day)
        }
        MatchMode::DateIsNot if scalar == ScalarType::Timestamp => {
            date_predicate(name, &text, true, |field, day| field != day)
        }
        MatchMode::DateAfter if scalar == ScalarType::Timestamp => {
            date_predicate(name, &text, false, |field, day| field > day)
        }
        MatchMode::DateBefore if scalar == ScalarType::Timestamp => {
            date_predicate(name, &text, false, |field, day| field < day)
        }
        MatchMode::In => in_predicate(name, scalar, &spec.value),
        _ => None,
    }
}

fn text_predicate<T, F>(name: &'static str, test: F) -> Option<Predicate<T>>
where
    T: FieldRegistry + 'static,
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    Some(Arc::new(move |row: &T| {
        matches!(row.field_value(name), Some(FieldValue::String(s)) if test(&s))
    }))
}

fn compare_predicate<T>(
    name: &'static str,
    expected: FieldValue,
    accept: fn(Ordering) -> bool,
) -> Option<Predicate<T>>
where
    T: FieldRegistry + 'static,
{
    Some(Arc::new(move |row: &T| {
        row.field_value(name)
            .and_then(|actual| actual.compare(&expected))
            .is_some_and(accept)
    }))
}

/// Compares calendar dates only. Null fields match only when `null_matches`.
fn date_predicate<T>(
    name: &'static str,
    raw: &str,
    null_matches: bool,
    accept: fn(NaiveDate, NaiveDate) -> bool,
) -> Option<Predicate<T>>
where
    T: FieldRegistry + 'static,
{
    let day = Timestamp::parse_lenient(raw)?.date();
    Some(Arc::new(move |row: &T| match row.field_value(name) {
        Some(FieldValue::Timestamp(ts)) => accept(ts.date(), day),
        Some(FieldValue::Null) => null_matches,
        _ => false,
    }))
}

/// Membership in a JSON array of values, each converted to the field's type.
fn in_predicate<T>(name: &'static str, scalar: ScalarType, raw: &Value) -> Option<Predicate<T>>
where
    T: FieldRegistry + 'static,
{
    let Value::Array(items) = raw else {
        return None;
    };

    let allowed = items
        .iter()
        .map(|item| {
            let text = value_text(item)?;
            convert_to_type(&Value::String(text), scalar).ok()
        })
        .collect::<Option<Vec<FieldValue>>>()?;

    Some(Arc::new(move |row: &T| {
        row.field_value(name).is_some_and(|actual| {
            allowed
                .iter()
                .any(|candidate| actual.compare(candidate) == Some(Ordering::Equal))
        })
    }))
}
