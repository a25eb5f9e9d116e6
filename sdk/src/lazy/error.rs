//! Errors raised while turning a query descriptor into a query

use crate::entity::ScalarType;
use thiserror::Error;

/// A raw filter value that cannot be represented as the target field type
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot convert '{value}' to {target}")]
pub struct ConversionError {
    pub value: String,
    pub target: ScalarType,
}

impl ConversionError {
    pub fn new(value: impl Into<String>, target: ScalarType) -> Self {
        Self {
            value: value.into(),
            target,
        }
    }
}

/// Caller-input errors. Any of these aborts the whole query build.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Filters contain invalid columns: {}", .columns.join(", "))]
    InvalidFilterColumn { columns: Vec<String> },

    #[error("Global filters contain invalid columns: {}", .columns.join(", "))]
    InvalidGlobalFilterColumn { columns: Vec<String> },

    #[error("Invalid columns for sorting: {}", .columns.join(", "))]
    InvalidSortColumn { columns: Vec<String> },

    #[error("Field '{field}' does not exist on '{entity}'")]
    FieldNotFound { entity: String, field: String },

    #[error(
        "The '{operation}' operation can only be used on string fields. \
         Field '{field}' is of type '{field_type}'"
    )]
    UnsupportedFieldType {
        field: String,
        field_type: String,
        operation: String,
    },

    #[error("Value for field '{field}' is not usable: {source}")]
    TypeConversion {
        field: String,
        #[source]
        source: ConversionError,
    },

    #[error("Descriptor is missing mandatory pagination parameters: {}", .missing.join(", "))]
    MissingPagination { missing: Vec<&'static str> },
}

impl QueryError {
    pub fn field_not_found<T: ?Sized>(field: &str) -> Self {
        Self::FieldNotFound {
            entity: short_type_name::<T>().to_string(),
            field: field.to_string(),
        }
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
