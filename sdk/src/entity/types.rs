//! Core types for the entity framework

use bigdecimal::BigDecimal as BigDecimalImpl;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// BigDecimal type for high-precision decimal numbers
pub type BigDecimal = BigDecimalImpl;

/// Timestamp type for date/time values
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a new Timestamp from a DateTime<Utc>
    pub fn new(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Create a Timestamp from seconds since Unix epoch
    pub fn from_timestamp(secs: i64, nsecs: u32) -> Option<Self> {
        DateTime::from_timestamp(secs, nsecs).map(Self)
    }

    /// Create a Timestamp representing the current moment
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Get the inner DateTime<Utc>
    pub fn datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Calendar date component (UTC)
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Convert to RFC3339 string
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Parse from RFC3339 string
    pub fn from_rfc3339(s: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Lenient parse used for client supplied filter values: RFC3339, then
    /// `YYYY-MM-DDTHH:MM:SS`, then a bare `YYYY-MM-DD` (midnight UTC).
    pub fn parse_lenient(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(ts) = Self::from_rfc3339(s) {
            return Some(ts);
        }
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(Self(naive.and_utc()));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Self(naive.and_utc()))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }
}

impl std::ops::Deref for Timestamp {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Scalar types an entity field can be declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    Id,
    String,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    Boolean,
    Timestamp,
}

impl ScalarType {
    /// Integer, floating point and decimal types
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarType::Int16
                | ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::Float32
                | ScalarType::Float64
                | ScalarType::Decimal
        )
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, ScalarType::Int16 | ScalarType::Int32 | ScalarType::Int64)
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, ScalarType::String)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Id => "Id",
            ScalarType::String => "String",
            ScalarType::Int16 => "Int16",
            ScalarType::Int32 => "Int32",
            ScalarType::Int64 => "Int64",
            ScalarType::Float32 => "Float32",
            ScalarType::Float64 => "Float64",
            ScalarType::Decimal => "Decimal",
            ScalarType::Boolean => "Boolean",
            ScalarType::Timestamp => "Timestamp",
        };
        write!(f, "{}", name)
    }
}

/// Declared type of an entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldType {
    pub scalar: ScalarType,
    pub nullable: bool,
}

impl FieldType {
    pub const fn required(scalar: ScalarType) -> Self {
        Self {
            scalar,
            nullable: false,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.scalar.is_numeric()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}?", self.scalar)
        } else {
            write!(f, "{}", self.scalar)
        }
    }
}

/// One entry of an entity's field registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub field_type: FieldType,
}

/// Runtime value of an entity field, tagged by kind
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Id(uuid::Uuid),
    String(String),
    Int(i64),
    Float(f64),
    Decimal(BigDecimal),
    Boolean(bool),
    Timestamp(Timestamp),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Compare two values of a compatible kind. `None` when either side is
    /// null or the kinds cannot be compared.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        use FieldValue::*;
        match (self, other) {
            (Id(a), Id(b)) => Some(a.cmp(b)),
            (String(a), String(b)) => Some(a.cmp(b)),
            (Int(a), Int(b)) => Some(a.cmp(b)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)),
            (Decimal(a), Decimal(b)) => Some(a.cmp(b)),
            (Decimal(a), Int(b)) => Some(a.cmp(&BigDecimal::from(*b))),
            (Int(a), Decimal(b)) => Some(BigDecimal::from(*a).cmp(b)),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order used for sorting: nulls first, then by value, falling back
    /// to a fixed kind rank for values that cannot be compared. Floats use
    /// `f64::total_cmp`, so NaN sorts after every number.
    pub fn sort_cmp(&self, other: &FieldValue) -> Ordering {
        use FieldValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            _ => self
                .compare(other)
                .unwrap_or_else(|| self.kind_rank().cmp(&other.kind_rank())),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Boolean(_) => 1,
            FieldValue::Int(_) | FieldValue::Float(_) | FieldValue::Decimal(_) => 2,
            FieldValue::Timestamp(_) => 3,
            FieldValue::Id(_) => 4,
            FieldValue::String(_) => 5,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Id(u) => write!(f, "{}", u),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Timestamp(t) => write!(f, "{}", t),
        }
    }
}

/// Comprehensive error type for entity operations
#[derive(Error, Debug)]
pub enum EntityError {
    /// Entity not found by the given ID
    #[error("Entity '{entity_type}' with id '{id}' not found")]
    NotFound { entity_type: String, id: String },

    /// Invalid entity ID format
    #[error("Invalid ID format for entity '{entity_type}': {reason}")]
    InvalidId { entity_type: String, reason: String },

    /// Validation error for entity fields
    #[error("Validation error for entity '{entity_type}': {field} - {reason}")]
    Validation {
        entity_type: String,
        field: String,
        reason: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error for entity '{entity_type}': {message}")]
    Serialization { entity_type: String, message: String },

    /// Database/store operation error
    #[error("Store operation failed for entity '{entity_type}': {operation} - {reason}")]
    Store {
        entity_type: String,
        operation: String,
        reason: String,
    },
}

impl EntityError {
    /// Create a NotFound error
    pub fn not_found<E: AsRef<str>, I: fmt::Display>(entity_type: E, id: I) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }

    /// Create an InvalidId error
    pub fn invalid_id<E: AsRef<str>, R: AsRef<str>>(entity_type: E, reason: R) -> Self {
        Self::InvalidId {
            entity_type: entity_type.as_ref().to_string(),
            reason: reason.as_ref().to_string(),
        }
    }

    /// Create a Validation error
    pub fn validation<E: AsRef<str>, F: AsRef<str>, R: AsRef<str>>(
        entity_type: E,
        field: F,
        reason: R,
    ) -> Self {
        Self::Validation {
            entity_type: entity_type.as_ref().to_string(),
            field: field.as_ref().to_string(),
            reason: reason.as_ref().to_string(),
        }
    }

    /// Create a Serialization error
    pub fn serialization<E: AsRef<str>>(entity_type: E, source: serde_json::Error) -> Self {
        Self::Serialization {
            entity_type: entity_type.as_ref().to_string(),
            message: source.to_string(),
        }
    }

    /// Create a Store error
    pub fn store<E: AsRef<str>, O: AsRef<str>, R: AsRef<str>>(
        entity_type: E,
        operation: O,
        reason: R,
    ) -> Self {
        Self::Store {
            entity_type: entity_type.as_ref().to_string(),
            operation: operation.as_ref().to_string(),
            reason: reason.as_ref().to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for entity operations
pub type EntityResult<T> = Result<T, EntityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_sort_first() {
        let mut values = vec![
            FieldValue::Int(3),
            FieldValue::Null,
            FieldValue::Int(1),
        ];
        values.sort_by(|a, b| a.sort_cmp(b));
        assert_eq!(
            values,
            vec![FieldValue::Null, FieldValue::Int(1), FieldValue::Int(3)]
        );
    }

    #[test]
    fn nan_sorts_after_every_number() {
        let mut values = vec![
            FieldValue::Float(2.5),
            FieldValue::Float(f64::NAN),
            FieldValue::Null,
            FieldValue::Float(-1.0),
            FieldValue::Float(f64::NAN),
            FieldValue::Float(0.5),
        ];
        values.sort_by(|a, b| a.sort_cmp(b));

        assert_eq!(values[0], FieldValue::Null);
        assert_eq!(&values[1..4], &[
            FieldValue::Float(-1.0),
            FieldValue::Float(0.5),
            FieldValue::Float(2.5),
        ]);
        assert!(values[4..]
            .iter()
            .all(|v| matches!(v, FieldValue::Float(f) if f.is_nan())));
        assert_eq!(
            FieldValue::Float(f64::NAN).sort_cmp(&FieldValue::Int(7)),
            Ordering::Greater
        );
    }

    #[test]
    fn mixed_numeric_kinds_compare() {
        let dec: BigDecimal = "2.5".parse().unwrap();
        assert_eq!(
            FieldValue::Decimal(dec).compare(&FieldValue::Int(2)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            FieldValue::Int(2).compare(&FieldValue::Float(2.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(FieldValue::Null.compare(&FieldValue::Int(1)), None);
    }

    #[test]
    fn lenient_timestamp_parsing() {
        let day = Timestamp::parse_lenient("2024-03-05").unwrap();
        assert_eq!(day.date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());

        let full = Timestamp::parse_lenient("2024-03-05T17:30:00Z").unwrap();
        assert_eq!(full.date(), day.date());

        assert!(Timestamp::parse_lenient("not a date").is_none());
    }

    #[test]
    fn nullable_field_type_display() {
        let ty = FieldType::required(ScalarType::Decimal).nullable();
        assert!(ty.nullable);
        assert!(ty.is_numeric());
        assert_eq!(ty.to_string(), "Decimal?");
    }
}
