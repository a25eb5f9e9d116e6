//! Coercion of raw client filter values into typed field values

use crate::entity::{BigDecimal, FieldValue, ScalarType, Timestamp};
use crate::lazy::error::ConversionError;
use serde_json::Value;
use std::str::FromStr;

/// Text form of a raw value; `None` for JSON null.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// True when the value carries something to filter on
pub fn has_value(value: &Value) -> bool {
    value_text(value).is_some_and(|s| !s.is_empty())
}

/// Case-insensitive `true`/`false`, surrounding whitespace ignored
pub fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Lenient numeric parse used for search input.
///
/// A decimal comma is read as a point. For integral targets, when splitting on
/// `.` leaves exactly one non-empty piece (`"12."`), that piece is parsed.
/// Culture invariant otherwise.
pub fn try_parse_numeric(raw: &str, scalar: ScalarType) -> Option<FieldValue> {
    let mut text = raw.trim().replace(',', ".");
    if scalar.is_integral() {
        let parts: Vec<&str> = text.split('.').filter(|p| !p.is_empty()).collect();
        if parts.len() == 1 {
            text = parts[0].to_string();
        }
    }

    match scalar {
        ScalarType::Int16 => text.parse::<i16>().ok().map(|v| FieldValue::Int(i64::from(v))),
        ScalarType::Int32 => text.parse::<i32>().ok().map(|v| FieldValue::Int(i64::from(v))),
        ScalarType::Int64 => text.parse::<i64>().ok().map(FieldValue::Int),
        ScalarType::Float32 => text
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| FieldValue::Float(f64::from(v))),
        ScalarType::Float64 => text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(FieldValue::Float),
        ScalarType::Decimal => BigDecimal::from_str(&text).ok().map(FieldValue::Decimal),
        _ => None,
    }
}

/// Convert a raw value to the given scalar type (nullable wrappers are the
/// caller's concern: pass the underlying scalar).
pub fn convert_to_type(value: &Value, scalar: ScalarType) -> Result<FieldValue, ConversionError> {
    let fail = || ConversionError::new(value_text(value).unwrap_or_else(|| "null".into()), scalar);

    match (scalar, value) {
        (_, Value::Null) => Err(fail()),
        (ScalarType::String, v) => value_text(v).map(FieldValue::String).ok_or_else(fail),
        (ScalarType::Id, Value::String(s)) => uuid::Uuid::parse_str(s.trim())
            .map(FieldValue::Id)
            .map_err(|_| fail()),
        (ScalarType::Boolean, Value::Bool(b)) => Ok(FieldValue::Boolean(*b)),
        (ScalarType::Boolean, Value::String(s)) => {
            parse_bool(s).map(FieldValue::Boolean).ok_or_else(fail)
        }
        (ScalarType::Timestamp, Value::String(s)) => Timestamp::parse_lenient(s)
            .map(FieldValue::Timestamp)
            .ok_or_else(fail),
        (s, Value::Number(n)) if s.is_integral() => {
            let int = n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .ok_or_else(fail)?;
            try_parse_numeric(&int.to_string(), s).ok_or_else(fail)
        }
        (s, Value::Number(n)) if s.is_numeric() => {
            try_parse_numeric(&n.to_string(), s).ok_or_else(fail)
        }
        (s, Value::String(text)) if s.is_numeric() => try_parse_numeric(text, s).ok_or_else(fail),
        _ => Err(fail()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_parsing_accepts_decimal_comma() {
        assert_eq!(
            try_parse_numeric("12,5", ScalarType::Decimal),
            Some(FieldValue::Decimal(BigDecimal::from_str("12.5").unwrap()))
        );
        assert_eq!(
            try_parse_numeric("3,25", ScalarType::Float64),
            Some(FieldValue::Float(3.25))
        );
    }

    #[test]
    fn integral_parsing_drops_trailing_separator() {
        assert_eq!(try_parse_numeric("42.", ScalarType::Int32), Some(FieldValue::Int(42)));
        assert_eq!(try_parse_numeric("42.5", ScalarType::Int32), None);
        assert_eq!(try_parse_numeric("abc", ScalarType::Int64), None);
        assert_eq!(try_parse_numeric("70000", ScalarType::Int16), None);
    }

    #[test]
    fn converts_json_numbers_to_integral_fields() {
        assert_eq!(
            convert_to_type(&json!(7), ScalarType::Int32),
            Ok(FieldValue::Int(7))
        );
        assert_eq!(
            convert_to_type(&json!(7.0), ScalarType::Int32),
            Ok(FieldValue::Int(7))
        );
        assert!(convert_to_type(&json!(7.5), ScalarType::Int32).is_err());
    }

    #[test]
    fn converts_identifiers_booleans_and_dates() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            convert_to_type(&json!(id.to_string()), ScalarType::Id),
            Ok(FieldValue::Id(id))
        );
        assert_eq!(
            convert_to_type(&json!("TRUE"), ScalarType::Boolean),
            Ok(FieldValue::Boolean(true))
        );
        assert!(matches!(
            convert_to_type(&json!("2024-01-31"), ScalarType::Timestamp),
            Ok(FieldValue::Timestamp(_))
        ));
        assert!(convert_to_type(&json!("yesterday"), ScalarType::Timestamp).is_err());
    }

    #[test]
    fn strings_accept_any_scalar_text() {
        assert_eq!(
            convert_to_type(&json!(15), ScalarType::String),
            Ok(FieldValue::String("15".to_string()))
        );
        assert!(convert_to_type(&Value::Null, ScalarType::String).is_err());
    }

    #[test]
    fn has_value_rejects_null_and_empty() {
        assert!(!has_value(&Value::Null));
        assert!(!has_value(&json!("")));
        assert!(has_value(&json!(0)));
        assert!(has_value(&json!(["a"])));
    }
}
