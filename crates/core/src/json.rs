//! Helpers for reading loosely typed JSON payload fields.
//!
//! Inbound payloads come from external systems that are not strict about
//! types: ids arrive as numbers or numeric strings, optional fields arrive as
//! `null`, `""` or `0`. These helpers give that input one consistent reading.

use serde_json::{Map, Number, Value};

use crate::error::{DomainError, DomainResult};
use crate::id::RecordId;

/// JSON object type used for request bodies.
pub type JsonObject = Map<String, Value>;

/// Whether a value counts as "given".
///
/// `null`, `false`, `0`, empty strings, empty arrays and empty objects do not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Returns the field only when it is present and truthy.
pub fn given<'a>(obj: &'a JsonObject, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| is_truthy(v))
}

/// Whether a value is a JSON number (booleans are not numbers).
pub fn is_numeric(value: &Value) -> bool {
    matches!(value, Value::Number(_))
}

/// Read an optional free-text field.
///
/// Numbers are accepted and rendered as text (phone numbers often arrive that
/// way). Whitespace-only strings count as absent.
pub fn optional_text(obj: &JsonObject, key: &str) -> DomainResult<Option<String>> {
    match given(obj, key) {
        None => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(DomainError::invalid_value(format!(
            "\"{key}\" must be a string, got {}",
            type_name(other)
        ))),
    }
}

/// Read an optional numeric field, keeping the number as supplied.
///
/// Numeric strings (`"100.50"`) are parsed into a number; blank strings count
/// as absent.
pub fn optional_number(obj: &JsonObject, key: &str) -> DomainResult<Option<Number>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.clone())),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<Number>().map(Some).map_err(|_| {
            DomainError::invalid_value(format!("\"{key}\" must be a number, got \"{s}\""))
        }),
        Some(other) => Err(DomainError::invalid_value(format!(
            "\"{key}\" must be a number, got {}",
            type_name(other)
        ))),
    }
}

/// Interpret a value as a record identifier.
///
/// Accepts integers, integral floats and numeric strings; the result must be
/// strictly positive.
pub fn record_id<T: RecordId>(value: &Value, field: &str) -> DomainResult<T> {
    let raw = match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(f as i64),
            _ => None,
        },
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match raw {
        Some(raw) if raw > 0 => Ok(T::from_raw(raw)),
        Some(raw) => Err(DomainError::invalid_value(format!(
            "\"{field}\" must be a positive integer, got {raw}"
        ))),
        None => Err(DomainError::invalid_value(format!(
            "invalid literal for \"{field}\": {value}"
        ))),
    }
}

/// Short JSON type name for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::PartnerId;
    use serde_json::json;

    fn obj(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn truthiness_matches_loose_payload_conventions() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!(5)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([1])));
    }

    #[test]
    fn booleans_are_not_numeric() {
        assert!(!is_numeric(&json!(true)));
        assert!(is_numeric(&json!(1.5)));
    }

    #[test]
    fn optional_text_renders_numbers_and_drops_blanks() {
        let o = obj(json!({"Phone": 5551234, "Fax": "   ", "Email": " a@b.c "}));
        assert_eq!(optional_text(&o, "Phone").unwrap().as_deref(), Some("5551234"));
        assert_eq!(optional_text(&o, "Fax").unwrap(), None);
        assert_eq!(optional_text(&o, "Email").unwrap().as_deref(), Some("a@b.c"));
        assert_eq!(optional_text(&o, "Missing").unwrap(), None);
    }

    #[test]
    fn optional_text_rejects_structured_values() {
        let o = obj(json!({"City": {"name": "Riyadh"}}));
        assert!(matches!(
            optional_text(&o, "City"),
            Err(DomainError::InvalidValue(_))
        ));
    }

    #[test]
    fn optional_number_keeps_representation() {
        let o = obj(json!({"a": 100, "b": 12.5, "c": null, "d": true}));
        assert_eq!(optional_number(&o, "a").unwrap(), Some(Number::from(100)));
        assert_eq!(optional_number(&o, "b").unwrap().and_then(|n| n.as_f64()), Some(12.5));
        assert_eq!(optional_number(&o, "c").unwrap(), None);
        assert!(optional_number(&o, "d").is_err());
    }

    #[test]
    fn optional_number_parses_numeric_strings() {
        let o = obj(json!({"a": "100.50", "b": " 7 ", "c": "  ", "d": "15%", "e": "NaN"}));
        assert_eq!(optional_number(&o, "a").unwrap().and_then(|n| n.as_f64()), Some(100.5));
        assert_eq!(optional_number(&o, "b").unwrap(), Some(Number::from(7)));
        assert_eq!(optional_number(&o, "c").unwrap(), None);
        assert!(matches!(optional_number(&o, "d"), Err(DomainError::InvalidValue(_))));
        assert!(optional_number(&o, "e").is_err());
    }

    #[test]
    fn record_id_accepts_numbers_and_numeric_strings() {
        let a: PartnerId = record_id(&json!(5), "partner_id").unwrap();
        let b: PartnerId = record_id(&json!("5"), "partner_id").unwrap();
        let c: PartnerId = record_id(&json!(5.0), "partner_id").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn record_id_rejects_garbage() {
        assert!(record_id::<PartnerId>(&json!("abc"), "partner_id").is_err());
        assert!(record_id::<PartnerId>(&json!(-1), "partner_id").is_err());
        assert!(record_id::<PartnerId>(&json!(2.5), "partner_id").is_err());
        assert!(record_id::<PartnerId>(&json!([1]), "partner_id").is_err());
    }
}
