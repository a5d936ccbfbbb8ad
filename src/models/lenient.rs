//! Lenient coercion of loosely-typed request and catalog fields.
//!
//! Malformed numbers degrade to 0 instead of failing the whole request.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a float from text; non-finite or unparseable input yields 0.
pub fn parse_f64(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Coerce a JSON value to a finite float.
pub fn coerce_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_f64(s),
        _ => 0.0,
    }
}

/// Like [`coerce_f64`], but an absent or null field stays `None`.
pub fn coerce_opt_f64(value: Option<&Value>) -> Option<f64> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(coerce_f64(v)),
    }
}

/// Coerce a JSON value to an integer identifier.
pub fn coerce_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| v as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a JSON value to a boolean flag.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "y"
        ),
        _ => false,
    }
}

/// `deserialize_with` adapter for [`coerce_f64`].
pub fn de_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value))
}

/// `deserialize_with` adapter for [`coerce_id`]; an unparseable id is an error.
pub fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    coerce_id(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid identifier: {}", value)))
}

/// `deserialize_with` adapter for optional lenient floats.
pub fn de_opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_opt_f64(value.as_ref()))
}

/// `deserialize_with` adapter for optional counts; malformed or negative
/// values are treated as absent.
pub fn de_opt_count<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<usize>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_opt_f64(value.as_ref())
        .filter(|v| *v >= 1.0)
        .map(|v| v.round() as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_f64_numbers_and_strings() {
        assert_eq!(coerce_f64(&json!(12.5)), 12.5);
        assert_eq!(coerce_f64(&json!("40")), 40.0);
        assert_eq!(coerce_f64(&json!(" 7.5 ")), 7.5);
    }

    #[test]
    fn test_coerce_f64_garbage_is_zero() {
        assert_eq!(coerce_f64(&json!("abc")), 0.0);
        assert_eq!(coerce_f64(&json!("NaN")), 0.0);
        assert_eq!(coerce_f64(&json!("inf")), 0.0);
        assert_eq!(coerce_f64(&json!(null)), 0.0);
        assert_eq!(coerce_f64(&json!([1, 2])), 0.0);
    }

    #[test]
    fn test_coerce_opt_f64_keeps_absence() {
        assert_eq!(coerce_opt_f64(None), None);
        assert_eq!(coerce_opt_f64(Some(&json!(null))), None);
        assert_eq!(coerce_opt_f64(Some(&json!("x"))), Some(0.0));
    }

    #[test]
    fn test_coerce_id() {
        assert_eq!(coerce_id(&json!(17)), Some(17));
        assert_eq!(coerce_id(&json!("17")), Some(17));
        assert_eq!(coerce_id(&json!(17.0)), Some(17));
        assert_eq!(coerce_id(&json!(17.5)), None);
        assert_eq!(coerce_id(&json!("seventeen")), None);
    }

    #[test]
    fn test_coerce_bool() {
        assert!(coerce_bool(&json!(true)));
        assert!(coerce_bool(&json!(1)));
        assert!(coerce_bool(&json!("true")));
        assert!(!coerce_bool(&json!(0)));
        assert!(!coerce_bool(&json!("no")));
        assert!(!coerce_bool(&json!(null)));
    }
}
