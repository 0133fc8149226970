//! Tolerant decoding of provider numerics.
//!
//! The provider emits the same numeric field as a JSON number, a numeric string, an
//! empty string, or null, varying per field and per record. Everything past this module
//! only sees `Option<f64>` / `Option<i64>`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScalarError {
    #[error("expected a number or numeric string, found {found}")]
    UnexpectedType { found: &'static str },
    #[error("'{raw}' is not a numeric value")]
    NotNumeric { raw: String },
}

/// Decode a float field. Empty strings and nulls are absent.
pub fn decode_float(value: &Value) -> Result<Option<f64>, ScalarError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => Ok(number.as_f64()),
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ScalarError::NotNumeric { raw: raw.clone() })
        }
        other => Err(ScalarError::UnexpectedType {
            found: type_name(other),
        }),
    }
}

/// Decode an integer field; fractional inputs such as `"4.00"` or `4.5` truncate toward zero.
pub fn decode_int(value: &Value) -> Result<Option<i64>, ScalarError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => match number.as_i64() {
            Some(int) => Ok(Some(int)),
            None => number
                .as_f64()
                .filter(|float| float.is_finite())
                .map(|float| Some(float.trunc() as i64))
                .ok_or_else(|| ScalarError::NotNumeric {
                    raw: number.to_string(),
                }),
        },
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if let Some(float) = trimmed.parse::<f64>().ok().filter(|f| f.is_finite()) {
                return Ok(Some(float.trunc() as i64));
            }
            trimmed
                .parse::<i64>()
                .map(Some)
                .map_err(|_| ScalarError::NotNumeric { raw: raw.clone() })
        }
        other => Err(ScalarError::UnexpectedType {
            found: type_name(other),
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `deserialize_with` adapter for optional float fields.
pub fn optional_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    match raw {
        Some(value) => decode_float(&value).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// `deserialize_with` adapter for optional integer fields.
pub fn optional_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    match raw {
        Some(value) => decode_int(&value).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
