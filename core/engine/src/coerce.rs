//! FILENAME: core/engine/src/coerce.rs
//! PURPOSE: Numeric coercion of loosely-typed record fields.
//! CONTEXT: Intensity and likelihood are left untouched by normalization and
//! only coerced here, at aggregation/export time. Coercion never fails: a
//! value that is not a finite number yields the caller's default.

use serde_json::Value;

/// Attempts to read a finite number from a JSON value.
///
/// - numbers pass through
/// - strings are trimmed and parsed ("5", " 2.5 ", "1e3")
/// - booleans read as 1 / 0
/// - empty strings, arrays, objects, NaN and infinities are not numbers
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    n.is_finite().then_some(n)
}

/// Coerces an optional field value to a number, falling back to `default`.
pub fn coerce_number(value: Option<&Value>, default: f64) -> f64 {
    value.and_then(as_number).unwrap_or(default)
}

/// JavaScript-style truthiness of a field value: absent, null, false, 0,
/// NaN and the empty string are falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
