//! FILENAME: core/engine/src/record.rs
//! PURPOSE: Defines the loosely-typed record as delivered by the data source.
//! CONTEXT: A RawRecord is a mapping of named fields where any field may be
//! absent, null, or of an unexpected JSON type. The typed accessors here are
//! the only place that knows how a JSON value turns into text or a number,
//! so call sites never special-case individual fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single record exactly as the data source delivered it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new() -> Self {
        RawRecord { fields: Map::new() }
    }

    /// Wraps any JSON value. Non-object values become an empty record so that
    /// a malformed array entry still occupies its position in the dataset.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => RawRecord { fields },
            _ => RawRecord::new(),
        }
    }

    /// Returns the field value, treating JSON null the same as absence.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self.fields.get(field) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Returns the field converted to text, or None when absent/null.
    /// The text is not trimmed.
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).map(value_to_text)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.set(field, value);
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(fields: Map<String, Value>) -> Self {
        RawRecord { fields }
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        RawRecord::from_value(value)
    }
}

/// Converts a JSON value to its display text.
///
/// Integral numbers print without a fractional part ("2020", not "2020.0"),
/// booleans print as "true"/"false", and nested arrays/objects print as
/// compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                format_number(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Formats a float the shortest way that round-trips, dropping ".0" on
/// integral values.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}
