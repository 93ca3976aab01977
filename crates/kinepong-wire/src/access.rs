//! Typed optional field access over JSON objects
//!
//! Every accessor answers "absent" for a missing key and for a key whose
//! value has the wrong shape. Numbers are tri-state so callers can tell a
//! missing field from one that failed coercion.

use serde_json::{Map, Value};

/// JSON object type used by documents
pub type Object = Map<String, Value>;

/// Result of reading a numeric field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberField {
    /// Key not present
    Absent,
    /// Present and coerced
    Value(f32),
    /// Present but not convertible to a finite f32
    Invalid,
}

impl NumberField {
    /// Value, or `default` when absent. `None` when invalid.
    pub fn or_default(self, default: f32) -> Option<f32> {
        match self {
            NumberField::Absent => Some(default),
            NumberField::Value(v) => Some(v),
            NumberField::Invalid => None,
        }
    }

    pub fn is_invalid(self) -> bool {
        matches!(self, NumberField::Invalid)
    }
}

/// Coerce a JSON value to a finite f32.
///
/// Accepts numbers and numeric strings.
pub fn coerce_f32(value: &Value) -> Option<f32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() || raw.abs() > f32::MAX as f64 {
        return None;
    }
    Some(raw as f32)
}

/// Shape-checked accessors for keyed documents
pub trait FieldAccess {
    fn field(&self, key: &str) -> Option<&Value>;

    fn get_object(&self, key: &str) -> Option<&Object> {
        self.field(key)?.as_object()
    }

    fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.field(key)?.as_array()
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.field(key)?.as_str()
    }

    fn get_number(&self, key: &str) -> NumberField {
        match self.field(key) {
            None => NumberField::Absent,
            Some(value) => match coerce_f32(value) {
                Some(v) => NumberField::Value(v),
                None => NumberField::Invalid,
            },
        }
    }
}

impl FieldAccess for Object {
    #[inline]
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}
