use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field holding the item count.
pub const QUANTITY: &str = "quantity";
/// Field holding the RFC 3339 creation timestamp.
pub const DATE_ADDED: &str = "dateAdded";
/// Field holding the optional photo link.
pub const PHOTO_URL: &str = "photoURL";
/// Field holding the optional free-text description.
pub const DESCRIPTION: &str = "description";

/// Dynamic value type for document fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Integer view of the value. Integral floats inside the `i64` range
    /// count, anything else does not.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// The stored form of one record: field name to value. The record key is not a field.
pub type Document = BTreeMap<String, Value>;

/// Overlay `fields` onto `target`, leaving fields not mentioned untouched.
pub fn merge_into(target: &mut Document, fields: Document) {
    for (k, v) in fields {
        target.insert(k, v);
    }
}
