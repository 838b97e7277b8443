//! Typed event property values.
//!
//! Properties are opaque to the queue. They are a closed set of scalar
//! variants plus nested maps, serialized untagged so a batch encodes as
//! plain JSON objects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// String-keyed property map attached to an event.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A single property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Nested property map.
    Map(Properties),
}

impl PropertyValue {
    /// Convert a JSON value into a property value.
    ///
    /// Returns `None` for `null` and arrays, and for maps containing either.
    /// Unsigned integers beyond `i64::MAX` become floats.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null | Value::Array(_) => None,
            Value::Bool(b) => Some(Self::Bool(b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) => Some(Self::String(s)),
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| Self::from_json(v).map(|v| (k, v)))
                .collect::<Option<Properties>>()
                .map(Self::Map),
        }
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for PropertyValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Properties> for PropertyValue {
    fn from(v: Properties) -> Self {
        Self::Map(v)
    }
}
