use serde_json::{Number, Value};

use super::identity::ResourceKey;
use crate::graph::ResourceGraph;

/// Tagged attribute value
///
/// Scalars compare by value. `Reference` holds a resource-valued
/// (foreign-key style) attribute and compares by entity identity, which
/// needs the owning graph; see [`crate::tracking::values_equal`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Reference(ResourceKey),
}

impl AttributeValue {
    /// Convert a decoded scalar JSON value
    ///
    /// Returns `None` for arrays and objects, which are not attribute values.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(AttributeValue::Null),
            Value::Bool(b) => Some(AttributeValue::Bool(*b)),
            Value::Number(n) => Some(AttributeValue::Number(n.clone())),
            Value::String(s) => Some(AttributeValue::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Wire representation; references become the target's id (`null` while new)
    pub fn to_json(&self, graph: &ResourceGraph) -> Value {
        match self {
            AttributeValue::Null => Value::Null,
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Number(n) => Value::Number(n.clone()),
            AttributeValue::String(s) => Value::String(s.clone()),
            AttributeValue::Reference(key) => graph
                .get(*key)
                .and_then(|target| target.id())
                .and_then(|id| serde_json::to_value(id).ok())
                .unwrap_or(Value::Null),
        }
    }

    pub fn as_reference(&self) -> Option<ResourceKey> {
        match self {
            AttributeValue::Reference(key) => Some(*key),
            _ => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Number(value.into())
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Number(value.into())
    }
}

/// Non-finite floats have no JSON representation and become `Null`
impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Number::from_f64(value)
            .map(AttributeValue::Number)
            .unwrap_or(AttributeValue::Null)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<ResourceKey> for AttributeValue {
    fn from(value: ResourceKey) -> Self {
        AttributeValue::Reference(value)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(AttributeValue::Null)
    }
}
