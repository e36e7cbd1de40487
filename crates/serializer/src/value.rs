//! The closed output shape of the serializer.

use serde::ser::{SerializeMap, SerializeSeq};
use serde_json::{Map, Number, Value};

/// A value built exclusively from JSON-safe shapes.
///
/// Every result of [`Serializer::transform`](crate::Serializer::transform)
/// is composed of these eight variants and nothing else, no matter how
/// exotic the input was.
#[derive(Debug, Clone, PartialEq)]
pub enum SafeValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Sequence(Vec<SafeValue>),
    /// Ordered key/value pairs. Keys are already coerced to text and are
    /// not required to be unique; [`SafeValue::to_json`] collapses
    /// duplicates last-write-wins.
    Mapping(Vec<(String, SafeValue)>),
    /// Stringified fallback for values that had no structural conversion.
    Opaque(String),
}

impl SafeValue {
    /// Converts into a `serde_json::Value`.
    ///
    /// Duplicate mapping keys collapse deterministically: the later pair
    /// wins, at the position of the first occurrence. Floats that JSON
    /// cannot represent (NaN, infinities) render as their decimal text.
    pub fn to_json(&self) -> Value {
        match self {
            SafeValue::Null => Value::Null,
            SafeValue::Bool(v) => Value::Bool(*v),
            SafeValue::Integer(v) => Value::Number((*v).into()),
            SafeValue::Float(v) => Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(v.to_string())),
            SafeValue::Text(v) | SafeValue::Opaque(v) => Value::String(v.clone()),
            SafeValue::Sequence(items) => {
                Value::Array(items.iter().map(SafeValue::to_json).collect())
            }
            SafeValue::Mapping(pairs) => {
                let mut map = Map::new();
                for (key, value) in pairs {
                    map.insert(key.clone(), value.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

impl serde::Serialize for SafeValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            SafeValue::Null => serializer.serialize_unit(),
            SafeValue::Bool(v) => serializer.serialize_bool(*v),
            SafeValue::Integer(v) => serializer.serialize_i64(*v),
            SafeValue::Float(v) => serializer.serialize_f64(*v),
            SafeValue::Text(v) | SafeValue::Opaque(v) => serializer.serialize_str(v),
            SafeValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            SafeValue::Mapping(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (key, value) in pairs {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}
