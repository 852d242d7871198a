//! # Property Values
//!
//! The tagged value tree carried by graph, vertex and edge properties.
//!
//! A [`Value`] can hold things the wire format cannot carry (opaque host
//! objects, non-finite floats, map keys that are neither integers nor
//! strings). [`is_serializable`] is the single predicate the savers use to
//! reject those before anything is written.

use serde_json::{Map, Number};
use std::collections::BTreeMap;
use thiserror::Error;

/// A property namespace: string keys in deterministic order.
pub type Props = BTreeMap<String, Value>;

// =============================================================================
// VALUE
// =============================================================================

/// A dynamically typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// Entries in insertion order. Keys are full values so that keys without
    /// a wire representation can be held and later rejected.
    Map(Vec<(Value, Value)>),
    /// A host object with no wire representation. The string is a
    /// description used in diagnostics.
    Opaque(String),
}

impl Value {
    /// Build a map value from string keys.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (Value::Str(k.into()), v))
                .collect(),
        )
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view: integers widen to floats.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Whether this value may appear as a map key on the wire.
    #[must_use]
    pub fn is_key(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Str(_))
    }

    /// Look up a string key in a map value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Name of the variant, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Opaque(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

// =============================================================================
// SERIALIZABILITY
// =============================================================================

/// Recursively check that a value can be written to the wire format.
///
/// Scalars are serializable except non-finite floats, lists are
/// serializable when every element is, maps when every key is an integer
/// or a string and every value is serializable. Opaque values never are.
#[must_use]
pub fn is_serializable(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::Str(_) => true,
        Value::Float(f) => f.is_finite(),
        Value::List(items) => items.iter().all(is_serializable),
        Value::Map(entries) => entries
            .iter()
            .all(|(k, v)| k.is_key() && is_serializable(v)),
        Value::Opaque(_) => false,
    }
}

/// Find the first key of a namespace whose value is not serializable.
#[must_use]
pub fn first_unserializable(props: &Props) -> Option<&str> {
    props
        .iter()
        .find(|(_, v)| !is_serializable(v))
        .map(|(k, _)| k.as_str())
}

// =============================================================================
// JSON CONVERSION
// =============================================================================

/// A value that has no JSON representation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("object {0} cannot be serialized")]
    Opaque(String),

    #[error("float {0} cannot be serialized")]
    NonFinite(f64),

    #[error("map key of type {0} cannot be serialized")]
    InvalidKey(&'static str),
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => number_to_value(&n),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

fn number_to_value(n: &Number) -> Value {
    match n.as_i64() {
        Some(i) => Value::Int(i),
        // u64 above i64::MAX and every real number end up here
        None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

/// Convert a JSON object into a property namespace.
#[must_use]
pub fn props_from_json(map: Map<String, serde_json::Value>) -> Props {
    map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

/// Encode a value as JSON. Integer map keys become strings.
pub fn to_json(value: &Value) -> Result<serde_json::Value, ValueError> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number(Number::from(*i)),
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or(ValueError::NonFinite(*f))?,
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(to_json).collect::<Result<_, _>>()?)
        }
        Value::Map(entries) => {
            let mut map = Map::new();
            for (k, v) in entries {
                let key = match k {
                    Value::Str(s) => s.clone(),
                    Value::Int(i) => i.to_string(),
                    other => return Err(ValueError::InvalidKey(other.type_name())),
                };
                map.insert(key, to_json(v)?);
            }
            serde_json::Value::Object(map)
        }
        Value::Opaque(description) => return Err(ValueError::Opaque(description.clone())),
    })
}

/// Encode a namespace as a JSON object, leaving out null-valued entries.
pub fn props_to_json(props: &Props) -> Result<Map<String, serde_json::Value>, ValueError> {
    let mut map = Map::new();
    for (key, value) in props {
        if value.is_null() {
            continue;
        }
        map.insert(key.clone(), to_json(value)?);
    }
    Ok(map)
}

// =============================================================================
// TESTS
// =============================================================================
