//! Typed property storage for the dense model.
//!
//! A column stores one value per vertex (or edge). `Object` columns hold
//! anything; scalar and vector columns coerce on assignment and reject
//! values of the wrong type, so they never need a serializability check.

use crate::error::GraphError;
use crate::value::Value;
use std::fmt;

/// Element type of a typed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Bool,
    Int,
    Float,
    String,
}

impl ScalarType {
    fn default_value(self) -> Value {
        match self {
            ScalarType::Bool => Value::Bool(false),
            ScalarType::Int => Value::Int(0),
            ScalarType::Float => Value::Float(0.0),
            ScalarType::String => Value::Str(String::new()),
        }
    }

    /// Accept `value` as this type. Integers widen to floats.
    fn coerce(self, value: Value) -> Result<Value, Value> {
        match (self, value) {
            (ScalarType::Bool, v @ Value::Bool(_))
            | (ScalarType::Int, v @ Value::Int(_))
            | (ScalarType::Float, v @ Value::Float(_))
            | (ScalarType::String, v @ Value::Str(_)) => Ok(v),
            (ScalarType::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
            (_, other) => Err(other),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarType::Bool => "bool",
            ScalarType::Int => "int64_t",
            ScalarType::Float => "double",
            ScalarType::String => "string",
        })
    }
}

/// What a column may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Object,
    Scalar(ScalarType),
    Vector(ScalarType),
}

impl PropertyKind {
    #[must_use]
    pub fn default_value(self) -> Value {
        match self {
            PropertyKind::Object => Value::Null,
            PropertyKind::Scalar(scalar) => scalar.default_value(),
            PropertyKind::Vector(_) => Value::List(Vec::new()),
        }
    }

    #[must_use]
    pub fn is_object(self) -> bool {
        matches!(self, PropertyKind::Object)
    }

    /// Coerce a value into this kind, naming `key` on failure.
    pub fn coerce(self, key: &str, value: Value) -> Result<Value, GraphError> {
        let mismatch = |found: &Value| GraphError::TypeMismatch {
            key: key.to_string(),
            expected: self.to_string(),
            found: found.type_name(),
        };
        match self {
            PropertyKind::Object => Ok(value),
            PropertyKind::Scalar(scalar) => scalar.coerce(value).map_err(|v| mismatch(&v)),
            PropertyKind::Vector(scalar) => match value {
                Value::List(items) => items
                    .into_iter()
                    .map(|item| scalar.coerce(item).map_err(|v| mismatch(&v)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List),
                other => Err(mismatch(&other)),
            },
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::Object => f.write_str("object"),
            PropertyKind::Scalar(scalar) => write!(f, "{scalar}"),
            PropertyKind::Vector(scalar) => write!(f, "vector<{scalar}>"),
        }
    }
}

/// One value per element, all of the same kind.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyColumn {
    kind: PropertyKind,
    values: Vec<Value>,
}

impl PropertyColumn {
    #[must_use]
    pub fn new(kind: PropertyKind, len: usize) -> Self {
        Self {
            kind,
            values: vec![kind.default_value(); len],
        }
    }

    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Assign a coerced value. The caller checks `index`.
    pub(crate) fn set(&mut self, key: &str, index: usize, value: Value) -> Result<(), GraphError> {
        let value = self.kind.coerce(key, value)?;
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
        Ok(())
    }

    pub(crate) fn push_default(&mut self) {
        self.values.push(self.kind.default_value());
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }
}
