//! # Identifiers
//!
//! Vertex ids as they appear on the wire, and the edge key used for
//! uniqueness checks.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An externally supplied vertex id: an integer or a string.
///
/// `Int(0)` is a regular id. Integers and strings never compare equal,
/// so `1` and `"1"` are distinct vertices.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VertexId {
    Int(i64),
    Str(String),
}

impl VertexId {
    /// Interpret a property value as a vertex id.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(VertexId::Int(*i)),
            Value::Str(s) => Some(VertexId::Str(s.clone())),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            VertexId::Int(i) => Value::Int(*i),
            VertexId::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexId::Int(i) => write!(f, "{i}"),
            VertexId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for VertexId {
    fn from(i: i64) -> Self {
        VertexId::Int(i)
    }
}

impl From<i32> for VertexId {
    fn from(i: i32) -> Self {
        VertexId::Int(i64::from(i))
    }
}

impl From<&str> for VertexId {
    fn from(s: &str) -> Self {
        VertexId::Str(s.to_string())
    }
}

impl From<String> for VertexId {
    fn from(s: String) -> Self {
        VertexId::Str(s)
    }
}

/// Uniqueness key of an edge.
///
/// Directed edges keep their orientation; undirected edges are stored with
/// the smaller endpoint first so that `(a, b)` and `(b, a)` collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
    pub first: VertexId,
    pub second: VertexId,
}

impl EdgeKey {
    #[must_use]
    pub fn new(source: &VertexId, target: &VertexId, directed: bool) -> Self {
        if directed || source <= target {
            Self {
                first: source.clone(),
                second: target.clone(),
            }
        } else {
            Self {
                first: target.clone(),
                second: source.clone(),
            }
        }
    }
}
