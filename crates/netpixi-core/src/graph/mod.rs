//! # Graph Models
//!
//! The two in-memory graph models the protocol adapts to:
//!
//! - [`DenseGraph`]: dense integer vertex indices, ids stored as a vertex
//!   property, typed property columns.
//! - [`KeyedGraph`]: nodes keyed by their external key, a property
//!   dictionary per element.

pub mod column;
pub mod dense;
pub mod keyed;

pub use column::{PropertyColumn, PropertyKind, ScalarType};
pub use dense::{DenseGraph, EdgeIndex, GraphProperty, ID_KEY, VertexIndex};
pub use keyed::{KeyedGraph, NodeKey};

/// Shape queries shared by both models.
pub trait GraphShape {
    fn is_directed(&self) -> bool;

    fn vertex_count(&self) -> usize;

    fn edge_count(&self) -> usize;
}
