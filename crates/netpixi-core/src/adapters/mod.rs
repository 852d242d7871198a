//! # Adapters Module
//!
//! One [`Loader`](crate::protocol::Loader) and one
//! [`Saver`](crate::protocol::Saver) per graph model, plus the
//! `load_*` / `save_*` entry points most callers want.
//!
//! Validation shared by both savers (serializability and edge uniqueness
//! bookkeeping) lives here.

mod dense;
mod keyed;

pub use dense::{DenseLoader, DenseSaver, load_dense, save_dense};
pub use keyed::{KeyedLoader, KeyedSaver, load_keyed, save_keyed};

use crate::error::ValidationError;
use crate::id::{EdgeKey, VertexId};
use crate::value::{Props, first_unserializable, is_serializable};
use std::collections::BTreeSet;

/// Tracks edge keys while validating, rejecting loops and repeats.
pub(crate) struct EdgeGuard {
    directed: bool,
    seen: BTreeSet<EdgeKey>,
}

impl EdgeGuard {
    pub(crate) fn new(directed: bool) -> Self {
        Self {
            directed,
            seen: BTreeSet::new(),
        }
    }

    pub(crate) fn admit(&mut self, source: &VertexId, target: &VertexId) -> Result<(), ValidationError> {
        if source == target {
            return Err(ValidationError::SelfLoop(source.clone()));
        }
        if !self.seen.insert(EdgeKey::new(source, target, self.directed)) {
            return Err(ValidationError::ParallelEdge {
                from: source.clone(),
                to: target.clone(),
            });
        }
        Ok(())
    }
}

pub(crate) fn check_graph_props(props: &Props) -> Result<(), ValidationError> {
    match first_unserializable(props) {
        Some(key) => Err(ValidationError::GraphProperty {
            key: key.to_string(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn check_vertex_props(id: &VertexId, props: &Props) -> Result<(), ValidationError> {
    match first_unserializable(props) {
        Some(key) => Err(ValidationError::VertexProperty {
            key: key.to_string(),
            id: id.clone(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn check_edge_props(
    source: &VertexId,
    target: &VertexId,
    props: &Props,
) -> Result<(), ValidationError> {
    for (key, value) in props {
        if !is_serializable(value) {
            return Err(ValidationError::EdgeProperty {
                key: key.clone(),
                from: source.clone(),
                to: target.clone(),
            });
        }
    }
    Ok(())
}
