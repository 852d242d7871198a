//! Loader and saver for [`DenseGraph`].
//!
//! Incoming properties land in `Object` columns created on first use.
//! On save, ids come from the `id` column (or the vertex index when there
//! is none) and are resolved once during validation.

use super::{EdgeGuard, check_edge_props, check_graph_props, check_vertex_props};
use crate::error::{GraphError, Result, ValidationError};
use crate::graph::{DenseGraph, GraphShape, ID_KEY, PropertyColumn, PropertyKind};
use crate::id::VertexId;
use crate::options::SaveOptions;
use crate::protocol::{Loader, Saver, load, namespace, save};
use crate::value::{Props, Value};
use std::collections::BTreeSet;
use std::path::Path;

/// Load a file into a [`DenseGraph`].
pub fn load_dense(path: impl AsRef<Path>) -> Result<DenseGraph> {
    load(DenseLoader, path)
}

/// Validate and save a [`DenseGraph`].
pub fn save_dense(graph: &DenseGraph, path: impl AsRef<Path>, options: &SaveOptions) -> Result<()> {
    save(DenseSaver::default(), graph, path, options)
}

// =============================================================================
// LOADER
// =============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct DenseLoader;

impl Loader for DenseLoader {
    type Graph = DenseGraph;

    fn process_settings(
        &mut self,
        directed: bool,
        props: Option<Props>,
    ) -> std::result::Result<DenseGraph, GraphError> {
        let mut graph = DenseGraph::new(directed);
        for (key, value) in props.unwrap_or_default() {
            graph.new_graph_property(&key, PropertyKind::Object);
            graph.set_graph_property(&key, value)?;
        }
        Ok(graph)
    }

    fn process_vertex(
        &mut self,
        graph: &mut DenseGraph,
        id: VertexId,
        props: Option<Props>,
    ) -> std::result::Result<(), GraphError> {
        let props = props.unwrap_or_default();
        if props.contains_key(ID_KEY) {
            return Err(GraphError::ReservedKey(ID_KEY.to_string()));
        }
        let v = graph.add_vertex_with_id(id)?;
        for (key, value) in props {
            graph.new_vertex_property(&key, PropertyKind::Object)?;
            graph.set_vertex_property(v, &key, value)?;
        }
        Ok(())
    }

    fn process_edge(
        &mut self,
        graph: &mut DenseGraph,
        source: VertexId,
        target: VertexId,
        props: Option<Props>,
    ) -> std::result::Result<(), GraphError> {
        let u = graph
            .find_vertex(&source)
            .ok_or(GraphError::UnknownVertex(source))?;
        let v = graph
            .find_vertex(&target)
            .ok_or(GraphError::UnknownVertex(target))?;
        let e = graph.add_edge(u, v)?;
        for (key, value) in props.unwrap_or_default() {
            graph.new_edge_property(&key, PropertyKind::Object);
            graph.set_edge_property(e, &key, value)?;
        }
        Ok(())
    }
}

// =============================================================================
// SAVER
// =============================================================================

/// Saves a [`DenseGraph`]. `ids` holds the resolved id of every vertex,
/// by index, once `validate` has passed.
#[derive(Debug, Default)]
pub struct DenseSaver {
    ids: Vec<VertexId>,
}

impl DenseSaver {
    fn id(&self, v: usize) -> VertexId {
        self.ids.get(v).cloned().unwrap_or(VertexId::Int(v as i64))
    }
}

/// Graph properties flattened to one namespace.
fn flat_graph_props(graph: &DenseGraph) -> Props {
    graph
        .graph_properties()
        .map(|(key, property)| (key.to_string(), property.value().clone()))
        .collect()
}

/// Non-id properties of one element, read across every column.
fn row<'a>(columns: impl Iterator<Item = (&'a str, &'a PropertyColumn)>, index: usize) -> Props {
    columns
        .filter(|(key, _)| *key != ID_KEY)
        .filter_map(|(key, column)| column.get(index).map(|value| (key.to_string(), value.clone())))
        .collect()
}

impl Saver for DenseSaver {
    type Graph = DenseGraph;

    fn validate(&mut self, graph: &DenseGraph) -> std::result::Result<(), ValidationError> {
        let flat = flat_graph_props(graph);
        namespace::check_directed(&flat, graph.is_directed())?;
        check_graph_props(&flat)?;

        let mut seen = BTreeSet::new();
        let mut ids = Vec::with_capacity(graph.vertex_count());
        for v in graph.vertices() {
            let value = graph.vertex_id(v).unwrap_or(Value::Null);
            let id = VertexId::from_value(&value).ok_or_else(|| ValidationError::InvalidVertexId {
                found: value.type_name().to_string(),
            })?;
            if !seen.insert(id.clone()) {
                return Err(ValidationError::DuplicateVertexId(id));
            }
            check_vertex_props(&id, &row(graph.vertex_columns(), v))?;
            ids.push(id);
        }

        let mut guard = EdgeGuard::new(graph.is_directed());
        for (e, u, v) in graph.edges() {
            let (source, target) = match (ids.get(u), ids.get(v)) {
                (Some(s), Some(t)) => (s, t),
                _ => continue,
            };
            guard.admit(source, target)?;
            check_edge_props(source, target, &row(graph.edge_columns(), e))?;
        }

        self.ids = ids;
        Ok(())
    }

    fn settings(&self, graph: &DenseGraph) -> Props {
        namespace::settings_props(&flat_graph_props(graph), graph.is_directed())
    }

    fn vertices<'g>(&'g self, graph: &'g DenseGraph) -> impl Iterator<Item = (VertexId, Props)> + 'g {
        graph
            .vertices()
            .map(move |v| (self.id(v), row(graph.vertex_columns(), v)))
    }

    fn edges<'g>(
        &'g self,
        graph: &'g DenseGraph,
    ) -> impl Iterator<Item = (VertexId, VertexId, Props)> + 'g {
        graph
            .edges()
            .map(move |(e, u, v)| (self.id(u), self.id(v), row(graph.edge_columns(), e)))
    }
}

// =============================================================================
// TESTS
// =============================================================================
