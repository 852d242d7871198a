//! Loader and saver for [`KeyedGraph`].

use super::{EdgeGuard, check_edge_props, check_graph_props, check_vertex_props};
use crate::error::{GraphError, Result, ValidationError};
use crate::graph::{GraphShape, KeyedGraph, NodeKey};
use crate::id::VertexId;
use crate::options::SaveOptions;
use crate::protocol::{Loader, Saver, load, namespace, save};
use crate::value::Props;
use std::path::Path;

/// Load a file into a [`KeyedGraph`].
pub fn load_keyed(path: impl AsRef<Path>) -> Result<KeyedGraph> {
    load(KeyedLoader, path)
}

/// Validate and save a [`KeyedGraph`].
pub fn save_keyed(graph: &KeyedGraph, path: impl AsRef<Path>, options: &SaveOptions) -> Result<()> {
    save(KeyedSaver, graph, path, options)
}

// =============================================================================
// LOADER
// =============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct KeyedLoader;

impl Loader for KeyedLoader {
    type Graph = KeyedGraph;

    fn process_settings(
        &mut self,
        directed: bool,
        props: Option<Props>,
    ) -> std::result::Result<KeyedGraph, GraphError> {
        let mut graph = KeyedGraph::with_directedness(directed);
        graph.graph_props_mut().extend(props.unwrap_or_default());
        Ok(graph)
    }

    fn process_vertex(
        &mut self,
        graph: &mut KeyedGraph,
        id: VertexId,
        props: Option<Props>,
    ) -> std::result::Result<(), GraphError> {
        let key = NodeKey::from(id.clone());
        if graph.has_node(&key) {
            return Err(GraphError::VertexExists(id));
        }
        graph.add_node(key).extend(props.unwrap_or_default());
        Ok(())
    }

    fn process_edge(
        &mut self,
        graph: &mut KeyedGraph,
        source: VertexId,
        target: VertexId,
        props: Option<Props>,
    ) -> std::result::Result<(), GraphError> {
        let source_key = NodeKey::from(source.clone());
        let target_key = NodeKey::from(target.clone());
        if !graph.has_node(&source_key) {
            return Err(GraphError::UnknownVertex(source));
        }
        if !graph.has_node(&target_key) {
            return Err(GraphError::UnknownVertex(target));
        }
        graph
            .add_edge(source_key, target_key)
            .extend(props.unwrap_or_default());
        Ok(())
    }
}

// =============================================================================
// SAVER
// =============================================================================

/// Saves a [`KeyedGraph`]: nodes in key order, edges in (source, target)
/// key order.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyedSaver;

fn wire_id(key: &NodeKey) -> std::result::Result<VertexId, ValidationError> {
    key.as_vertex_id()
        .ok_or_else(|| ValidationError::InvalidVertexId {
            found: key.to_string(),
        })
}

impl Saver for KeyedSaver {
    type Graph = KeyedGraph;

    fn validate(&mut self, graph: &KeyedGraph) -> std::result::Result<(), ValidationError> {
        namespace::check_directed(graph.graph_props(), graph.is_directed())?;
        check_graph_props(graph.graph_props())?;

        // Node keys are unique by construction; only their wire form needs checking.
        for (key, props) in graph.nodes() {
            check_vertex_props(&wire_id(key)?, props)?;
        }

        let mut guard = EdgeGuard::new(graph.is_directed());
        for (source, target, props) in graph.edges() {
            let source = wire_id(source)?;
            let target = wire_id(target)?;
            guard.admit(&source, &target)?;
            check_edge_props(&source, &target, props)?;
        }
        Ok(())
    }

    fn settings(&self, graph: &KeyedGraph) -> Props {
        namespace::settings_props(graph.graph_props(), graph.is_directed())
    }

    fn vertices<'g>(&'g self, graph: &'g KeyedGraph) -> impl Iterator<Item = (VertexId, Props)> + 'g {
        graph
            .nodes()
            .filter_map(|(key, props)| Some((key.as_vertex_id()?, props.clone())))
    }

    fn edges<'g>(
        &'g self,
        graph: &'g KeyedGraph,
    ) -> impl Iterator<Item = (VertexId, VertexId, Props)> + 'g {
        graph.edges().filter_map(|(source, target, props)| {
            Some((source.as_vertex_id()?, target.as_vertex_id()?, props.clone()))
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
