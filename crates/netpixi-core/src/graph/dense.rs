//! # Dense Graph Model
//!
//! Vertices are dense integer indices `0..n`, edges are dense indices into
//! an edge list. A user-facing id is an ordinary vertex property stored in
//! the reserved `id` column; when the column is absent the index doubles
//! as the id.
//!
//! The model allows self-loops and parallel edges. The protocol rejects
//! them on save.

use crate::error::GraphError;
use crate::graph::GraphShape;
use crate::graph::column::{PropertyColumn, PropertyKind, ScalarType};
use crate::id::VertexId;
use crate::value::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

/// Reserved vertex property holding user-facing ids.
pub const ID_KEY: &str = "id";

pub type VertexIndex = usize;
pub type EdgeIndex = usize;

/// A single graph-level property.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphProperty {
    kind: PropertyKind,
    value: Value,
}

impl GraphProperty {
    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[derive(Debug, Clone, Default)]
pub struct DenseGraph {
    directed: bool,
    vertex_count: usize,
    /// Edge list: (source, target) by edge index.
    edges: Vec<(VertexIndex, VertexIndex)>,
    /// Incident edge indices per vertex, by orientation.
    out_edges: Vec<Vec<EdgeIndex>>,
    in_edges: Vec<Vec<EdgeIndex>>,
    graph_props: BTreeMap<String, GraphProperty>,
    vertex_props: BTreeMap<String, PropertyColumn>,
    edge_props: BTreeMap<String, PropertyColumn>,
    /// id -> index, kept in step with the `id` column.
    id_index: BTreeMap<VertexId, VertexIndex>,
}

impl DenseGraph {
    #[must_use]
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            ..Self::default()
        }
    }

    pub fn vertices(&self) -> Range<VertexIndex> {
        0..self.vertex_count
    }

    /// Every edge as (edge index, source, target), in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, VertexIndex, VertexIndex)> + '_ {
        self.edges.iter().enumerate().map(|(e, &(u, v))| (e, u, v))
    }

    #[must_use]
    pub fn edge_endpoints(&self, edge: EdgeIndex) -> Option<(VertexIndex, VertexIndex)> {
        self.edges.get(edge).copied()
    }

    fn check_vertex(&self, v: VertexIndex) -> Result<(), GraphError> {
        if v < self.vertex_count {
            Ok(())
        } else {
            Err(GraphError::IndexOutOfRange(v))
        }
    }

    fn check_edge(&self, e: EdgeIndex) -> Result<(), GraphError> {
        if e < self.edges.len() {
            Ok(())
        } else {
            Err(GraphError::EdgeOutOfRange(e))
        }
    }

    // =========================================================================
    // STRUCTURE
    // =========================================================================

    /// Append a vertex with default values in every column.
    pub fn add_vertex(&mut self) -> VertexIndex {
        let v = self.vertex_count;
        self.vertex_count += 1;
        self.out_edges.push(Vec::new());
        self.in_edges.push(Vec::new());
        for column in self.vertex_props.values_mut() {
            column.push_default();
        }
        v
    }

    /// Append a vertex carrying a user-facing id.
    pub fn add_vertex_with_id(&mut self, id: VertexId) -> Result<VertexIndex, GraphError> {
        if self.id_index.contains_key(&id) {
            return Err(GraphError::VertexExists(id));
        }
        let v = self.add_vertex();
        self.set_vertex_id(v, id.to_value())?;
        Ok(v)
    }

    /// Append an edge. Self-loops and parallel edges are allowed here.
    pub fn add_edge(&mut self, source: VertexIndex, target: VertexIndex) -> Result<EdgeIndex, GraphError> {
        self.check_vertex(source)?;
        self.check_vertex(target)?;
        let e = self.edges.len();
        self.edges.push((source, target));
        self.out_edges[source].push(e);
        self.in_edges[target].push(e);
        for column in self.edge_props.values_mut() {
            column.push_default();
        }
        Ok(e)
    }

    /// First edge joining `source` to `target` (either way if undirected).
    #[must_use]
    pub fn edge(&self, source: VertexIndex, target: VertexIndex) -> Option<EdgeIndex> {
        let forward = self.out_edges.get(source)?.iter().copied().find(|&e| {
            self.edges.get(e).is_some_and(|&(_, t)| t == target)
        });
        if forward.is_some() || self.directed {
            return forward;
        }
        self.out_edges.get(target)?.iter().copied().find(|&e| {
            self.edges.get(e).is_some_and(|&(_, t)| t == source)
        })
    }

    /// Neighbors reached by following edges forward (all incident
    /// neighbors if undirected). Sorted, without repeats.
    #[must_use]
    pub fn out_neighbors(&self, v: VertexIndex) -> BTreeSet<VertexIndex> {
        let mut neighbors = self.forward(v);
        if !self.directed {
            neighbors.extend(self.backward(v));
        }
        neighbors
    }

    /// Neighbors with an edge into `v` (all incident neighbors if
    /// undirected). Sorted, without repeats.
    #[must_use]
    pub fn in_neighbors(&self, v: VertexIndex) -> BTreeSet<VertexIndex> {
        let mut neighbors = self.backward(v);
        if !self.directed {
            neighbors.extend(self.forward(v));
        }
        neighbors
    }

    fn forward(&self, v: VertexIndex) -> BTreeSet<VertexIndex> {
        self.out_edges
            .get(v)
            .into_iter()
            .flatten()
            .filter_map(|&e| self.edges.get(e).map(|&(_, t)| t))
            .collect()
    }

    fn backward(&self, v: VertexIndex) -> BTreeSet<VertexIndex> {
        self.in_edges
            .get(v)
            .into_iter()
            .flatten()
            .filter_map(|&e| self.edges.get(e).map(|&(s, _)| s))
            .collect()
    }

    /// Number of edges leaving `v` (incident edges if undirected).
    #[must_use]
    pub fn out_degree(&self, v: VertexIndex) -> usize {
        let out = self.out_edges.get(v).map_or(0, Vec::len);
        if self.directed {
            out
        } else {
            out + self.in_edges.get(v).map_or(0, Vec::len)
        }
    }

    /// Number of edges entering `v` (incident edges if undirected).
    #[must_use]
    pub fn in_degree(&self, v: VertexIndex) -> usize {
        let inc = self.in_edges.get(v).map_or(0, Vec::len);
        if self.directed {
            inc
        } else {
            inc + self.out_edges.get(v).map_or(0, Vec::len)
        }
    }

    // =========================================================================
    // IDS
    // =========================================================================

    /// Whether vertices carry an explicit `id` column.
    #[must_use]
    pub fn has_ids(&self) -> bool {
        self.vertex_props.contains_key(ID_KEY)
    }

    /// The user-facing id of `v`: its `id` value, or its index as an
    /// integer when there is no id column.
    #[must_use]
    pub fn vertex_id(&self, v: VertexIndex) -> Option<Value> {
        if v >= self.vertex_count {
            return None;
        }
        match self.vertex_props.get(ID_KEY) {
            Some(column) => column.get(v).cloned(),
            None => Some(Value::Int(v as i64)),
        }
    }

    /// Set the id of `v`. Any value is stored; only integer and string
    /// ids are reachable through [`DenseGraph::find_vertex`].
    pub fn set_vertex_id(&mut self, v: VertexIndex, id: Value) -> Result<(), GraphError> {
        self.check_vertex(v)?;
        if !self.has_ids() {
            let column = PropertyColumn::new(PropertyKind::Object, self.vertex_count);
            self.vertex_props.insert(ID_KEY.to_string(), column);
        }
        if let Some(old) = self.vertex_id(v).as_ref().and_then(VertexId::from_value) {
            if self.id_index.get(&old) == Some(&v) {
                self.id_index.remove(&old);
            }
        }
        if let Some(key) = VertexId::from_value(&id) {
            self.id_index.insert(key, v);
        }
        if let Some(column) = self.vertex_props.get_mut(ID_KEY) {
            column.set(ID_KEY, v, id)?;
        }
        Ok(())
    }

    /// Look up a vertex by user-facing id.
    #[must_use]
    pub fn find_vertex(&self, id: &VertexId) -> Option<VertexIndex> {
        if self.has_ids() {
            self.id_index.get(id).copied()
        } else {
            match id {
                VertexId::Int(i) => usize::try_from(*i).ok().filter(|&v| v < self.vertex_count),
                VertexId::Str(_) => None,
            }
        }
    }

    // =========================================================================
    // GRAPH PROPERTIES
    // =========================================================================

    /// Create a graph property if absent. Existing properties are kept.
    pub fn new_graph_property(&mut self, key: &str, kind: PropertyKind) {
        self.graph_props
            .entry(key.to_string())
            .or_insert_with(|| GraphProperty {
                kind,
                value: kind.default_value(),
            });
    }

    pub fn set_graph_property(&mut self, key: &str, value: Value) -> Result<(), GraphError> {
        let property = self
            .graph_props
            .get_mut(key)
            .ok_or_else(|| GraphError::UnknownProperty(key.to_string()))?;
        property.value = property.kind.coerce(key, value)?;
        Ok(())
    }

    #[must_use]
    pub fn graph_property(&self, key: &str) -> Option<&Value> {
        self.graph_props.get(key).map(|p| &p.value)
    }

    pub fn graph_properties(&self) -> impl Iterator<Item = (&str, &GraphProperty)> {
        self.graph_props.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn remove_graph_property(&mut self, key: &str) -> Option<Value> {
        self.graph_props.remove(key).map(|p| p.value)
    }

    // =========================================================================
    // VERTEX PROPERTIES
    // =========================================================================

    /// Create a vertex column if absent. `id` is reserved.
    pub fn new_vertex_property(&mut self, key: &str, kind: PropertyKind) -> Result<(), GraphError> {
        if key == ID_KEY {
            return Err(GraphError::ReservedKey(ID_KEY.to_string()));
        }
        let len = self.vertex_count;
        self.vertex_props
            .entry(key.to_string())
            .or_insert_with(|| PropertyColumn::new(kind, len));
        Ok(())
    }

    pub fn set_vertex_property(&mut self, v: VertexIndex, key: &str, value: Value) -> Result<(), GraphError> {
        if key == ID_KEY {
            return Err(GraphError::ReservedKey(ID_KEY.to_string()));
        }
        self.check_vertex(v)?;
        self.vertex_props
            .get_mut(key)
            .ok_or_else(|| GraphError::UnknownProperty(key.to_string()))?
            .set(key, v, value)
    }

    #[must_use]
    pub fn vertex_property(&self, v: VertexIndex, key: &str) -> Option<&Value> {
        self.vertex_props.get(key)?.get(v)
    }

    /// Every vertex column, `id` included.
    pub fn vertex_columns(&self) -> impl Iterator<Item = (&str, &PropertyColumn)> {
        self.vertex_props.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn remove_vertex_property(&mut self, key: &str) -> Result<Option<PropertyColumn>, GraphError> {
        if key == ID_KEY {
            return Err(GraphError::ReservedKey(ID_KEY.to_string()));
        }
        Ok(self.vertex_props.remove(key))
    }

    // =========================================================================
    // EDGE PROPERTIES
    // =========================================================================

    pub fn new_edge_property(&mut self, key: &str, kind: PropertyKind) {
        let len = self.edges.len();
        self.edge_props
            .entry(key.to_string())
            .or_insert_with(|| PropertyColumn::new(kind, len));
    }

    pub fn set_edge_property(&mut self, e: EdgeIndex, key: &str, value: Value) -> Result<(), GraphError> {
        self.check_edge(e)?;
        self.edge_props
            .get_mut(key)
            .ok_or_else(|| GraphError::UnknownProperty(key.to_string()))?
            .set(key, e, value)
    }

    #[must_use]
    pub fn edge_property(&self, e: EdgeIndex, key: &str) -> Option<&Value> {
        self.edge_props.get(key)?.get(e)
    }

    pub fn edge_columns(&self) -> impl Iterator<Item = (&str, &PropertyColumn)> {
        self.edge_props.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn remove_edge_property(&mut self, key: &str) -> Option<PropertyColumn> {
        self.edge_props.remove(key)
    }

    // =========================================================================
    // LAYOUT
    // =========================================================================

    /// Store a layout as `_x` / `_y` float vertex properties, one position
    /// per vertex in index order.
    pub fn apply_layout(&mut self, positions: &[(f64, f64)]) -> Result<(), GraphError> {
        if positions.len() != self.vertex_count {
            return Err(GraphError::LayoutSize {
                expected: self.vertex_count,
                found: positions.len(),
            });
        }
        let kind = PropertyKind::Scalar(ScalarType::Float);
        self.new_vertex_property("_x", kind)?;
        self.new_vertex_property("_y", kind)?;
        for (v, &(x, y)) in positions.iter().enumerate() {
            self.set_vertex_property(v, "_x", Value::Float(x))?;
            self.set_vertex_property(v, "_y", Value::Float(y))?;
        }
        Ok(())
    }
}

impl GraphShape for DenseGraph {
    fn is_directed(&self) -> bool {
        self.directed
    }

    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
