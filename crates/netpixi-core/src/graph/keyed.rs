//! # Keyed Graph Model
//!
//! Nodes are addressed directly by their external key and each node, edge
//! and the graph itself carry a free-form property dictionary.
//!
//! This is a simple graph: at most one edge per ordered pair when
//! directed, per unordered pair when undirected. Self-loops are allowed by
//! the model and rejected by the protocol on save.
//! All maps are `BTreeMap`, so enumeration order is the key order.

use crate::graph::GraphShape;
use crate::id::VertexId;
use crate::value::{Props, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// =============================================================================
// NODE KEY
// =============================================================================

/// A node key. Tuples are valid keys in memory but have no wire form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKey {
    Int(i64),
    Str(String),
    Tuple(Vec<NodeKey>),
}

impl NodeKey {
    /// The wire id for this key, if it has one.
    #[must_use]
    pub fn as_vertex_id(&self) -> Option<VertexId> {
        match self {
            NodeKey::Int(i) => Some(VertexId::Int(*i)),
            NodeKey::Str(s) => Some(VertexId::Str(s.clone())),
            NodeKey::Tuple(_) => None,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Int(i) => write!(f, "{i}"),
            NodeKey::Str(s) => f.write_str(s),
            NodeKey::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<VertexId> for NodeKey {
    fn from(id: VertexId) -> Self {
        match id {
            VertexId::Int(i) => NodeKey::Int(i),
            VertexId::Str(s) => NodeKey::Str(s),
        }
    }
}

impl From<i64> for NodeKey {
    fn from(i: i64) -> Self {
        NodeKey::Int(i)
    }
}

impl From<i32> for NodeKey {
    fn from(i: i32) -> Self {
        NodeKey::Int(i64::from(i))
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        NodeKey::Str(s.to_string())
    }
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyedGraph {
    directed: bool,

    /// Graph-level properties.
    graph: Props,

    /// Node storage: key -> properties.
    nodes: BTreeMap<NodeKey, Props>,

    /// Successors (all neighbors when undirected).
    succ: BTreeMap<NodeKey, BTreeSet<NodeKey>>,

    /// Predecessors. Only maintained for directed graphs.
    pred: BTreeMap<NodeKey, BTreeSet<NodeKey>>,

    /// Edge storage keyed by (source, target); undirected pairs are stored
    /// with the smaller key first.
    edges: BTreeMap<(NodeKey, NodeKey), Props>,
}

impl KeyedGraph {
    /// Create an empty undirected graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty directed graph.
    #[must_use]
    pub fn new_directed() -> Self {
        Self::with_directedness(true)
    }

    #[must_use]
    pub fn with_directedness(directed: bool) -> Self {
        Self {
            directed,
            ..Self::default()
        }
    }

    fn edge_slot(&self, source: &NodeKey, target: &NodeKey) -> (NodeKey, NodeKey) {
        if self.directed || source <= target {
            (source.clone(), target.clone())
        } else {
            (target.clone(), source.clone())
        }
    }

    #[must_use]
    pub fn graph_props(&self) -> &Props {
        &self.graph
    }

    pub fn graph_props_mut(&mut self) -> &mut Props {
        &mut self.graph
    }

    /// Add a node. Adding an existing node is a no-op.
    pub fn add_node(&mut self, key: impl Into<NodeKey>) -> &mut Props {
        let key = key.into();
        self.succ.entry(key.clone()).or_default();
        if self.directed {
            self.pred.entry(key.clone()).or_default();
        }
        self.nodes.entry(key).or_default()
    }

    #[must_use]
    pub fn has_node(&self, key: &NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    #[must_use]
    pub fn node(&self, key: &NodeKey) -> Option<&Props> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: &NodeKey) -> Option<&mut Props> {
        self.nodes.get_mut(key)
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, key: &NodeKey) -> Option<Props> {
        let props = self.nodes.remove(key)?;
        let mut incident: Vec<NodeKey> = self.succ.remove(key).into_iter().flatten().collect();
        incident.extend(self.pred.remove(key).into_iter().flatten());
        for other in &incident {
            if let Some(set) = self.succ.get_mut(other) {
                set.remove(key);
            }
            if let Some(set) = self.pred.get_mut(other) {
                set.remove(key);
            }
        }
        self.edges.retain(|(s, t), _| s != key && t != key);
        Some(props)
    }

    /// Add an edge, creating missing endpoints. Adding an existing edge
    /// returns its properties unchanged.
    pub fn add_edge(&mut self, source: impl Into<NodeKey>, target: impl Into<NodeKey>) -> &mut Props {
        let source = source.into();
        let target = target.into();
        self.add_node(source.clone());
        self.add_node(target.clone());

        if let Some(set) = self.succ.get_mut(&source) {
            set.insert(target.clone());
        }
        if self.directed {
            if let Some(set) = self.pred.get_mut(&target) {
                set.insert(source.clone());
            }
        } else if let Some(set) = self.succ.get_mut(&target) {
            set.insert(source.clone());
        }

        let slot = self.edge_slot(&source, &target);
        self.edges.entry(slot).or_default()
    }

    #[must_use]
    pub fn has_edge(&self, source: &NodeKey, target: &NodeKey) -> bool {
        self.edges.contains_key(&self.edge_slot(source, target))
    }

    #[must_use]
    pub fn edge(&self, source: &NodeKey, target: &NodeKey) -> Option<&Props> {
        self.edges.get(&self.edge_slot(source, target))
    }

    pub fn edge_mut(&mut self, source: &NodeKey, target: &NodeKey) -> Option<&mut Props> {
        let slot = self.edge_slot(source, target);
        self.edges.get_mut(&slot)
    }

    pub fn remove_edge(&mut self, source: &NodeKey, target: &NodeKey) -> Option<Props> {
        let props = self.edges.remove(&self.edge_slot(source, target))?;
        if let Some(set) = self.succ.get_mut(source) {
            set.remove(target);
        }
        if self.directed {
            if let Some(set) = self.pred.get_mut(target) {
                set.remove(source);
            }
        } else if let Some(set) = self.succ.get_mut(target) {
            set.remove(source);
        }
        Some(props)
    }

    /// Get all nodes in deterministic order.
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeKey, &Props)> {
        self.nodes.iter()
    }

    /// Get all edges in deterministic order.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeKey, &NodeKey, &Props)> {
        self.edges.iter().map(|((s, t), props)| (s, t, props))
    }

    /// Successors of a node (all neighbors when undirected).
    pub fn neighbors(&self, key: &NodeKey) -> impl Iterator<Item = &NodeKey> {
        self.succ.get(key).into_iter().flatten()
    }

    /// Predecessors of a node (all neighbors when undirected).
    pub fn predecessors(&self, key: &NodeKey) -> impl Iterator<Item = &NodeKey> {
        let source = if self.directed { &self.pred } else { &self.succ };
        source.get(key).into_iter().flatten()
    }

    /// Store a layout as `_x` / `_y` node properties. Keys missing from
    /// the graph are ignored. Returns the number of nodes updated.
    pub fn apply_layout(&mut self, positions: &BTreeMap<NodeKey, (f64, f64)>) -> usize {
        let mut updated = 0;
        for (key, &(x, y)) in positions {
            if let Some(props) = self.nodes.get_mut(key) {
                props.insert("_x".to_string(), Value::Float(x));
                props.insert("_y".to_string(), Value::Float(y));
                updated += 1;
            }
        }
        updated
    }
}

impl GraphShape for KeyedGraph {
    fn is_directed(&self) -> bool {
        self.directed
    }

    fn vertex_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_node_is_idempotent() {
        let mut graph = KeyedGraph::new();
        graph.add_node(1).insert("color".into(), Value::from("red"));
        graph.add_node(1);

        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(
            graph.node(&NodeKey::from(1)).and_then(|p| p.get("color")),
            Some(&Value::from("red"))
        );
    }

    #[test]
    fn add_edge_creates_endpoints() {
        let mut graph = KeyedGraph::new_directed();
        graph.add_edge("a", "b");

        assert!(graph.has_node(&NodeKey::from("a")));
        assert!(graph.has_node(&NodeKey::from("b")));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn undirected_edges_have_no_orientation() {
        let mut graph = KeyedGraph::new();
        graph.add_edge(2, 1).insert("w".into(), Value::Int(5));
        graph.add_edge(1, 2);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph
                .edge(&NodeKey::from(2), &NodeKey::from(1))
                .and_then(|p| p.get("w")),
            Some(&Value::Int(5))
        );
    }

    #[test]
    fn directed_edges_keep_orientation() {
        let mut graph = KeyedGraph::new_directed();
        graph.add_edge(1, 2);

        assert!(graph.has_edge(&NodeKey::from(1), &NodeKey::from(2)));
        assert!(!graph.has_edge(&NodeKey::from(2), &NodeKey::from(1)));

        graph.add_edge(2, 1);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn neighbors_in_deterministic_order() {
        let mut graph = KeyedGraph::new_directed();
        graph.add_edge(1, 3);
        graph.add_edge(1, 2);
        graph.add_edge(4, 1);

        let out: Vec<_> = graph.neighbors(&NodeKey::from(1)).cloned().collect();
        let inc: Vec<_> = graph.predecessors(&NodeKey::from(1)).cloned().collect();
        assert_eq!(out, vec![NodeKey::from(2), NodeKey::from(3)]);
        assert_eq!(inc, vec![NodeKey::from(4)]);
    }

    #[test]
    fn remove_node_drops_incident_edges() {
        let mut graph = KeyedGraph::new();
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);

        assert!(graph.remove_node(&NodeKey::from(2)).is_some());
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.neighbors(&NodeKey::from(1)).count(), 0);
    }

    #[test]
    fn remove_edge_updates_adjacency() {
        let mut graph = KeyedGraph::new();
        graph.add_edge(1, 2);

        assert!(graph.remove_edge(&NodeKey::from(2), &NodeKey::from(1)).is_some());
        assert_eq!(graph.neighbors(&NodeKey::from(1)).count(), 0);
        assert_eq!(graph.neighbors(&NodeKey::from(2)).count(), 0);
    }

    #[test]
    fn tuple_keys_have_no_wire_id() {
        let key = NodeKey::Tuple(vec![NodeKey::from(0), NodeKey::from(1)]);
        assert_eq!(key.as_vertex_id(), None);
        assert_eq!(key.to_string(), "(0, 1)");
    }

    #[test]
    fn apply_layout_writes_positions() {
        let mut graph = KeyedGraph::new();
        graph.add_node("a");

        let mut layout = BTreeMap::new();
        layout.insert(NodeKey::from("a"), (0.25, 0.75));
        layout.insert(NodeKey::from("ghost"), (1.0, 1.0));
        assert_eq!(graph.apply_layout(&layout), 1);

        let props = graph.node(&NodeKey::from("a")).expect("node exists");
        assert_eq!(props.get("_x"), Some(&Value::Float(0.25)));
        assert_eq!(props.get("_y"), Some(&Value::Float(0.75)));
        assert!(!graph.has_node(&NodeKey::from("ghost")));
    }
}
