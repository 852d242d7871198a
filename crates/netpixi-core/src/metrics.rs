//! # Metrics
//!
//! Per-vertex measures over a [`DenseGraph`], returned as one `f64` per
//! vertex in index order, plus largest-component extraction.
//!
//! Degrees follow the model's orientation rules: in an undirected graph
//! in, out and total degree all count incident edges.

use crate::error::GraphError;
use crate::graph::{DenseGraph, GraphShape, ID_KEY, PropertyKind, ScalarType, VertexIndex};
use crate::value::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

// =============================================================================
// DEGREE CENTRALITY
// =============================================================================

fn normalized(graph: &DenseGraph, degree: impl Fn(VertexIndex) -> usize, divisor: f64) -> Vec<f64> {
    let n = graph.vertex_count();
    if n < 2 {
        return vec![0.0; n];
    }
    let scale = (n - 1) as f64 * divisor;
    graph.vertices().map(|v| degree(v) as f64 / scale).collect()
}

/// In-degree divided by `n - 1`. All zeros when `n < 2`.
#[must_use]
pub fn in_degree(graph: &DenseGraph) -> Vec<f64> {
    normalized(graph, |v| graph.in_degree(v), 1.0)
}

/// Out-degree divided by `n - 1`. All zeros when `n < 2`.
#[must_use]
pub fn out_degree(graph: &DenseGraph) -> Vec<f64> {
    normalized(graph, |v| graph.out_degree(v), 1.0)
}

/// Total degree divided by `n - 1`, halved for directed graphs so that
/// the result stays within `[0, 1]` on simple graphs.
#[must_use]
pub fn total_degree(graph: &DenseGraph) -> Vec<f64> {
    if graph.is_directed() {
        normalized(graph, |v| graph.in_degree(v) + graph.out_degree(v), 2.0)
    } else {
        normalized(graph, |v| graph.out_degree(v), 1.0)
    }
}

// =============================================================================
// STRUCTURAL HOLES
// =============================================================================

/// Burt's effective size over out-neighbors.
///
/// For a vertex of out-degree `d` whose alters share `t` ties among
/// themselves (counted once per direction), the effective size is
/// `d - t / d`. Vertices without out-edges score 0.
#[must_use]
pub fn effective_size(graph: &DenseGraph) -> Vec<f64> {
    graph
        .vertices()
        .map(|v| {
            let degree = graph.out_degree(v);
            if degree == 0 {
                return 0.0;
            }
            let alters = graph.out_neighbors(v);
            let ties: usize = alters
                .iter()
                .map(|&j| graph.out_neighbors(j).intersection(&alters).count())
                .sum();
            let degree = degree as f64;
            degree - ties as f64 / degree
        })
        .collect()
}

/// Burt's constraint with uniform tie weights `p = 1 / out_degree`.
///
/// For each alter `j` of `v`, the indirect term sums `p(v) * p(q)` over the
/// alters `q` of `v` that point at `j`. Vertices without out-edges score
/// 2.
#[must_use]
pub fn constraint(graph: &DenseGraph) -> Vec<f64> {
    let weight: Vec<f64> = graph
        .vertices()
        .map(|v| match graph.out_degree(v) {
            0 => 0.0,
            d => 1.0 / d as f64,
        })
        .collect();
    let p = |v: VertexIndex| weight.get(v).copied().unwrap_or(0.0);

    graph
        .vertices()
        .map(|v| {
            if graph.out_degree(v) == 0 {
                return 2.0;
            }
            let alters = graph.out_neighbors(v);
            alters
                .iter()
                .map(|&j| {
                    let indirect: f64 = graph
                        .in_neighbors(j)
                        .intersection(&alters)
                        .map(|&q| p(v) * p(q))
                        .sum();
                    (p(v) + indirect).powi(2)
                })
                .sum()
        })
        .collect()
}

/// Store per-vertex values in a float vertex column named `key`.
pub fn store(graph: &mut DenseGraph, key: &str, values: &[f64]) -> Result<(), GraphError> {
    if values.len() != graph.vertex_count() {
        return Err(GraphError::LayoutSize {
            expected: graph.vertex_count(),
            found: values.len(),
        });
    }
    graph.new_vertex_property(key, PropertyKind::Scalar(ScalarType::Float))?;
    for (v, &value) in values.iter().enumerate() {
        graph.set_vertex_property(v, key, Value::Float(value))?;
    }
    Ok(())
}

// =============================================================================
// COMPONENTS
// =============================================================================

/// Weakly connected components, each sorted, in order of smallest member.
#[must_use]
pub fn components(graph: &DenseGraph) -> Vec<Vec<VertexIndex>> {
    let mut seen = vec![false; graph.vertex_count()];
    let mut result = Vec::new();
    for start in graph.vertices() {
        if seen.get(start).copied().unwrap_or(true) {
            continue;
        }
        let mut members = BTreeSet::new();
        let mut stack = vec![start];
        while let Some(v) = stack.pop() {
            match seen.get_mut(v) {
                Some(flag) if !*flag => *flag = true,
                _ => continue,
            }
            members.insert(v);
            stack.extend(graph.out_neighbors(v));
            stack.extend(graph.in_neighbors(v));
        }
        result.push(members.into_iter().collect());
    }
    result
}

/// Copy of the largest weakly connected component.
///
/// Ties go to the component holding the lowest vertex index. Graph,
/// vertex and edge properties are carried over with their kinds; vertex
/// ids are preserved, and a graph without an `id` column gets one holding
/// the original indices.
pub fn largest_component(graph: &DenseGraph) -> Result<DenseGraph, GraphError> {
    let mut best: Vec<VertexIndex> = Vec::new();
    for component in components(graph) {
        if component.len() > best.len() {
            best = component;
        }
    }

    let mut sub = DenseGraph::new(graph.is_directed());
    for (key, property) in graph.graph_properties() {
        sub.new_graph_property(key, property.kind());
        sub.set_graph_property(key, property.value().clone())?;
    }
    for (key, column) in graph.vertex_columns() {
        if key == ID_KEY {
            continue;
        }
        sub.new_vertex_property(key, column.kind())?;
    }
    for (key, column) in graph.edge_columns() {
        sub.new_edge_property(key, column.kind());
    }

    let mut index = BTreeMap::new();
    for &old in &best {
        let new = sub.add_vertex();
        index.insert(old, new);
        sub.set_vertex_id(new, graph.vertex_id(old).unwrap_or(Value::Int(old as i64)))?;
        for (key, column) in graph.vertex_columns() {
            if key == ID_KEY {
                continue;
            }
            if let Some(value) = column.get(old) {
                sub.set_vertex_property(new, key, value.clone())?;
            }
        }
    }

    for (e, u, v) in graph.edges() {
        let (Some(&su), Some(&sv)) = (index.get(&u), index.get(&v)) else {
            continue;
        };
        let new = sub.add_edge(su, sv)?;
        for (key, column) in graph.edge_columns() {
            if let Some(value) = column.get(e) {
                sub.set_edge_property(new, key, value.clone())?;
            }
        }
    }

    debug!(
        vertices = sub.vertex_count(),
        edges = sub.edge_count(),
        dropped = graph.vertex_count() - sub.vertex_count(),
        "extracted largest component"
    );
    Ok(sub)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::VertexId;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < EPSILON, "{actual:?} != {expected:?}");
        }
    }

    fn graph(directed: bool, n: usize, edges: &[(usize, usize)]) -> DenseGraph {
        let mut graph = DenseGraph::new(directed);
        for _ in 0..n {
            graph.add_vertex();
        }
        for &(u, v) in edges {
            graph.add_edge(u, v).expect("valid endpoints");
        }
        graph
    }

    #[test]
    fn degrees_on_directed_path() {
        let g = graph(true, 3, &[(0, 1), (1, 2)]);
        assert_close(&in_degree(&g), &[0.0, 0.5, 0.5]);
        assert_close(&out_degree(&g), &[0.5, 0.5, 0.0]);
        assert_close(&total_degree(&g), &[0.25, 0.5, 0.25]);
    }

    #[test]
    fn degrees_on_undirected_star() {
        let g = graph(false, 4, &[(0, 1), (0, 2), (0, 3)]);
        assert_close(&total_degree(&g), &[1.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]);
        assert_close(&in_degree(&g), &total_degree(&g));
    }

    #[test]
    fn degrees_of_tiny_graphs_are_zero() {
        assert!(in_degree(&graph(false, 0, &[])).is_empty());
        assert_close(&out_degree(&graph(true, 1, &[])), &[0.0]);
    }

    #[test]
    fn effective_size_of_star_and_triangle() {
        // Hub of a star: three alters with no ties among them.
        let star = graph(false, 4, &[(0, 1), (0, 2), (0, 3)]);
        assert_close(&effective_size(&star), &[3.0, 1.0, 1.0, 1.0]);

        // Triangle: each vertex has two alters tied to each other.
        let triangle = graph(false, 3, &[(0, 1), (1, 2), (2, 0)]);
        assert_close(&effective_size(&triangle), &[1.0, 1.0, 1.0]);

        let isolated = graph(true, 2, &[(0, 1)]);
        assert_close(&effective_size(&isolated), &[1.0, 0.0]);
    }

    #[test]
    fn constraint_of_star_and_triangle() {
        let star = graph(false, 4, &[(0, 1), (0, 2), (0, 3)]);
        let c = constraint(&star);
        assert!((c[0] - 1.0 / 3.0).abs() < EPSILON);
        assert!((c[1] - 1.0).abs() < EPSILON);

        // p = 1/2 everywhere; each alter term is (1/2 + 1/4)^2.
        let triangle = graph(false, 3, &[(0, 1), (1, 2), (2, 0)]);
        assert_close(&constraint(&triangle), &[1.125, 1.125, 1.125]);
    }

    #[test]
    fn constraint_without_out_edges_is_two() {
        let g = graph(true, 2, &[(0, 1)]);
        assert_close(&constraint(&g), &[1.0, 2.0]);
    }

    #[test]
    fn store_writes_float_column() {
        let mut g = graph(false, 2, &[(0, 1)]);
        let values = total_degree(&g);
        store(&mut g, "degree", &values).expect("one value per vertex");
        assert_eq!(g.vertex_property(1, "degree"), Some(&Value::Float(1.0)));
        assert!(store(&mut g, "degree", &[1.0]).is_err());
    }

    #[test]
    fn components_are_weak() {
        let g = graph(true, 5, &[(1, 0), (2, 1), (4, 3)]);
        assert_eq!(components(&g), vec![vec![0, 1, 2], vec![3, 4]]);
    }

    #[test]
    fn largest_component_keeps_ids_and_properties() {
        let mut g = DenseGraph::new(false);
        for id in ["a", "b", "c", "d", "e"] {
            g.add_vertex_with_id(VertexId::from(id)).expect("fresh id");
        }
        g.new_vertex_property("size", PropertyKind::Scalar(ScalarType::Int))
            .expect("not reserved");
        g.set_vertex_property(4, "size", Value::Int(9)).expect("valid vertex");
        g.new_edge_property("w", PropertyKind::Object);
        g.add_edge(0, 1).expect("valid endpoints");
        let e = g.add_edge(2, 3).expect("valid endpoints");
        g.add_edge(3, 4).expect("valid endpoints");
        g.set_edge_property(e, "w", Value::Float(0.5)).expect("valid edge");
        g.new_graph_property("name", PropertyKind::Object);
        g.set_graph_property("name", Value::from("g")).expect("declared");

        let sub = largest_component(&g).expect("copyable graph");
        assert_eq!(sub.vertex_count(), 3);
        assert_eq!(sub.edge_count(), 2);
        assert_eq!(sub.graph_property("name"), Some(&Value::from("g")));

        let c = sub.find_vertex(&VertexId::from("c")).expect("c kept");
        let d = sub.find_vertex(&VertexId::from("d")).expect("d kept");
        let e_new = sub.find_vertex(&VertexId::from("e")).expect("e kept");
        assert!(sub.find_vertex(&VertexId::from("a")).is_none());
        assert_eq!(sub.vertex_property(e_new, "size"), Some(&Value::Int(9)));

        let edge = sub.edge(c, d).expect("edge kept");
        assert_eq!(sub.edge_property(edge, "w"), Some(&Value::Float(0.5)));
    }

    #[test]
    fn largest_component_records_indices_as_ids() {
        let g = graph(false, 4, &[(2, 3)]);
        let sub = largest_component(&g).expect("copyable graph");
        assert_eq!(sub.vertex_id(0), Some(Value::Int(2)));
        assert_eq!(sub.vertex_id(1), Some(Value::Int(3)));
    }
}
