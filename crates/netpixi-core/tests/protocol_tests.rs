//! Integration tests for loading and saving `.net.gz` files.
//!
//! Uses tempfile for every file-based round trip.

#![allow(clippy::unwrap_used, clippy::panic)]

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use netpixi_core::{
    DenseGraph, GraphShape, KeyedGraph, LoadError, LoadErrorKind, NetpixiError, NodeKey,
    PropertyKind, Props, SaveOptions, ScalarType, ValidationError, Value, VertexId, load_dense,
    load_keyed, save_dense, save_keyed,
};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write `lines` as a gzip file and return its path.
fn write_gz(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.path().join(name);
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    for line in lines {
        encoder.write_all(line.as_bytes()).unwrap();
        encoder.write_all(b"\n").unwrap();
    }
    encoder.finish().unwrap();
    path
}

fn read_gz(path: &Path) -> String {
    let mut text = String::new();
    MultiGzDecoder::new(File::open(path).unwrap())
        .read_to_string(&mut text)
        .unwrap();
    text
}

fn load_error(result: netpixi_core::Result<KeyedGraph>) -> LoadError {
    match result {
        Err(NetpixiError::Load(err)) => err,
        other => panic!("expected a load error, got {other:?}"),
    }
}

const SETTINGS: &str = r#"{"type":"settings"}"#;
const DIRECTED: &str = r#"{"type":"settings","props":{"graph":{"directed":true}}}"#;

// =============================================================================
// ROUND TRIPS
// =============================================================================

#[test]
fn test_keyed_round_trip_preserves_everything() {
    let temp = create_temp_dir();
    let path = temp.path().join("keyed.net.gz");

    let mut graph = KeyedGraph::new_directed();
    graph
        .graph_props_mut()
        .insert("vertex".into(), Value::map([("color", Value::Int(0x00ff00))]));
    graph.graph_props_mut().insert("width".into(), Value::Int(800));
    graph
        .add_node(0)
        .insert("tags".into(), Value::List(vec![Value::from("a"), Value::Null]));
    graph.add_node("n1").insert("x".into(), Value::Float(-0.25));
    graph.add_edge(0, "n1").insert("w".into(), Value::Float(2.5));
    graph.add_edge("n1", 0);

    save_keyed(&graph, &path, &SaveOptions::default()).unwrap();
    let loaded = load_keyed(&path).unwrap();

    assert!(loaded.is_directed());
    assert_eq!(loaded.vertex_count(), 2);
    assert_eq!(loaded.edge_count(), 2);
    assert_eq!(loaded.node(&NodeKey::from(0)), graph.node(&NodeKey::from(0)));
    assert_eq!(
        loaded.edge(&NodeKey::from(0), &NodeKey::from("n1")),
        Some(&Props::from([("w".to_string(), Value::Float(2.5))]))
    );

    // Flat graph properties come back namespaced.
    let graph_ns = loaded.graph_props().get("graph").unwrap();
    assert_eq!(graph_ns.get("width"), Some(&Value::Int(800)));
    assert_eq!(graph_ns.get("directed"), Some(&Value::Bool(true)));
    assert_eq!(
        loaded.graph_props().get("vertex"),
        Some(&Value::map([("color", Value::Int(0x00ff00))]))
    );

    // A second trip is a fixed point.
    let again = temp.path().join("again.net.gz");
    save_keyed(&loaded, &again, &SaveOptions::default()).unwrap();
    let settings = r#"{"type":"settings","props":{"graph":{"width":800,"directed":true},"vertex":{"color":65280}}}"#;
    assert_eq!(read_gz(&path).lines().count(), 5);
    assert_eq!(read_gz(&path).lines().next(), Some(settings));
    assert_eq!(read_gz(&again), read_gz(&path));
    assert_eq!(load_keyed(&again).unwrap(), loaded);
}

#[test]
fn test_dense_round_trip_preserves_ids_and_columns() {
    let temp = create_temp_dir();
    let path = temp.path().join("dense.net.gz");

    let mut graph = DenseGraph::new(false);
    let a = graph.add_vertex_with_id(VertexId::from("a")).unwrap();
    let b = graph.add_vertex_with_id(VertexId::from(0)).unwrap();
    graph
        .new_vertex_property("size", PropertyKind::Scalar(ScalarType::Int))
        .unwrap();
    graph.set_vertex_property(a, "size", Value::Int(4)).unwrap();
    graph.new_edge_property("label", PropertyKind::Object);
    let e = graph.add_edge(a, b).unwrap();
    graph.set_edge_property(e, "label", Value::from("ab")).unwrap();

    save_dense(&graph, &path, &SaveOptions::new().with_compression(9)).unwrap();
    let loaded = load_dense(&path).unwrap();

    assert!(!loaded.is_directed());
    let la = loaded.find_vertex(&VertexId::from("a")).unwrap();
    let lb = loaded.find_vertex(&VertexId::from(0)).unwrap();
    assert_eq!(loaded.vertex_property(la, "size"), Some(&Value::Int(4)));
    assert_eq!(loaded.vertex_property(lb, "size"), Some(&Value::Int(0)));
    let le = loaded.edge(lb, la).unwrap();
    assert_eq!(loaded.edge_property(le, "label"), Some(&Value::from("ab")));
}

#[test]
fn test_dense_and_keyed_read_the_same_file() {
    let temp = create_temp_dir();
    let path = write_gz(
        &temp,
        "shared.net.gz",
        &[
            DIRECTED,
            r#"{"type":"vertex","id":1,"props":{"name":"one"}}"#,
            r#"{"type":"vertex","id":2}"#,
            r#"{"type":"edge","source":2,"target":1}"#,
        ],
    );

    let dense = load_dense(&path).unwrap();
    let keyed = load_keyed(&path).unwrap();
    assert_eq!(dense.vertex_count(), keyed.vertex_count());
    assert_eq!(dense.edge_count(), keyed.edge_count());
    assert!(dense.is_directed() && keyed.is_directed());
}

#[test]
fn test_null_properties_are_not_written() {
    let temp = create_temp_dir();
    let path = temp.path().join("nulls.net.gz");

    let mut graph = KeyedGraph::new();
    graph.add_node(1).insert("gone".into(), Value::Null);
    save_keyed(&graph, &path, &SaveOptions::default()).unwrap();

    assert_eq!(read_gz(&path), "{\"type\":\"settings\"}\n{\"type\":\"vertex\",\"id\":1}\n");
    let loaded = load_keyed(&path).unwrap();
    assert!(loaded.node(&NodeKey::from(1)).unwrap().is_empty());
}

// =============================================================================
// LOAD SCENARIOS
// =============================================================================

#[test]
fn test_duplicate_settings_at_second_line() {
    let temp = create_temp_dir();
    let path = write_gz(&temp, "dup2.net.gz", &[SETTINGS, SETTINGS]);
    let err = load_error(load_keyed(&path));
    assert_eq!(err, LoadError::new(2, LoadErrorKind::DuplicateSettings));
    assert_eq!(err.to_string(), "Line 2: duplicate settings");
}

#[test]
fn test_duplicate_settings_at_third_line() {
    let temp = create_temp_dir();
    let path = write_gz(
        &temp,
        "dup3.net.gz",
        &[SETTINGS, r#"{"type":"vertex","id":1}"#, SETTINGS],
    );
    assert_eq!(
        load_error(load_keyed(&path)),
        LoadError::new(3, LoadErrorKind::DuplicateSettings)
    );
}

#[test]
fn test_edge_to_undeclared_vertex() {
    let temp = create_temp_dir();
    let path = write_gz(
        &temp,
        "missing.net.gz",
        &[
            SETTINGS,
            r#"{"type":"vertex","id":1}"#,
            r#"{"type":"edge","source":1,"target":"x"}"#,
        ],
    );
    let err = load_error(load_keyed(&path));
    assert_eq!(
        err,
        LoadError::new(3, LoadErrorKind::MissingTarget(VertexId::from("x")))
    );
    assert_eq!(err.to_string(), "Line 3: missing target with id x");
}

#[test]
fn test_vertex_id_zero_is_valid() {
    let temp = create_temp_dir();
    let path = write_gz(
        &temp,
        "zero.net.gz",
        &[
            SETTINGS,
            r#"{"type":"vertex","id":0}"#,
            r#"{"type":"vertex","id":1}"#,
            r#"{"type":"edge","source":0,"target":1}"#,
        ],
    );
    let graph = load_dense(&path).unwrap();
    assert_eq!(graph.find_vertex(&VertexId::from(0)), Some(0));
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_directed_accepts_both_orientations_once() {
    let temp = create_temp_dir();
    let both = write_gz(
        &temp,
        "both.net.gz",
        &[
            DIRECTED,
            r#"{"type":"vertex","id":1}"#,
            r#"{"type":"vertex","id":2}"#,
            r#"{"type":"edge","source":1,"target":2}"#,
            r#"{"type":"edge","source":2,"target":1}"#,
        ],
    );
    assert_eq!(load_keyed(&both).unwrap().edge_count(), 2);

    let repeated = write_gz(
        &temp,
        "repeated.net.gz",
        &[
            DIRECTED,
            r#"{"type":"vertex","id":1}"#,
            r#"{"type":"vertex","id":2}"#,
            r#"{"type":"edge","source":1,"target":2}"#,
            r#"{"type":"edge","source":2,"target":1}"#,
            r#"{"type":"edge","source":1,"target":2}"#,
        ],
    );
    assert_eq!(
        load_error(load_keyed(&repeated)),
        LoadError::new(
            6,
            LoadErrorKind::DuplicateEdge {
                from: VertexId::from(1),
                to: VertexId::from(2)
            }
        )
    );
}

#[test]
fn test_undirected_rejects_reverse_edge() {
    let temp = create_temp_dir();
    let path = write_gz(
        &temp,
        "reverse.net.gz",
        &[
            SETTINGS,
            r#"{"type":"vertex","id":1}"#,
            r#"{"type":"vertex","id":2}"#,
            r#"{"type":"edge","source":1,"target":2}"#,
            r#"{"type":"edge","source":2,"target":1}"#,
        ],
    );
    let err = load_error(load_keyed(&path));
    assert_eq!(err.line, 5);
    assert!(matches!(err.kind, LoadErrorKind::DuplicateEdge { .. }));
}

#[test]
fn test_malformed_records() {
    let temp = create_temp_dir();
    let cases: [(&str, LoadErrorKind); 5] = [
        ("[1, 2]", LoadErrorKind::NotAnObject),
        (r#"{"type":"vertex","id":1,"props":[]}"#, LoadErrorKind::InvalidProps),
        (r#"{"type":"vertex"}"#, LoadErrorKind::MissingField("id")),
        (r#"{"type":"vertex","id":1.5}"#, LoadErrorKind::InvalidId("id")),
        (r#"{"type":"node","id":1}"#, LoadErrorKind::UnknownType("node".into())),
    ];
    for (i, (line, kind)) in cases.into_iter().enumerate() {
        let path = write_gz(&temp, &format!("bad{i}.net.gz"), &[SETTINGS, line]);
        assert_eq!(load_error(load_keyed(&path)), LoadError::new(2, kind));
    }
}

#[test]
fn test_broken_graph_invariants_report_their_line() {
    let temp = create_temp_dir();
    let vertex = |id: i64| format!(r#"{{"type":"vertex","id":{id}}}"#);
    let cases: [(Vec<String>, LoadError); 4] = [
        (
            vec![SETTINGS.into(), vertex(1), r#"{"type":"edge","source":1,"target":1}"#.into()],
            LoadError::new(3, LoadErrorKind::SelfLoop(VertexId::from(1))),
        ),
        (
            vec![SETTINGS.into(), vertex(1), vertex(2), vertex(1)],
            LoadError::new(4, LoadErrorKind::DuplicateVertex(VertexId::from(1))),
        ),
        (
            vec![SETTINGS.into(), vertex(1), r#"{"type":"edge","source":7,"target":1}"#.into()],
            LoadError::new(3, LoadErrorKind::MissingSource(VertexId::from(7))),
        ),
        (
            vec![SETTINGS.into(), vertex(1), r#"{"type":"edge","source":99}"#.into()],
            LoadError::new(3, LoadErrorKind::MissingSource(VertexId::from(99))),
        ),
    ];
    for (i, (lines, expected)) in cases.into_iter().enumerate() {
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        let path = write_gz(&temp, &format!("broken{i}.net.gz"), &lines);
        assert_eq!(load_error(load_keyed(&path)), expected);
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let temp = create_temp_dir();
    let result = load_dense(temp.path().join("absent.net.gz"));
    assert!(matches!(result, Err(NetpixiError::Io(_))));
}

// =============================================================================
// SAVE SCENARIOS
// =============================================================================

#[test]
fn test_invalid_graph_leaves_no_file() {
    let temp = create_temp_dir();
    let path = temp.path().join("loop.net.gz");

    let mut graph = KeyedGraph::new();
    graph.add_edge(1, 1);
    let result = save_keyed(&graph, &path, &SaveOptions::default());

    assert!(matches!(
        result,
        Err(NetpixiError::Validation(ValidationError::SelfLoop(_)))
    ));
    assert!(!path.exists());
}

#[test]
fn test_null_directed_flag_still_saves_directed() {
    let temp = create_temp_dir();
    let path = temp.path().join("null_directed.net.gz");

    let mut graph = KeyedGraph::new_directed();
    graph
        .graph_props_mut()
        .insert("graph".into(), Value::map([("directed", Value::Null)]));
    graph.add_edge(1, 2);
    graph.add_edge(2, 1);
    save_keyed(&graph, &path, &SaveOptions::default()).unwrap();

    assert!(read_gz(&path).starts_with(DIRECTED));
    let loaded = load_keyed(&path).unwrap();
    assert!(loaded.is_directed());
    assert_eq!(loaded.edge_count(), 2);
}

#[test]
fn test_validation_messages() {
    let temp = create_temp_dir();
    let path = temp.path().join("bad.net.gz");

    let mut graph = KeyedGraph::new();
    graph
        .add_edge("a", "b")
        .insert("cb".into(), Value::Opaque("callback".into()));
    let err = save_keyed(&graph, &path, &SaveOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Property cb of edge with source a and target b must be serializable"
    );
}
