//! Settings namespaces.
//!
//! The renderer reads three namespaces from the settings record: `graph`
//! (graph-wide drawing attributes, including `directed`), `vertex` and
//! `edge` (default drawing attributes for every element). Graph models
//! keep all of them in one flat graph-level property bag; this module maps
//! between the two shapes.

use crate::error::ValidationError;
use crate::value::{Props, Value};

pub const GRAPH: &str = "graph";
pub const VERTEX: &str = "vertex";
pub const EDGE: &str = "edge";
pub const DIRECTED: &str = "directed";

/// Build the settings payload from flat graph-level properties.
///
/// - null-valued properties are dropped first;
/// - map-valued `vertex` and `edge` move to their own namespaces;
/// - if exactly one map-valued `graph` remains it becomes the graph
///   namespace, otherwise everything left over does;
/// - a null `directed` in the graph namespace is dropped, and directed
///   graphs get `directed: true` unless they already declare it;
/// - empty namespaces are left out.
#[must_use]
pub fn settings_props(flat: &Props, directed: bool) -> Props {
    let mut rest: Props = flat
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let edge = take_map(&mut rest, EDGE);
    let vertex = take_map(&mut rest, VERTEX);

    let promote = rest.len() == 1 && matches!(rest.get(GRAPH), Some(Value::Map(_)));
    let mut graph = if promote {
        take_map(&mut rest, GRAPH)
    } else {
        rest.into_iter().map(|(k, v)| (Value::Str(k), v)).collect()
    };

    graph.retain(|(k, v)| !(k.as_str() == Some(DIRECTED) && v.is_null()));
    if directed && !graph.iter().any(|(k, _)| k.as_str() == Some(DIRECTED)) {
        graph.push((Value::from(DIRECTED), Value::Bool(true)));
    }

    let mut settings = Props::new();
    for (name, entries) in [(GRAPH, graph), (VERTEX, vertex), (EDGE, edge)] {
        if !entries.is_empty() {
            settings.insert(name.to_string(), Value::Map(entries));
        }
    }
    settings
}

fn take_map(props: &mut Props, key: &str) -> Vec<(Value, Value)> {
    match props.remove(key) {
        Some(Value::Map(entries)) => entries,
        Some(other) => {
            props.insert(key.to_string(), other);
            Vec::new()
        }
        None => Vec::new(),
    }
}

/// Check every `directed` flag a graph declares against its real type.
///
/// Both the top-level property and the one inside a `graph` namespace are
/// checked when present.
pub fn check_directed(flat: &Props, directed: bool) -> Result<(), ValidationError> {
    let top = flat.get(DIRECTED);
    let nested = flat.get(GRAPH).and_then(|graph| graph.get(DIRECTED));
    for declared in [top, nested].into_iter().flatten() {
        match declared {
            Value::Null => {}
            Value::Bool(flag) if *flag == directed => {}
            Value::Bool(_) => return Err(ValidationError::DirectedMismatch { expected: directed }),
            _ => return Err(ValidationError::DirectedNotBool),
        }
    }
    Ok(())
}
