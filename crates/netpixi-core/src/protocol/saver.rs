//! Saving: a graph model into gzip JSON lines.

use crate::error::{Result, ValidationError};
use crate::id::VertexId;
use crate::options::SaveOptions;
use crate::record::Record;
use crate::value::Props;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

// =============================================================================
// SAVER TRAIT
// =============================================================================

/// Model-specific hooks driven by [`save`].
///
/// `validate` runs first and may cache whatever the enumeration hooks
/// need (the dense adapter resolves its id table there). The enumeration
/// hooks are only called after a successful `validate`.
pub trait Saver {
    type Graph;

    fn validate(&mut self, graph: &Self::Graph) -> std::result::Result<(), ValidationError>;

    /// Settings payload, already split into namespaces.
    fn settings(&self, graph: &Self::Graph) -> Props;

    fn vertices<'g>(&'g self, graph: &'g Self::Graph) -> impl Iterator<Item = (VertexId, Props)> + 'g;

    fn edges<'g>(
        &'g self,
        graph: &'g Self::Graph,
    ) -> impl Iterator<Item = (VertexId, VertexId, Props)> + 'g;
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Validate, then write a gzip-compressed file.
///
/// Nothing is created on disk when validation fails. A failure while
/// writing leaves a truncated file behind.
pub fn save<S: Saver>(
    mut saver: S,
    graph: &S::Graph,
    path: impl AsRef<Path>,
    options: &SaveOptions,
) -> Result<()> {
    let path = path.as_ref();
    saver.validate(graph)?;

    let file = File::create(path)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), options.compression());
    let (vertices, edges) = write_records(&saver, graph, &mut encoder)?;
    encoder.finish()?.flush()?;

    debug!(
        path = %path.display(),
        vertices,
        edges,
        level = options.level(),
        "saved graph"
    );
    Ok(())
}

/// Validate, then write uncompressed lines to any writer.
pub fn save_to_writer<S: Saver, W: Write>(mut saver: S, graph: &S::Graph, writer: &mut W) -> Result<()> {
    saver.validate(graph)?;
    write_records(&saver, graph, writer)?;
    writer.flush()?;
    Ok(())
}

/// Emit the settings record followed by every vertex and edge.
///
/// Callers must have validated the graph. Returns the vertex and edge
/// counts written.
pub fn write_records<S: Saver, W: Write>(
    saver: &S,
    graph: &S::Graph,
    writer: &mut W,
) -> Result<(usize, usize)> {
    let settings = Record::Settings {
        props: Some(saver.settings(graph)),
    };
    writer.write_all(settings.encode()?.as_bytes())?;

    let mut vertices = 0usize;
    for (id, props) in saver.vertices(graph) {
        let record = Record::Vertex {
            id,
            props: Some(props),
        };
        writer.write_all(record.encode()?.as_bytes())?;
        vertices += 1;
    }

    let mut edges = 0usize;
    for (source, target, props) in saver.edges(graph) {
        let record = Record::Edge {
            source,
            target,
            props: Some(props),
        };
        writer.write_all(record.encode()?.as_bytes())?;
        edges += 1;
    }

    Ok((vertices, edges))
}

// =============================================================================
// TESTS
// =============================================================================
