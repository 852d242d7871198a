//! # Streaming Writers
//!
//! Incremental producers of the wire format, for callers that have no
//! graph model to hand: a [`GraphWriter`] emits a settings record up front
//! and then vertices and edges as they arrive; an [`AnimationWriter`]
//! emits frames.
//!
//! Both write through a [`Sink`]. [`GzipSink`] produces a `.net.gz` file;
//! [`ChunkSink`] base64-encodes each line for the renderer's side channel.
//!
//! Unlike the savers, writers do not check uniqueness or references. They
//! only check the fields the renderer interprets directly.

use crate::error::{FieldError, Result};
use crate::id::VertexId;
use crate::options::SaveOptions;
use crate::record::Record;
use crate::value::{Props, Value, first_unserializable};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, trace};

/// Vertex fields that must be numbers.
pub const NUMERIC_VERTEX_FIELDS: [&str; 2] = ["x", "y"];

/// Vertex fields that must be strings.
pub const TEXT_VERTEX_FIELDS: [&str; 2] = ["key", "value"];

/// Edge fields that must be strings.
pub const TEXT_EDGE_FIELDS: [&str; 1] = ["label"];

// =============================================================================
// SINKS
// =============================================================================

/// Destination for encoded lines.
pub trait Sink {
    /// What the sink hands back once finished.
    type Output;

    fn send(&mut self, line: &str) -> Result<()>;

    fn finish(self) -> Result<Self::Output>;
}

/// Gzip-compressed file output.
pub struct GzipSink {
    encoder: GzEncoder<BufWriter<File>>,
}

impl GzipSink {
    pub fn create(path: impl AsRef<Path>, options: &SaveOptions) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            encoder: GzEncoder::new(BufWriter::new(file), options.compression()),
        })
    }
}

impl Sink for GzipSink {
    type Output = ();

    fn send(&mut self, line: &str) -> Result<()> {
        self.encoder.write_all(line.as_bytes())?;
        Ok(())
    }

    fn finish(self) -> Result<()> {
        self.encoder.finish()?.flush()?;
        Ok(())
    }
}

/// Collects base64 chunks, one per line, for the side channel.
#[derive(Debug, Default, Clone)]
pub struct ChunkSink {
    chunks: Vec<String>,
}

impl ChunkSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    #[must_use]
    pub fn into_chunks(self) -> Vec<String> {
        self.chunks
    }
}

impl Sink for ChunkSink {
    type Output = Vec<String>;

    fn send(&mut self, line: &str) -> Result<()> {
        self.chunks.push(STANDARD.encode(line.as_bytes()));
        Ok(())
    }

    fn finish(self) -> Result<Vec<String>> {
        Ok(self.chunks)
    }
}

// =============================================================================
// FIELD CHECKS
// =============================================================================

fn check_fields(props: &Props, numeric: &[&str], text: &[&str]) -> std::result::Result<(), FieldError> {
    for key in numeric {
        if props.get(*key).is_some_and(|v| !v.is_number()) {
            return Err(FieldError::NotNumber((*key).to_string()));
        }
    }
    for key in text {
        if props.get(*key).is_some_and(|v| !matches!(v, Value::Str(_))) {
            return Err(FieldError::NotString((*key).to_string()));
        }
    }
    if let Some(key) = first_unserializable(props) {
        return Err(FieldError::NotSerializable(key.to_string()));
    }
    Ok(())
}

fn non_empty(props: Props) -> Option<Props> {
    (!props.is_empty()).then_some(props)
}

// =============================================================================
// GRAPH WRITER
// =============================================================================

/// Writes one graph record by record.
pub struct GraphWriter<S: Sink> {
    sink: S,
    vertices: usize,
    edges: usize,
}

impl GraphWriter<GzipSink> {
    /// Create a file and write its settings record.
    pub fn create(path: impl AsRef<Path>, settings: Props, options: &SaveOptions) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening graph stream");
        Self::with_sink(GzipSink::create(path, options)?, settings)
    }
}

impl<S: Sink> GraphWriter<S> {
    /// Write the settings record to `sink`.
    pub fn with_sink(mut sink: S, settings: Props) -> Result<Self> {
        if let Some(key) = first_unserializable(&settings) {
            return Err(FieldError::NotSerializable(key.to_string()).into());
        }
        let record = Record::Settings {
            props: non_empty(settings),
        };
        sink.send(&record.encode()?)?;
        Ok(Self {
            sink,
            vertices: 0,
            edges: 0,
        })
    }

    pub fn write_vertex(&mut self, id: impl Into<VertexId>, props: Props) -> Result<()> {
        check_fields(&props, &NUMERIC_VERTEX_FIELDS, &TEXT_VERTEX_FIELDS)?;
        let record = Record::Vertex {
            id: id.into(),
            props: non_empty(props),
        };
        trace!(kind = record.kind(), "stream record");
        self.sink.send(&record.encode()?)?;
        self.vertices += 1;
        Ok(())
    }

    pub fn write_edge(
        &mut self,
        source: impl Into<VertexId>,
        target: impl Into<VertexId>,
        props: Props,
    ) -> Result<()> {
        check_fields(&props, &[], &TEXT_EDGE_FIELDS)?;
        let record = Record::Edge {
            source: source.into(),
            target: target.into(),
            props: non_empty(props),
        };
        trace!(kind = record.kind(), "stream record");
        self.sink.send(&record.encode()?)?;
        self.edges += 1;
        Ok(())
    }

    /// Flush and close the sink.
    pub fn finish(self) -> Result<S::Output> {
        debug!(vertices = self.vertices, edges = self.edges, "closing graph stream");
        self.sink.finish()
    }
}

// =============================================================================
// ANIMATION WRITER
// =============================================================================

/// Writes an animation: a sequence of timed frames.
pub struct AnimationWriter<S: Sink> {
    sink: S,
    frames: usize,
}

impl AnimationWriter<GzipSink> {
    pub fn create(path: impl AsRef<Path>, options: &SaveOptions) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening animation stream");
        Ok(Self::with_sink(GzipSink::create(path, options)?))
    }
}

impl<S: Sink> AnimationWriter<S> {
    pub fn with_sink(sink: S) -> Self {
        Self { sink, frames: 0 }
    }

    /// Append a frame lasting `duration` milliseconds.
    pub fn write_frame(&mut self, duration: u64, props: Props) -> Result<()> {
        check_fields(&props, &[], &[])?;
        let record = Record::Frame {
            duration,
            props: non_empty(props),
        };
        self.sink.send(&record.encode()?)?;
        self.frames += 1;
        Ok(())
    }

    pub fn finish(self) -> Result<S::Output> {
        debug!(frames = self.frames, "closing animation stream");
        self.sink.finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetpixiError;

    fn props(entries: Vec<(&str, Value)>) -> Props {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn decode(chunk: &str) -> String {
        let bytes = STANDARD.decode(chunk).expect("valid base64");
        String::from_utf8(bytes).expect("utf-8 line")
    }

    fn field_error(result: Result<()>) -> Option<FieldError> {
        match result {
            Err(NetpixiError::Field(err)) => Some(err),
            _ => None,
        }
    }

    #[test]
    fn chunks_are_base64_lines() {
        let mut writer = GraphWriter::with_sink(ChunkSink::new(), Props::new()).expect("empty settings");
        writer
            .write_vertex(1, props(vec![("x", Value::Float(0.5))]))
            .expect("numeric x");
        writer.write_edge(1, "b", Props::new()).expect("plain edge");
        let chunks = writer.finish().expect("chunk sink never fails");

        let lines: Vec<String> = chunks.iter().map(|c| decode(c)).collect();
        assert_eq!(
            lines,
            vec![
                "{\"type\":\"settings\"}\n".to_string(),
                "{\"type\":\"vertex\",\"id\":1,\"props\":{\"x\":0.5}}\n".to_string(),
                "{\"type\":\"edge\",\"source\":1,\"target\":\"b\"}\n".to_string(),
            ]
        );
    }

    #[test]
    fn vertex_fields_are_checked() {
        let mut writer = GraphWriter::with_sink(ChunkSink::new(), Props::new()).expect("empty settings");

        assert_eq!(
            field_error(writer.write_vertex(1, props(vec![("y", Value::from("high"))]))),
            Some(FieldError::NotNumber("y".into()))
        );
        assert_eq!(
            field_error(writer.write_vertex(1, props(vec![("key", Value::Int(4))]))),
            Some(FieldError::NotString("key".into()))
        );
        assert!(writer
            .write_vertex(1, props(vec![("x", Value::Int(3)), ("value", Value::from("v"))]))
            .is_ok());
    }

    #[test]
    fn edge_label_must_be_text() {
        let mut writer = GraphWriter::with_sink(ChunkSink::new(), Props::new()).expect("empty settings");
        assert_eq!(
            field_error(writer.write_edge(1, 2, props(vec![("label", Value::Float(1.0))]))),
            Some(FieldError::NotString("label".into()))
        );
    }

    #[test]
    fn opaque_values_are_refused() {
        let mut writer = GraphWriter::with_sink(ChunkSink::new(), Props::new()).expect("empty settings");
        assert_eq!(
            field_error(writer.write_edge(1, 2, props(vec![("data", Value::Opaque("fn".into()))]))),
            Some(FieldError::NotSerializable("data".into()))
        );
        // Nothing was written for the rejected edge.
        assert_eq!(writer.finish().expect("chunk sink").len(), 1);
    }

    #[test]
    fn frames_carry_duration() {
        let mut writer = AnimationWriter::with_sink(ChunkSink::new());
        writer
            .write_frame(250, props(vec![("graph", Value::map([("color", Value::Int(3))]))]))
            .expect("serializable frame");
        writer.write_frame(0, Props::new()).expect("empty frame");
        let chunks = writer.finish().expect("chunk sink");

        assert_eq!(
            decode(&chunks[0]),
            "{\"type\":\"frame\",\"duration\":250,\"props\":{\"graph\":{\"color\":3}}}\n"
        );
        assert_eq!(decode(&chunks[1]), "{\"type\":\"frame\",\"duration\":0}\n");
    }

    #[test]
    fn gzip_file_round_trips() {
        use flate2::read::MultiGzDecoder;
        use std::io::Read;

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("stream.net.gz");

        let settings = props(vec![("graph", Value::map([("directed", Value::Bool(true))]))]);
        let mut writer = GraphWriter::create(&path, settings, &SaveOptions::default()).expect("file created");
        writer.write_vertex(0, Props::new()).expect("vertex");
        writer.finish().expect("flushed");

        let mut text = String::new();
        MultiGzDecoder::new(File::open(&path).expect("file exists"))
            .read_to_string(&mut text)
            .expect("valid gzip");
        assert_eq!(
            text,
            "{\"type\":\"settings\",\"props\":{\"graph\":{\"directed\":true}}}\n{\"type\":\"vertex\",\"id\":0}\n"
        );
    }
}
