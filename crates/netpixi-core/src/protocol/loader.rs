//! Loading: gzip JSON lines into a graph model.

use crate::error::{GraphError, LoadError, LoadErrorKind, Result};
use crate::id::VertexId;
use crate::record::{Endpoint, Record};
use crate::value::{Props, Value};
use flate2::read::MultiGzDecoder;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use tracing::{debug, trace};

// =============================================================================
// LOADER TRAIT
// =============================================================================

/// Model-specific hooks driven by [`load`].
///
/// The driver has already checked every invariant of the wire format when
/// a hook runs: ids are unique, edges reference known vertices, there are
/// no self-loops or duplicate edges. Hooks only translate.
pub trait Loader {
    type Graph;

    /// Build the empty graph. `props` is the raw settings payload.
    fn process_settings(
        &mut self,
        directed: bool,
        props: Option<Props>,
    ) -> std::result::Result<Self::Graph, GraphError>;

    fn process_vertex(
        &mut self,
        graph: &mut Self::Graph,
        id: VertexId,
        props: Option<Props>,
    ) -> std::result::Result<(), GraphError>;

    fn process_edge(
        &mut self,
        graph: &mut Self::Graph,
        source: VertexId,
        target: VertexId,
        props: Option<Props>,
    ) -> std::result::Result<(), GraphError>;
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Load a gzip-compressed file.
pub fn load<L: Loader>(loader: L, path: impl AsRef<Path>) -> Result<L::Graph> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading graph");
    let file = File::open(path)?;
    load_from_reader(loader, BufReader::new(MultiGzDecoder::new(file)))
}

/// Load from an already decompressed line source.
pub fn load_from_reader<L: Loader, R: BufRead>(loader: L, reader: R) -> Result<L::Graph> {
    let mut state = LoadState::new(loader);
    for (index, line) in reader.lines().enumerate() {
        state.line = index + 1;
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(state.error(LoadErrorKind::InvalidUtf8).into());
            }
            Err(e) => return Err(e.into()),
        };
        if line.trim().is_empty() {
            continue;
        }
        let known = &state.vertex_ids;
        let record = Record::decode_with(&line, |end, id| check_endpoint(known, end, id))
            .map_err(|kind| state.error(kind))?;
        state.accept(record)?;
    }
    state.finish()
}

// =============================================================================
// LOAD STATE
// =============================================================================

/// A record waiting for materialization, with its source line.
struct Pending<T> {
    line: usize,
    item: T,
    props: Option<Props>,
}

struct LoadState<L: Loader> {
    loader: L,
    graph: Option<L::Graph>,
    directed: bool,
    line: usize,
    settings_line: usize,
    vertex_ids: BTreeSet<VertexId>,
    edge_keys: BTreeSet<(VertexId, VertexId)>,
    vertices: Vec<Pending<VertexId>>,
    edges: Vec<Pending<(VertexId, VertexId)>>,
}

impl<L: Loader> LoadState<L> {
    fn new(loader: L) -> Self {
        Self {
            loader,
            graph: None,
            directed: false,
            line: 0,
            settings_line: 0,
            vertex_ids: BTreeSet::new(),
            edge_keys: BTreeSet::new(),
            vertices: Vec::new(),
            edges: Vec::new(),
        }
    }

    fn error(&self, kind: impl Into<LoadErrorKind>) -> LoadError {
        LoadError::new(self.line, kind.into())
    }

    fn accept(&mut self, record: Record) -> std::result::Result<(), LoadError> {
        trace!(line = self.line, kind = record.kind(), "record");
        match record {
            Record::Settings { props } => self.settings(props),
            Record::Vertex { id, props } => self.vertex(id, props),
            Record::Edge {
                source,
                target,
                props,
            } => self.edge(source, target, props),
            Record::Frame { .. } => Err(self.error(LoadErrorKind::UnknownType("frame".into()))),
        }
    }

    fn settings(&mut self, props: Option<Props>) -> std::result::Result<(), LoadError> {
        if self.graph.is_some() {
            return Err(self.error(LoadErrorKind::DuplicateSettings));
        }
        self.directed = props.as_ref().is_some_and(declared_directed);
        let graph = self
            .loader
            .process_settings(self.directed, props)
            .map_err(|e| self.error(e))?;
        self.graph = Some(graph);
        self.settings_line = self.line;
        Ok(())
    }

    fn vertex(&mut self, id: VertexId, props: Option<Props>) -> std::result::Result<(), LoadError> {
        if self.vertex_ids.contains(&id) {
            return Err(self.error(LoadErrorKind::DuplicateVertex(id)));
        }
        self.vertex_ids.insert(id.clone());
        self.vertices.push(Pending {
            line: self.line,
            item: id,
            props,
        });
        Ok(())
    }

    fn edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        props: Option<Props>,
    ) -> std::result::Result<(), LoadError> {
        if !self.vertex_ids.contains(&source) {
            return Err(self.error(LoadErrorKind::MissingSource(source)));
        }
        if !self.vertex_ids.contains(&target) {
            return Err(self.error(LoadErrorKind::MissingTarget(target)));
        }
        if source == target {
            return Err(self.error(LoadErrorKind::SelfLoop(source)));
        }
        let key = (source, target);
        if self.edge_keys.contains(&key) {
            let (from, to) = key;
            return Err(self.error(LoadErrorKind::DuplicateEdge { from, to }));
        }
        if self.graph.is_none() {
            return Err(self.error(LoadErrorKind::MissingSettings));
        }
        if !self.directed && self.edge_keys.contains(&(key.1.clone(), key.0.clone())) {
            let (from, to) = key;
            return Err(self.error(LoadErrorKind::DuplicateEdge { from, to }));
        }
        self.edge_keys.insert(key.clone());
        self.edges.push(Pending {
            line: self.line,
            item: key,
            props,
        });
        Ok(())
    }

    fn finish(mut self) -> Result<L::Graph> {
        let mut graph = match self.graph.take() {
            Some(graph) => graph,
            None => self
                .loader
                .process_settings(false, None)
                .map_err(|e| LoadError::new(self.line, e.into()))?,
        };

        for pending in self.vertices {
            self.loader
                .process_vertex(&mut graph, pending.item, pending.props)
                .map_err(|e| LoadError::new(pending.line, e.into()))?;
        }
        let edge_count = self.edges.len();
        for pending in self.edges {
            let (source, target) = pending.item;
            self.loader
                .process_edge(&mut graph, source, target, pending.props)
                .map_err(|e| LoadError::new(pending.line, e.into()))?;
        }

        debug!(
            vertices = self.vertex_ids.len(),
            edges = edge_count,
            directed = self.directed,
            settings_line = self.settings_line,
            "loaded graph"
        );
        Ok(graph)
    }
}

/// Endpoints must name a vertex declared on an earlier line.
fn check_endpoint(
    known: &BTreeSet<VertexId>,
    end: Endpoint,
    id: &VertexId,
) -> std::result::Result<(), LoadErrorKind> {
    if known.contains(id) {
        return Ok(());
    }
    Err(match end {
        Endpoint::Source => LoadErrorKind::MissingSource(id.clone()),
        Endpoint::Target => LoadErrorKind::MissingTarget(id.clone()),
    })
}

/// Directedness declared by a settings payload.
///
/// `graph.directed` wins; a top-level `directed` flag is accepted when the
/// graph namespace does not carry one. Anything that is not a boolean
/// counts as undirected.
fn declared_directed(props: &Props) -> bool {
    let nested = props.get("graph").and_then(|graph| graph.get("directed"));
    match nested {
        Some(value) => value.as_bool().unwrap_or(false),
        None => props
            .get("directed")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

// =============================================================================
// TESTS
// =============================================================================
