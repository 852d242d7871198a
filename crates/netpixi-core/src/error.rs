//! # Errors
//!
//! Every detected violation aborts the load or save call that found it.
//!
//! - [`LoadError`]: malformed input or broken invariants in a file being
//!   read, tagged with the 1-based line number of the offending record.
//! - [`ValidationError`]: a graph that cannot be written as-is.
//! - [`GraphError`]: misuse of a graph model, also raised by adapter hooks.
//! - [`FieldError`]: a streaming writer was handed a badly typed field.

use crate::id::VertexId;
use crate::value::ValueError;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, NetpixiError>;

// =============================================================================
// TOP-LEVEL ERROR
// =============================================================================

#[derive(Debug, Error)]
pub enum NetpixiError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// LOAD ERRORS
// =============================================================================

/// A load failure at a specific line.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Line {line}: {kind}")]
pub struct LoadError {
    pub line: usize,
    pub kind: LoadErrorKind,
}

impl LoadError {
    #[must_use]
    pub fn new(line: usize, kind: LoadErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadErrorKind {
    #[error("{0}")]
    Json(String),

    #[error("must be valid UTF-8")]
    InvalidUtf8,

    #[error("must be a dictionary")]
    NotAnObject,

    #[error("props must be None or a dictionary")]
    InvalidProps,

    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("{0} must be an integer or a string")]
    InvalidId(&'static str),

    #[error("{0} must be a non-negative integer")]
    InvalidCount(&'static str),

    #[error("duplicate settings")]
    DuplicateSettings,

    #[error("duplicate vertex with id {0}")]
    DuplicateVertex(VertexId),

    #[error("missing source with id {0}")]
    MissingSource(VertexId),

    #[error("missing target with id {0}")]
    MissingTarget(VertexId),

    #[error("source and target with same id {0}")]
    SelfLoop(VertexId),

    #[error("duplicate edge with source {from} and target {to}")]
    DuplicateEdge { from: VertexId, to: VertexId },

    #[error("missing settings")]
    MissingSettings,

    #[error("unknown type {0}")]
    UnknownType(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

// =============================================================================
// SAVE VALIDATION ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Property directed of graph must be a boolean")]
    DirectedNotBool,

    #[error("Property directed of graph must be {expected}")]
    DirectedMismatch { expected: bool },

    #[error("Property {key} of graph must be serializable")]
    GraphProperty { key: String },

    #[error("Vertex ids must be integers or strings, found {found}")]
    InvalidVertexId { found: String },

    #[error("Vertex ids must be unique, {0} appears more than once")]
    DuplicateVertexId(VertexId),

    #[error("Property {key} of vertex with id {id} must be serializable")]
    VertexProperty { key: String, id: VertexId },

    #[error("Self-loop on vertex with id {0} not allowed")]
    SelfLoop(VertexId),

    #[error("Parallel edge with source {from} and target {to} not allowed")]
    ParallelEdge { from: VertexId, to: VertexId },

    #[error("Property {key} of edge with source {from} and target {to} must be serializable")]
    EdgeProperty {
        key: String,
        from: VertexId,
        to: VertexId,
    },
}

// =============================================================================
// GRAPH MODEL ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("vertex properties cannot have {0}")]
    ReservedKey(String),

    #[error("vertex with id {0} already exists")]
    VertexExists(VertexId),

    #[error("vertex with id {0} does not exist")]
    UnknownVertex(VertexId),

    #[error("vertex index {0} out of range")]
    IndexOutOfRange(usize),

    #[error("edge index {0} out of range")]
    EdgeOutOfRange(usize),

    #[error("property {0} does not exist")]
    UnknownProperty(String),

    #[error("property {key} holds {expected}, got {found}")]
    TypeMismatch {
        key: String,
        expected: String,
        found: &'static str,
    },

    #[error("layout has {found} positions for {expected} vertices")]
    LayoutSize { expected: usize, found: usize },
}

// =============================================================================
// STREAMING WRITER ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{0} must be an integer or a float")]
    NotNumber(String),

    #[error("{0} must be a string")]
    NotString(String),

    #[error("{0} must be serializable")]
    NotSerializable(String),
}
