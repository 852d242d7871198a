//! # Netpixi Core
//!
//! The graph interchange protocol behind netpixi: in-memory graphs go out
//! as gzip-compressed JSON lines that the browser renderer reads, and come
//! back in from the same files.
//!
//! ## Layout
//!
//! - [`value`]: property values and the serializability check
//! - [`record`]: one wire record per line
//! - [`protocol`]: the generic [`Loader`] / [`Saver`] drivers
//! - [`graph`]: the dense and keyed graph models
//! - [`adapters`]: loader and saver per model
//! - [`stream`]: incremental writers and side-channel sinks
//! - [`metrics`]: degree, structural-hole and component helpers
//!
//! ## Example
//!
//! ```no_run
//! use netpixi_core::{KeyedGraph, SaveOptions, load_keyed, save_keyed};
//!
//! let mut graph = KeyedGraph::new();
//! graph.add_edge("a", "b");
//! save_keyed(&graph, "pair.net.gz", &SaveOptions::default())?;
//!
//! let loaded = load_keyed("pair.net.gz")?;
//! assert_eq!(loaded, graph);
//! # Ok::<(), netpixi_core::NetpixiError>(())
//! ```

pub mod adapters;
pub mod error;
pub mod graph;
pub mod id;
pub mod metrics;
pub mod options;
pub mod protocol;
pub mod record;
pub mod stream;
pub mod value;

pub use adapters::{
    DenseLoader, DenseSaver, KeyedLoader, KeyedSaver, load_dense, load_keyed, save_dense,
    save_keyed,
};
pub use error::{
    FieldError, GraphError, LoadError, LoadErrorKind, NetpixiError, Result, ValidationError,
};
pub use graph::{
    DenseGraph, GraphShape, KeyedGraph, NodeKey, PropertyColumn, PropertyKind, ScalarType,
};
pub use id::{EdgeKey, VertexId};
pub use options::SaveOptions;
pub use protocol::{Loader, Saver, load, load_from_reader, save, save_to_writer};
pub use record::{Endpoint, Record};
pub use stream::{AnimationWriter, ChunkSink, GraphWriter, GzipSink, Sink};
pub use value::{Props, Value, is_serializable};
