//! # Protocol Module
//!
//! Generic drivers for the line protocol.
//!
//! A graph model plugs in by implementing [`Loader`] (three hooks called
//! while reading) and [`Saver`] (four hooks called while writing). The
//! drivers own everything that does not depend on the model: line
//! numbering, record validation, referential integrity, compression and
//! record encoding.
//!
//! Namespace flattening for the settings record lives in [`namespace`].

mod loader;
pub mod namespace;
mod saver;

pub use loader::{Loader, load, load_from_reader};
pub use saver::{Saver, save, save_to_writer, write_records};
