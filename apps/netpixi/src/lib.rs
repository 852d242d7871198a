//! # Netpixi Library
//!
//! This library exposes the netpixi commands for testing and integration.
//!
//! The binary uses these modules through the `main.rs` entry point.

pub mod cli;

// Re-export netpixi_core for convenience
pub use netpixi_core;
