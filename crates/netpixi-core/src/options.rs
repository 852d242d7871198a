//! Output configuration shared by the savers and the streaming writers.

use flate2::Compression;

/// Default gzip level, same as `gzip(1)`.
pub const DEFAULT_COMPRESSION: u32 = 6;

/// Maximum gzip level.
pub const MAX_COMPRESSION: u32 = 9;

/// How compressed output is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    compression: u32,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            compression: DEFAULT_COMPRESSION,
        }
    }
}

impl SaveOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gzip level. Levels above 9 are clamped.
    #[must_use]
    pub fn with_compression(mut self, level: u32) -> Self {
        self.compression = level.min(MAX_COMPRESSION);
        self
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.compression
    }

    #[must_use]
    pub fn compression(&self) -> Compression {
        Compression::new(self.compression)
    }
}
