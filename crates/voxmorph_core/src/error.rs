//! # Core Error Types
//!
//! Errors raised while loading configuration, reading world snapshots,
//! persisting the unknown-feature log and allocating the output grid.
//!
//! Missing or malformed templates are not errors: they resolve to air and
//! are reported through the unknown-feature log instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the core conversion engine.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The output grid could not be allocated.
    #[error("could not allocate {bytes} bytes for the voxel grid")]
    OutOfMemory {
        /// Bytes requested per channel.
        bytes: usize,
    },

    /// A configuration value is outside its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A TOML document failed to parse.
    #[error("could not parse {path}: {source}")]
    Parse {
        /// File being parsed, or `<inline>` for string input.
        path: PathBuf,
        /// Parser error.
        source: toml::de::Error,
    },

    /// The unknown-feature log could not be serialized.
    #[error("could not serialize unknown-feature log: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A file could not be read or written.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

impl CoreError {
    /// Process exit status associated with this error.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::OutOfMemory { .. } => 10,
            Self::InvalidConfig(_) | Self::Parse { .. } => 2,
            Self::Serialize(_) | Self::Io { .. } => -51,
        }
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
