//! # Export Errors
//!
//! Every failure while writing a world is fatal to the run. Each variant
//! maps to the exit status the operator sees.

use std::path::PathBuf;

use thiserror::Error;
use voxmorph_nbt::NbtError;

/// Errors raised while writing chunk and level files.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The world root directory could not be created.
    #[error("could not create world directory {path}: {source}")]
    WorldDir {
        /// Directory being created.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Every candidate world directory name is already taken.
    #[error("no free world directory name for prefix {prefix:?}")]
    NoFreeName {
        /// Name prefix tried with suffixes 1 to 9999.
        prefix: String,
    },

    /// An outer column directory could not be created.
    #[error("could not create column directory {path}: {source}")]
    OuterDir {
        /// Directory being created.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// An inner column directory could not be created.
    #[error("could not create column directory {path}: {source}")]
    InnerDir {
        /// Directory being created.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// An output file could not be written.
    #[error("could not write {path}: {source}")]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// GZIP compression failed.
    #[error("could not compress {path}: {source}")]
    Compress {
        /// File being compressed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A document could not be encoded.
    #[error("could not encode document: {0}")]
    Encode(#[from] NbtError),
}

impl ExportError {
    /// Exit status for this error.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::WorldDir { .. } => -1,
            Self::NoFreeName { .. } => 10_000,
            Self::OuterDir { .. } => -100,
            Self::InnerDir { .. } => -101,
            Self::Write { .. } | Self::Encode(_) => -51,
            Self::Compress { .. } => -52,
        }
    }
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
