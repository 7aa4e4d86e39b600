//! # Run Errors
//!
//! Everything that stops a conversion run, with the exit status reported to
//! the operator. Parameter checks fail before any allocation.

use thiserror::Error;
use voxmorph_core::CoreError;
use voxmorph_export::ExportError;

/// Fatal conversion errors.
#[derive(Error, Debug)]
pub enum RunError {
    /// Configuration or world snapshot could not be loaded.
    #[error("could not load {what}: {source}")]
    Load {
        /// Which input failed.
        what: &'static str,
        /// Underlying error.
        source: CoreError,
    },

    /// The clip window starts past the end of the world.
    #[error("invalid area: clip starts at block ({x_min}, {y_min}) but the world ends at ({x_max}, {y_max})")]
    InvalidArea {
        /// First block along x.
        x_min: u32,
        /// First block along y.
        y_min: u32,
        /// Clipped end along x.
        x_max: u32,
        /// Clipped end along y.
        y_max: u32,
    },

    /// The clipped output volume is empty.
    #[error("area too small: output would be {x} x {y} x {levels} levels")]
    AreaTooSmall {
        /// Output cells along x.
        x: usize,
        /// Output cells along y.
        y: usize,
        /// Exported levels.
        levels: usize,
    },

    /// Grid allocation or unknown-log persistence failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Writing the world failed.
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl RunError {
    /// Exit status for this error.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::Load { .. } => 2,
            Self::InvalidArea { .. } => 21,
            Self::AreaTooSmall { .. } => 20,
            Self::Core(e) => e.code(),
            Self::Export(e) => e.code(),
        }
    }
}

/// Result type for conversion runs.
pub type RunResult<T> = Result<T, RunError>;
