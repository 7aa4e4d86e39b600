//! # VOXMORPH EXPORT
//!
//! Writes a lit voxel grid to disk as a chunked world.
//!
//! ## Layout
//!
//! - **Columns**: the grid is cut into 16 x 16 x 128 columns, each a
//!   GZIP-compressed tag document ([`column`])
//! - **Paths**: column files sit in base-36 directories ([`naming`])
//! - **Level**: `level.dat` carries spawn, seed and total size ([`level`])
//!
//! [`writer::WorldWriter`] drives all three and maps every I/O failure to
//! its own [`error::ExportError`] variant.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod column;
pub mod error;
pub mod level;
pub mod naming;
pub mod writer;

pub use column::{chunk_document, ColumnData, ColumnEncoder, CHUNK_HEIGHT, CHUNK_SIDE};
pub use error::{ExportError, ExportResult};
pub use level::{level_document, snow_flag, LevelInfo, SpawnPoint, GENERATED_BY};
pub use naming::{column_path, to_base36, ColumnPath};
pub use writer::WorldWriter;
