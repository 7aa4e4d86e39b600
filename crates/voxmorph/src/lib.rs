//! # VOXMORPH
//!
//! Conversion driver: reads a source world snapshot, stamps every exported
//! level into a voxel grid and writes the result as a chunked world.
//!
//! ## Stages
//!
//! - **Levels**: which source levels survive ([`levels`])
//! - **Features**: tile to template conversion and stamping ([`features`])
//! - **Spawn**: where the player starts ([`spawn`])
//! - **Pipeline**: the run itself and its error codes ([`pipeline`], [`error`])
//!
//! ```no_run
//! use std::path::Path;
//!
//! let report = voxmorph::run(Path::new("voxmorph.toml"), Path::new("world.toml"))?;
//! println!("{} columns in {}", report.columns, report.world_dir.display());
//! # Ok::<(), voxmorph::RunError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod features;
pub mod levels;
pub mod pipeline;
pub mod spawn;

pub use error::{RunError, RunResult};
pub use features::{TileConverter, TileSite};
pub use levels::{select_levels, LevelProbe, LevelSelection};
pub use pipeline::{convert, export, render, run, ClipArea, ConversionReport, RenderedWorld};
pub use spawn::{place_spawn, Spawn};
