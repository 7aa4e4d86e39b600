//! # VOXMORPH CORE
//!
//! Turns a cell-based source world into a dense voxel grid.
//!
//! ## Architecture
//!
//! - **Templates**: every source feature maps to a cube of `S³` output
//!   cells, looked up by symbolic name through a specificity cascade
//!   ([`cascade`], [`key`])
//! - **Directions**: ramps, walls and buildings pick oriented templates
//!   from their neighbours ([`direction`])
//! - **Grid**: resolved templates are stamped into one dense grid
//!   ([`grid`], [`stamp`]) which is then lit ([`light`])
//! - **Source**: the world is read through the [`source::WorldSource`]
//!   trait; [`source::WorldSnapshot`] is the TOML-backed implementation
//!
//! Missing or malformed templates never fail a run. They become air, count
//! towards [`stats::ConversionStats`] and are written to the
//! [`unknown::UnknownFeatureLog`] for the operator to fill in.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cascade;
pub mod config;
pub mod context;
pub mod direction;
pub mod error;
pub mod grid;
pub mod index;
pub mod key;
pub mod light;
pub mod opacity;
pub mod source;
pub mod stamp;
pub mod stats;
pub mod store;
pub mod template;
pub mod unknown;

pub use cascade::{merge_shape, Lookup, Resolver};
pub use config::{ClipWindow, Config, Settings, VerticalMode, VerticalSettings};
pub use context::ConversionContext;
pub use error::{CoreError, CoreResult};
pub use grid::{GridTransform, VoxelGrid};
pub use index::PackedIndex;
pub use key::{candidate_keys, normalize_key, MaterialQuery};
pub use light::compute_lighting;
pub use opacity::OpacityTable;
pub use source::{SourceTile, WorldSnapshot, WorldSource};
pub use stamp::{GravityRules, Stamper};
pub use stats::{ConversionStats, StatArea, StatKind};
pub use store::{TemplateLibrary, TemplateStore};
pub use template::{MaterialPalette, VoxelTemplate};
pub use unknown::UnknownFeatureLog;
