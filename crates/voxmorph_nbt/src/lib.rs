//! # VOXMORPH NBT
//!
//! Named binary tag encoder used for chunk and level files.
//!
//! ## Design
//!
//! - **Closed sum type**: [`Tag`] covers the ten payload kinds
//! - **Exact sizing**: `encoded_size()` is computed without encoding and
//!   always equals the number of bytes `write_into()` emits
//! - **Big endian**: all multi-byte numbers
//!
//! ## Example
//!
//! ```
//! use voxmorph_nbt::{Compound, encode_document};
//!
//! let doc = Compound::new()
//!     .string("name", "Bananrama")
//!     .into_named("hello world");
//! let bytes = encode_document(&doc).unwrap();
//! assert_eq!(bytes.len(), doc.encoded_size());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod compound;
pub mod error;
pub mod tag;

pub use compound::Compound;
pub use error::{NbtError, NbtResult};
pub use tag::{NamedTag, Tag, TagList, TagType};

/// Encodes a root named tag into a buffer sized exactly by `encoded_size()`.
///
/// # Errors
///
/// Returns an error if a string or sequence overflows its length prefix.
pub fn encode_document(root: &NamedTag) -> NbtResult<Vec<u8>> {
    root.to_bytes()
}
