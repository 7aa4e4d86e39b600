//! # Tag Encoding Errors

use thiserror::Error;

use crate::tag::TagType;

/// Errors that can occur while building or encoding a tag tree.
#[derive(Error, Debug)]
pub enum NbtError {
    /// A string payload or tag name does not fit the 16-bit length prefix.
    #[error("string of {0} bytes exceeds the 65535 byte limit")]
    StringTooLong(usize),

    /// A byte array or list does not fit the 32-bit length prefix.
    #[error("sequence of {0} elements exceeds the i32 length limit")]
    SequenceTooLong(usize),

    /// An element pushed into a list has a different type than the list.
    #[error("list holds {expected:?} tags, got {found:?}")]
    ListTypeMismatch {
        /// Element type declared by the list.
        expected: TagType,
        /// Type of the rejected element.
        found: TagType,
    },

    /// The underlying writer failed.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tag operations.
pub type NbtResult<T> = Result<T, NbtError>;
