//! # Tag Tree
//!
//! The output format's type system as a closed sum type.
//!
//! ## Wire Format
//!
//! ```text
//! Named tag:  [1 byte: type id][2 bytes: name length][N bytes: UTF-8 name][payload]
//!
//! Byte        1 byte
//! Short       2 bytes, big endian
//! Int         4 bytes, big endian
//! Long        8 bytes, big endian
//! Float       4 bytes, IEEE 754 binary32, big endian
//! Double      8 bytes, IEEE 754 binary64, big endian
//! ByteArray   [4 bytes: length][length bytes]
//! String      [2 bytes: length][length bytes UTF-8]
//! List        [1 byte: element type][4 bytes: length][length unnamed payloads]
//! Compound    [named tags...][1 byte: 0 (End)]
//! ```
//!
//! Every node reports its exact `encoded_size()` without encoding, and
//! `write_into()` produces exactly that many bytes.

use std::io::Write;

use crate::error::{NbtError, NbtResult};

/// Tag type identifiers as they appear on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagType {
    /// Terminates a compound.
    End = 0,
    /// Signed 8-bit integer.
    Byte = 1,
    /// Signed 16-bit integer.
    Short = 2,
    /// Signed 32-bit integer.
    Int = 3,
    /// Signed 64-bit integer.
    Long = 4,
    /// 32-bit float.
    Float = 5,
    /// 64-bit float.
    Double = 6,
    /// Length-prefixed raw bytes.
    ByteArray = 7,
    /// Length-prefixed UTF-8 string.
    String = 8,
    /// Homogeneous list of unnamed payloads.
    List = 9,
    /// Sequence of named tags closed by `End`.
    Compound = 10,
}

impl TagType {
    /// Converts from the wire id.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::End),
            1 => Some(Self::Byte),
            2 => Some(Self::Short),
            3 => Some(Self::Int),
            4 => Some(Self::Long),
            5 => Some(Self::Float),
            6 => Some(Self::Double),
            7 => Some(Self::ByteArray),
            8 => Some(Self::String),
            9 => Some(Self::List),
            10 => Some(Self::Compound),
            _ => None,
        }
    }

    /// Returns the wire id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }
}

/// A tag payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Tag {
    /// Signed byte.
    Byte(i8),
    /// Signed short.
    Short(i16),
    /// Signed int.
    Int(i32),
    /// Signed long.
    Long(i64),
    /// Single precision float.
    Float(f32),
    /// Double precision float.
    Double(f64),
    /// Raw bytes.
    ByteArray(Vec<u8>),
    /// UTF-8 string.
    String(String),
    /// Homogeneous list.
    List(TagList),
    /// Named children, order preserved.
    Compound(Vec<NamedTag>),
}

impl Tag {
    /// Returns the wire type of this payload.
    #[must_use]
    pub const fn tag_type(&self) -> TagType {
        match self {
            Self::Byte(_) => TagType::Byte,
            Self::Short(_) => TagType::Short,
            Self::Int(_) => TagType::Int,
            Self::Long(_) => TagType::Long,
            Self::Float(_) => TagType::Float,
            Self::Double(_) => TagType::Double,
            Self::ByteArray(_) => TagType::ByteArray,
            Self::String(_) => TagType::String,
            Self::List(_) => TagType::List,
            Self::Compound(_) => TagType::Compound,
        }
    }

    /// Number of bytes the payload occupies (no type id, no name).
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        match self {
            Self::Byte(_) => 1,
            Self::Short(_) => 2,
            Self::Int(_) | Self::Float(_) => 4,
            Self::Long(_) | Self::Double(_) => 8,
            Self::ByteArray(bytes) => 4 + bytes.len(),
            Self::String(s) => 2 + s.len(),
            Self::List(list) => list.encoded_size(),
            Self::Compound(children) => {
                children.iter().map(NamedTag::encoded_size).sum::<usize>() + 1
            }
        }
    }

    /// Writes the payload (no type id, no name).
    ///
    /// # Errors
    ///
    /// Returns an error if a length prefix overflows or the writer fails.
    pub fn write_into<W: Write>(&self, out: &mut W) -> NbtResult<()> {
        match self {
            Self::Byte(v) => out.write_all(&v.to_be_bytes())?,
            Self::Short(v) => out.write_all(&v.to_be_bytes())?,
            Self::Int(v) => out.write_all(&v.to_be_bytes())?,
            Self::Long(v) => out.write_all(&v.to_be_bytes())?,
            Self::Float(v) => out.write_all(&v.to_be_bytes())?,
            Self::Double(v) => out.write_all(&v.to_be_bytes())?,
            Self::ByteArray(bytes) => {
                write_len_i32(out, bytes.len())?;
                out.write_all(bytes)?;
            }
            Self::String(s) => write_str(out, s)?,
            Self::List(list) => list.write_into(out)?,
            Self::Compound(children) => {
                for child in children {
                    child.write_into(out)?;
                }
                out.write_all(&[TagType::End.id()])?;
            }
        }
        Ok(())
    }

    /// Returns the named child of a compound, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tag> {
        match self {
            Self::Compound(children) => children.iter().find(|c| c.name == name).map(|c| &c.tag),
            _ => None,
        }
    }
}

/// A homogeneous list of unnamed payloads.
#[derive(Clone, Debug, PartialEq)]
pub struct TagList {
    element_type: TagType,
    items: Vec<Tag>,
}

impl TagList {
    /// Creates an empty list of the given element type.
    #[must_use]
    pub const fn new(element_type: TagType) -> Self {
        Self {
            element_type,
            items: Vec::new(),
        }
    }

    /// Builds a list from items, checking every item against `element_type`.
    ///
    /// # Errors
    ///
    /// Returns `ListTypeMismatch` on the first item of a different type.
    pub fn from_items(element_type: TagType, items: Vec<Tag>) -> NbtResult<Self> {
        let mut list = Self::new(element_type);
        list.items.reserve(items.len());
        for item in items {
            list.push(item)?;
        }
        Ok(list)
    }

    /// Appends an item.
    ///
    /// # Errors
    ///
    /// Returns `ListTypeMismatch` if the item's type differs from the list's.
    pub fn push(&mut self, item: Tag) -> NbtResult<()> {
        let found = item.tag_type();
        if found != self.element_type {
            return Err(NbtError::ListTypeMismatch {
                expected: self.element_type,
                found,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Element type.
    #[must_use]
    pub const fn element_type(&self) -> TagType {
        self.element_type
    }

    /// Items in order.
    #[must_use]
    pub fn items(&self) -> &[Tag] {
        &self.items
    }

    /// Payload size: type id, length, then each item's payload.
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        1 + 4 + self.items.iter().map(Tag::encoded_size).sum::<usize>()
    }

    /// Writes the list payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the length overflows or the writer fails.
    pub fn write_into<W: Write>(&self, out: &mut W) -> NbtResult<()> {
        out.write_all(&[self.element_type.id()])?;
        write_len_i32(out, self.items.len())?;
        for item in &self.items {
            item.write_into(out)?;
        }
        Ok(())
    }
}

/// A tag with a name, as stored inside compounds and at the document root.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedTag {
    /// Name, unique within its compound.
    pub name: String,
    /// Payload.
    pub tag: Tag,
}

impl NamedTag {
    /// Creates a named tag.
    #[must_use]
    pub fn new(name: impl Into<String>, tag: Tag) -> Self {
        Self {
            name: name.into(),
            tag,
        }
    }

    /// Type id, name and payload.
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        1 + 2 + self.name.len() + self.tag.encoded_size()
    }

    /// Writes type id, name and payload.
    ///
    /// # Errors
    ///
    /// Returns an error if a length prefix overflows or the writer fails.
    pub fn write_into<W: Write>(&self, out: &mut W) -> NbtResult<()> {
        out.write_all(&[self.tag.tag_type().id()])?;
        write_str(out, &self.name)?;
        self.tag.write_into(out)
    }

    /// Encodes this tag as a complete document into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if a length prefix overflows.
    pub fn to_bytes(&self) -> NbtResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_size());
        self.write_into(&mut buf)?;
        Ok(buf)
    }
}

fn write_str<W: Write>(out: &mut W, s: &str) -> NbtResult<()> {
    let len = u16::try_from(s.len()).map_err(|_| NbtError::StringTooLong(s.len()))?;
    out.write_all(&len.to_be_bytes())?;
    out.write_all(s.as_bytes())?;
    Ok(())
}

fn write_len_i32<W: Write>(out: &mut W, len: usize) -> NbtResult<()> {
    let len = i32::try_from(len).map_err(|_| NbtError::SequenceTooLong(len))?;
    out.write_all(&len.to_be_bytes())?;
    Ok(())
}
