//! # Compound Builder
//!
//! Fluent construction of compound tags. Adding a name that already exists
//! replaces the earlier child in place, so insertion order is stable and
//! names stay unique.

use crate::error::NbtResult;
use crate::tag::{NamedTag, Tag, TagList, TagType};

/// Accumulates named children for a compound tag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Compound {
    children: Vec<NamedTag>,
}

impl Compound {
    /// Creates an empty compound.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            children: Vec::new(),
        }
    }

    /// Inserts or replaces a child.
    pub fn insert(&mut self, name: impl Into<String>, tag: Tag) -> &mut Self {
        let name = name.into();
        if let Some(existing) = self.children.iter_mut().find(|c| c.name == name) {
            existing.tag = tag;
        } else {
            self.children.push(NamedTag { name, tag });
        }
        self
    }

    /// Builder form of [`Compound::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, tag: Tag) -> Self {
        self.insert(name, tag);
        self
    }

    /// Adds a byte child.
    #[must_use]
    pub fn byte(self, name: &str, value: i8) -> Self {
        self.with(name, Tag::Byte(value))
    }

    /// Adds a short child.
    #[must_use]
    pub fn short(self, name: &str, value: i16) -> Self {
        self.with(name, Tag::Short(value))
    }

    /// Adds an int child.
    #[must_use]
    pub fn int(self, name: &str, value: i32) -> Self {
        self.with(name, Tag::Int(value))
    }

    /// Adds a long child.
    #[must_use]
    pub fn long(self, name: &str, value: i64) -> Self {
        self.with(name, Tag::Long(value))
    }

    /// Adds a float child.
    #[must_use]
    pub fn float(self, name: &str, value: f32) -> Self {
        self.with(name, Tag::Float(value))
    }

    /// Adds a string child.
    #[must_use]
    pub fn string(self, name: &str, value: impl Into<String>) -> Self {
        self.with(name, Tag::String(value.into()))
    }

    /// Adds a byte array child.
    #[must_use]
    pub fn byte_array(self, name: &str, value: Vec<u8>) -> Self {
        self.with(name, Tag::ByteArray(value))
    }

    /// Adds a nested compound child.
    #[must_use]
    pub fn compound(self, name: &str, value: Compound) -> Self {
        self.with(name, value.into_tag())
    }

    /// Adds a list child whose items are all of `element_type`.
    ///
    /// # Errors
    ///
    /// Returns `ListTypeMismatch` if any item differs from `element_type`.
    pub fn list(self, name: &str, element_type: TagType, items: Vec<Tag>) -> NbtResult<Self> {
        let list = TagList::from_items(element_type, items)?;
        Ok(self.with(name, Tag::List(list)))
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True when no children were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Converts into a compound tag.
    #[must_use]
    pub fn into_tag(self) -> Tag {
        Tag::Compound(self.children)
    }

    /// Converts into a named root tag.
    #[must_use]
    pub fn into_named(self, name: impl Into<String>) -> NamedTag {
        NamedTag::new(name, self.into_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let tag = Compound::new()
            .int("a", 1)
            .int("b", 2)
            .int("a", 3)
            .into_tag();
        match tag {
            Tag::Compound(children) => {
                assert_eq!(children.len(), 2);
                assert_eq!(children[0].name, "a");
                assert_eq!(children[0].tag, Tag::Int(3));
                assert_eq!(children[1].name, "b");
            }
            other => panic!("expected compound, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_compound_is_single_end_byte() {
        let tag = Compound::new().into_tag();
        assert_eq!(tag.encoded_size(), 1);
        let mut buf = Vec::new();
        tag.write_into(&mut buf).unwrap();
        assert_eq!(buf, vec![0]);
    }

    #[test]
    fn test_list_type_checked() {
        let ok = Compound::new().list("l", TagType::Float, vec![Tag::Float(0.0), Tag::Float(1.0)]);
        assert!(ok.is_ok());
        let bad = Compound::new().list("l", TagType::Float, vec![Tag::Double(0.0)]);
        assert!(bad.is_err());
    }
}
