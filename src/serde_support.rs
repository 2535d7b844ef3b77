//! serde support.
//!
//! Tags serialize as their dotted name, containers as a sequence of names.
//! Deserializing needs a [`TagResolver`], so it goes through
//! [`DeserializeSeed`]:
//!
//! ```ignore
//! use serde::de::DeserializeSeed;
//!
//! let mut de = serde_json::Deserializer::from_str(r#"["A.B","C"]"#);
//! let container = TagContainerSeed::new(&registry).deserialize(&mut de)?;
//! ```

use std::fmt;

use serde::de::{DeserializeSeed, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::container::TagContainer;
use crate::resolver::TagResolver;
use crate::tag::Tag;

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name().unwrap_or_default())
    }
}

impl Serialize for TagContainer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Deserializes one [`Tag`] by importing its name through a resolver.
pub struct TagSeed<'r, R: ?Sized> {
    resolver: &'r R,
}

impl<'r, R: TagResolver + ?Sized> TagSeed<'r, R> {
    pub fn new(resolver: &'r R) -> Self {
        Self { resolver }
    }
}

impl<'de, R: TagResolver + ?Sized> DeserializeSeed<'de> for TagSeed<'_, R> {
    type Value = Tag;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Tag, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(self.resolver.import(&name))
    }
}

/// Deserializes a [`TagContainer`] from a sequence of names.
///
/// Names the resolver rejects are dropped.
pub struct TagContainerSeed<'r, R: ?Sized> {
    resolver: &'r R,
}

impl<'r, R: TagResolver + ?Sized> TagContainerSeed<'r, R> {
    pub fn new(resolver: &'r R) -> Self {
        Self { resolver }
    }
}

impl<'de, R: TagResolver + ?Sized> DeserializeSeed<'de> for TagContainerSeed<'_, R> {
    type Value = TagContainer;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<TagContainer, D::Error> {
        deserializer.deserialize_seq(ContainerVisitor {
            resolver: self.resolver,
        })
    }
}

struct ContainerVisitor<'r, R: ?Sized> {
    resolver: &'r R,
}

impl<'de, R: TagResolver + ?Sized> Visitor<'de> for ContainerVisitor<'_, R> {
    type Value = TagContainer;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence of tag names")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<TagContainer, A::Error> {
        let mut tags = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(tag) = seq.next_element_seed(TagSeed::new(self.resolver))? {
            tags.push(tag);
        }
        Ok(TagContainer::create_from_array(&tags))
    }
}
