//! [`TagContainer`]: explicit tags plus their derived ancestor closure.
//!
//! # Invariant
//!
//! After every public mutation, `parent_tags` holds every ancestor of every
//! explicit tag. The only exception is [`TagContainer::remove_tag`] with
//! `defer_parent_tags = true`; the caller must then call
//! [`TagContainer::fill_parent_tags`] before the next query.
//!
//! `parent_tags` is not deduplicated: `{Color.Red, Color.Green}` stores
//! `Color` twice. Queries only ever ask for membership, so this is harmless.

use std::collections::HashSet;
use std::fmt;

use crate::resolver::TagResolver;
use crate::tag::Tag;
use crate::text::{self, TAG_NAME_KEY};

/// How [`TagContainer::does_tag_container_match`] combines tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContainerMatchType {
    #[default]
    Any,
    All,
}

/// An insertion-ordered, duplicate-free set of [`Tag`]s.
///
/// `has_*` checks are hierarchical (a tag matches if it or any of its
/// descendants is present); `*_exact` checks only look at explicit tags.
#[derive(Clone, Debug, Default)]
pub struct TagContainer {
    tags: Vec<Tag>,
    parent_tags: Vec<Tag>,
}

impl TagContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A container with one explicit tag. The empty tag gives an empty
    /// container.
    pub fn from_tag(tag: Tag) -> Self {
        let mut container = Self::new();
        container.add_tag(tag);
        container
    }

    /// Build from a batch, deriving parent tags in one pass.
    ///
    /// Invalid tags and repeats are skipped, so the result equals adding each
    /// tag with [`add_tag`](Self::add_tag) in any order.
    pub fn create_from_array(tags: &[Tag]) -> Self {
        let mut seen = HashSet::with_capacity(tags.len());
        let mut container = Self {
            tags: tags
                .iter()
                .filter(|tag| tag.is_valid() && seen.insert(*tag))
                .cloned()
                .collect(),
            parent_tags: Vec::new(),
        };
        container.fill_parent_tags();
        container
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of explicit tags.
    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Explicit tags, in insertion order.
    #[inline]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Derived ancestors of the explicit tags.
    #[inline]
    pub fn parent_tags(&self) -> &[Tag] {
        &self.parent_tags
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    /// Explicit tag at `index`, or the empty tag.
    pub fn get(&self, index: usize) -> Tag {
        self.tags.get(index).cloned().unwrap_or_default()
    }

    pub fn first(&self) -> Tag {
        self.tags.first().cloned().unwrap_or_default()
    }

    pub fn last(&self) -> Tag {
        self.tags.last().cloned().unwrap_or_default()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// `tag` is explicit or implied by a descendant. False for the empty tag.
    pub fn has_tag(&self, tag: &Tag) -> bool {
        tag.is_valid() && (self.tags.contains(tag) || self.parent_tags.contains(tag))
    }

    /// `tag` is explicit.
    pub fn has_tag_exact(&self, tag: &Tag) -> bool {
        tag.is_valid() && self.tags.contains(tag)
    }

    /// Some explicit tag of `other` passes [`has_tag`](Self::has_tag).
    /// False when `other` is empty.
    pub fn has_any(&self, other: &TagContainer) -> bool {
        other.tags.iter().any(|tag| self.has_tag(tag))
    }

    pub fn has_any_exact(&self, other: &TagContainer) -> bool {
        other.tags.iter().any(|tag| self.has_tag_exact(tag))
    }

    /// Every explicit tag of `other` passes [`has_tag`](Self::has_tag).
    /// True when `other` is empty.
    pub fn has_all(&self, other: &TagContainer) -> bool {
        other.tags.iter().all(|tag| self.has_tag(tag))
    }

    pub fn has_all_exact(&self, other: &TagContainer) -> bool {
        other.tags.iter().all(|tag| self.has_tag_exact(tag))
    }

    pub fn does_tag_container_match(
        &self,
        other: &TagContainer,
        match_type: ContainerMatchType,
    ) -> bool {
        match match_type {
            ContainerMatchType::Any => self.has_any(other),
            ContainerMatchType::All => self.has_all(other),
        }
    }

    /// Explicit tags that equal or descend from an explicit tag of `other`.
    pub fn filter(&self, other: &TagContainer) -> TagContainer {
        let mut result = TagContainer::new();
        for tag in self.tags.iter().filter(|tag| tag.matches_any(other)) {
            result.add_tag_fast(tag.clone());
        }
        result
    }

    /// Explicit tags that are also explicit in `other`.
    pub fn filter_exact(&self, other: &TagContainer) -> TagContainer {
        let mut result = TagContainer::new();
        for tag in self.tags.iter().filter(|tag| tag.matches_any_exact(other)) {
            result.add_tag_fast(tag.clone());
        }
        result
    }

    /// A new container with every explicit and parent tag as explicit tags.
    pub fn get_message_tag_parents(&self) -> TagContainer {
        let mut result = TagContainer {
            tags: self.tags.clone(),
            parent_tags: Vec::new(),
        };
        for parent in &self.parent_tags {
            if !result.tags.contains(parent) {
                result.tags.push(parent.clone());
            }
        }
        result.fill_parent_tags();
        result
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Add `tag` unless it is already explicit. The empty tag is ignored.
    pub fn add_tag(&mut self, tag: Tag) {
        if tag.is_valid() && !self.tags.contains(&tag) {
            self.add_tag_fast(tag);
        }
    }

    /// Add `tag` without checking for duplicates.
    ///
    /// The caller guarantees `tag` is valid and not already present.
    pub fn add_tag_fast(&mut self, tag: Tag) {
        debug_assert!(!self.tags.contains(&tag), "duplicate tag {tag}");
        self.parent_tags.extend(tag.parents());
        self.tags.push(tag);
    }

    /// Add `tag` as a leaf, dropping explicit ancestors it now implies.
    ///
    /// Returns false, leaving the container untouched, if `tag` is invalid or
    /// already implied by an explicit descendant.
    pub fn add_leaf_tag(&mut self, tag: Tag) -> bool {
        if !tag.is_valid() {
            return false;
        }
        if !self.has_tag_exact(&tag) && self.has_tag(&tag) {
            return false;
        }

        let before = self.tags.len();
        let ancestors: Vec<Tag> = tag.parents().collect();
        self.tags.retain(|explicit| !ancestors.contains(explicit));
        if self.tags.len() != before {
            self.fill_parent_tags();
        }

        self.add_tag(tag);
        true
    }

    /// Remove an explicit tag. With `defer_parent_tags`, parent tags stay
    /// stale until [`fill_parent_tags`](Self::fill_parent_tags).
    pub fn remove_tag(&mut self, tag: &Tag, defer_parent_tags: bool) -> bool {
        let Some(index) = self.tags.iter().position(|explicit| explicit == tag) else {
            return false;
        };
        self.tags.remove(index);
        if !defer_parent_tags {
            self.fill_parent_tags();
        }
        true
    }

    /// Remove every explicit tag of `other`, then rederive parents once.
    pub fn remove_tags(&mut self, other: &TagContainer) {
        let before = self.tags.len();
        self.tags.retain(|tag| !other.tags.contains(tag));
        if self.tags.len() != before {
            self.fill_parent_tags();
        }
    }

    /// Remove the explicit tag whose text is `name`, valid or not.
    pub fn remove_tag_by_explicit_name(&mut self, name: &str) -> bool {
        let Some(tag) = self.tags.iter().find(|tag| tag.name() == Some(name)).cloned() else {
            return false;
        };
        self.remove_tag(&tag, false)
    }

    /// Union of explicit tags; parents rederived once.
    pub fn append_tags(&mut self, other: &TagContainer) {
        self.tags.reserve(other.tags.len());
        for tag in &other.tags {
            if !self.tags.contains(tag) {
                self.tags.push(tag.clone());
            }
        }
        self.fill_parent_tags();
    }

    /// Add each tag of `other_a` whose ancestor chain (itself included)
    /// touches anything `other_b` has, explicit or parent.
    ///
    /// Two siblings match through their shared parent:
    /// `{Color.Green}` against `{Color.Red}` adds `Color.Green`.
    pub fn append_matching_tags(&mut self, other_a: &TagContainer, other_b: &TagContainer) {
        for tag in &other_a.tags {
            let touches = std::iter::once(tag.clone())
                .chain(tag.parents())
                .any(|name| other_b.has_tag(&name));
            if touches {
                self.add_tag(tag.clone());
            }
        }
    }

    /// Empty both lists, keeping at least `slack` capacity.
    pub fn reset(&mut self, slack: usize) {
        self.tags.clear();
        self.parent_tags.clear();
        self.tags.reserve(slack);
        self.parent_tags.reserve(slack);
    }

    /// Rederive `parent_tags` from the explicit tags.
    pub fn fill_parent_tags(&mut self) {
        let Self { tags, parent_tags } = self;
        parent_tags.clear();
        for tag in tags.iter() {
            parent_tags.extend(tag.parents());
        }
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// Parse the text form. Malformed input yields an empty container;
    /// names the resolver rejects are dropped.
    pub fn from_export_string<R: TagResolver + ?Sized>(text: &str, resolver: &R) -> Self {
        let Some(names) = text::parse_container_names(text) else {
            tracing::debug!(text, "malformed tag container text");
            return Self::new();
        };
        let tags: Vec<Tag> = names.into_iter().map(|name| resolver.import(name)).collect();
        Self::create_from_array(&tags)
    }

    /// `A.B, C`, or `"A.B", "C"` when `quoted`.
    pub fn to_string_simple(&self, quoted: bool) -> String {
        self.tags
            .iter()
            .map(|tag| {
                if quoted {
                    format!("\"{tag}\"")
                } else {
                    tag.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Tag names joined with `", "`, wrapped into lines shorter than
    /// `max_len`. A single name longer than `max_len` gets its own line.
    pub fn to_strings_max_len(&self, max_len: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        for tag in &self.tags {
            let name = tag.to_string();
            if !current.is_empty() && current.len() + 2 + name.len() >= max_len {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push_str(", ");
            }
            current.push_str(&name);
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Human-readable description of a match against this container.
    pub fn to_matching_text(&self, match_type: ContainerMatchType, invert: bool) -> String {
        let description = match (match_type, invert) {
            (ContainerMatchType::Any, false) => "Has any tags in set",
            (ContainerMatchType::Any, true) => "Does not have any tags in set",
            (ContainerMatchType::All, false) => "Has all tags in set",
            (ContainerMatchType::All, true) => "Does not have all tags in set",
        };
        format!("{description}: {self}")
    }
}

/// `(TagName="A.B",TagName="C")`, or `()` when empty.
impl fmt::Display for TagContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{TAG_NAME_KEY}=\"{tag}\"")?;
        }
        f.write_str(")")
    }
}

/// Same explicit tags, in any order.
impl PartialEq for TagContainer {
    fn eq(&self, other: &Self) -> bool {
        self.tags.len() == other.tags.len() && self.has_all_exact(other)
    }
}

impl Eq for TagContainer {}

impl From<Tag> for TagContainer {
    fn from(tag: Tag) -> Self {
        Self::from_tag(tag)
    }
}

impl FromIterator<Tag> for TagContainer {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let tags: Vec<Tag> = iter.into_iter().collect();
        Self::create_from_array(&tags)
    }
}

impl Extend<Tag> for TagContainer {
    fn extend<I: IntoIterator<Item = Tag>>(&mut self, iter: I) {
        for tag in iter {
            self.add_tag(tag);
        }
    }
}

impl<'a> IntoIterator for &'a TagContainer {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}
