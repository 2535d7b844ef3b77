//! The [`Tag`] value type.

use std::cmp::Ordering;
use std::fmt;

use crate::container::TagContainer;
use crate::name::TagName;
use crate::resolver::TagResolver;
use crate::text::{self, TAG_NAME_KEY};

/// One canonical hierarchical name, e.g. `Damage.Physical.Slash`.
///
/// Cloning is a reference-count bump; equality and hashing compare the
/// interned handle, never the text.
///
/// Tags are obtained from a [`TagResolver`] (usually the
/// [`MessageTagRegistry`](crate::MessageTagRegistry)) via [`Tag::request`].
/// [`Tag::EMPTY`] is the invalid sentinel.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Tag {
    name: Option<TagName>,
}

impl Tag {
    /// The empty, invalid tag.
    pub const EMPTY: Tag = Tag { name: None };

    pub(crate) fn from_name(name: TagName) -> Self {
        Self { name: Some(name) }
    }

    /// Resolve `name` through `resolver`.
    pub fn request<R: TagResolver + ?Sized>(
        resolver: &R,
        name: &str,
        error_if_not_found: bool,
    ) -> Tag {
        resolver.resolve(name, error_if_not_found)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.name.is_some()
    }

    /// The interned handle, `None` for the empty tag.
    #[inline]
    pub fn tag_name(&self) -> Option<&TagName> {
        self.name.as_ref()
    }

    /// The dotted text, `None` for the empty tag.
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(TagName::as_str)
    }

    /// Number of ancestors, `None` for the empty tag.
    pub fn depth(&self) -> Option<usize> {
        self.name.as_ref().map(TagName::depth)
    }

    /// Ancestors, nearest first. Empty for root-level and empty tags.
    pub fn parents(&self) -> impl Iterator<Item = Tag> + '_ {
        self.name
            .iter()
            .flat_map(TagName::ancestors)
            .map(|name| Tag::from_name(name.clone()))
    }

    /// `self` equals `other` or descends from it.
    ///
    /// ```text
    /// "A.1".matches_tag("A")   → true
    /// "A".matches_tag("A.1")   → false
    /// ```
    pub fn matches_tag(&self, other: &Tag) -> bool {
        match (&self.name, &other.name) {
            (Some(this), Some(other)) => this.is_within(other),
            _ => false,
        }
    }

    pub fn matches_tag_exact(&self, other: &Tag) -> bool {
        other.is_valid() && self == other
    }

    /// Some explicit tag of `container` is `self` or one of its ancestors.
    pub fn matches_any(&self, container: &TagContainer) -> bool {
        container.tags().iter().any(|tag| self.matches_tag(tag))
    }

    pub fn matches_any_exact(&self, container: &TagContainer) -> bool {
        self.is_valid() && container.has_tag_exact(self)
    }

    /// Number of names shared by the two ancestor chains (self included).
    ///
    /// `A.B.C` vs `A.B.D` → 2, `A.B` vs `X` → 0.
    pub fn matches_tag_depth(&self, other: &Tag) -> usize {
        let (Some(this), Some(other)) = (&self.name, &other.name) else {
            return 0;
        };
        chain(this)
            .filter(|name| chain(other).any(|candidate| candidate == *name))
            .count()
    }

    /// The tag with its last segment removed, empty at the root.
    pub fn request_direct_parent(&self) -> Tag {
        self.name
            .as_ref()
            .and_then(TagName::parent)
            .map_or(Tag::EMPTY, |parent| Tag::from_name(parent.clone()))
    }

    /// A container holding this tag, with its ancestors as parent tags.
    pub fn single_tag_container(&self) -> TagContainer {
        TagContainer::from_tag(self.clone())
    }

    /// A container holding this tag and all its ancestors as explicit tags.
    pub fn tag_parents(&self) -> TagContainer {
        std::iter::once(self.clone())
            .chain(self.parents())
            .collect()
    }

    /// `(TagName="A.B")`; the empty tag exports as `(TagName="None")`.
    pub fn to_export_string(&self) -> String {
        format!("({TAG_NAME_KEY}=\"{}\")", self.name().unwrap_or("None"))
    }

    /// Parse a tag's text form. Malformed input yields the empty tag.
    pub fn from_export_string<R: TagResolver + ?Sized>(text: &str, resolver: &R) -> Tag {
        match text::parse_tag_name(text) {
            Some(name) => resolver.import(name),
            None => {
                tracing::debug!(text, "malformed tag text");
                Tag::EMPTY
            }
        }
    }
}

fn chain(name: &TagName) -> impl Iterator<Item = &TagName> {
    std::iter::once(name).chain(name.ancestors())
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or_default())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.debug_tuple("Tag").field(&name).finish(),
            None => f.write_str("Tag(EMPTY)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MessageTagRegistry;

    fn registry() -> MessageTagRegistry {
        MessageTagRegistry::build(&["A.1", "A.B.C", "A.B.D", "Color.Red", "X"]).unwrap()
    }

    #[test]
    fn request_and_validity() {
        let reg = registry();
        let tag = Tag::request(&reg, "A.B.C", false);
        assert!(tag.is_valid());
        assert_eq!(tag.name(), Some("A.B.C"));
        assert_eq!(tag.depth(), Some(2));

        let missing = Tag::request(&reg, "Nope", false);
        assert!(!missing.is_valid());
        assert_eq!(missing, Tag::EMPTY);
        assert_eq!(missing.name(), None);
    }

    #[test]
    fn matches_tag_is_hierarchical() {
        let reg = registry();
        let a = reg.request_tag("A", false);
        let a1 = reg.request_tag("A.1", false);

        assert!(a1.matches_tag(&a));
        assert!(!a.matches_tag(&a1));
        assert!(a.matches_tag(&a));
        assert!(!a.matches_tag(&Tag::EMPTY));
        assert!(!Tag::EMPTY.matches_tag(&a));
    }

    #[test]
    fn matches_tag_exact() {
        let reg = registry();
        let a = reg.request_tag("A", false);
        let a1 = reg.request_tag("A.1", false);

        assert!(a1.matches_tag_exact(&a1));
        assert!(!a1.matches_tag_exact(&a));
        assert!(!Tag::EMPTY.matches_tag_exact(&Tag::EMPTY));
    }

    #[test]
    fn matches_any_uses_container() {
        let reg = registry();
        let container = reg.request_tag_container(&["A.B", "Color.Red"], false);
        let abc = reg.request_tag("A.B.C", false);
        let a = reg.request_tag("A", false);

        assert!(abc.matches_any(&container));
        assert!(!abc.matches_any_exact(&container));
        // "A" is only a parent in the container
        assert!(!a.matches_any(&container));
        assert!(reg.request_tag("A.B", false).matches_any_exact(&container));
    }

    #[test]
    fn depth_counts_shared_names() {
        let reg = registry();
        let abc = reg.request_tag("A.B.C", false);
        let abd = reg.request_tag("A.B.D", false);
        let x = reg.request_tag("X", false);

        assert_eq!(abc.matches_tag_depth(&abd), 2);
        assert_eq!(abc.matches_tag_depth(&abc), 3);
        assert_eq!(abc.matches_tag_depth(&x), 0);
        assert_eq!(abc.matches_tag_depth(&Tag::EMPTY), 0);
    }

    #[test]
    fn direct_parent_and_parents() {
        let reg = registry();
        let abc = reg.request_tag("A.B.C", false);

        assert_eq!(abc.request_direct_parent(), reg.request_tag("A.B", false));
        assert_eq!(reg.request_tag("X", false).request_direct_parent(), Tag::EMPTY);
        assert_eq!(Tag::EMPTY.request_direct_parent(), Tag::EMPTY);

        let parents: Vec<_> = abc.parents().map(|t| t.to_string()).collect();
        assert_eq!(parents, vec!["A.B", "A"]);
    }

    #[test]
    fn tag_parents_are_explicit() {
        let reg = registry();
        let abc = reg.request_tag("A.B.C", false);

        let expanded = abc.tag_parents();
        assert_eq!(expanded.len(), 3);
        assert!(expanded.has_tag_exact(&reg.request_tag("A", false)));

        let single = abc.single_tag_container();
        assert_eq!(single.len(), 1);
        assert!(single.has_tag(&reg.request_tag("A", false)));
        assert!(!single.has_tag_exact(&reg.request_tag("A", false)));
    }

    #[test]
    fn ordering_uses_numeric_suffix() {
        let reg = MessageTagRegistry::build(&["Item.10", "Item.9", "Item.2"]).unwrap();
        let mut tags = vec![
            reg.request_tag("Item.10", false),
            Tag::EMPTY,
            reg.request_tag("Item.9", false),
            reg.request_tag("Item.2", false),
        ];
        tags.sort();
        let names: Vec<_> = tags.iter().map(Tag::to_string).collect();
        assert_eq!(names, vec!["", "Item.2", "Item.9", "Item.10"]);
    }

    #[test]
    fn export_string_round_trip() {
        let reg = registry();
        let tag = reg.request_tag("Color.Red", false);

        assert_eq!(tag.to_export_string(), "(TagName=\"Color.Red\")");
        assert_eq!(Tag::from_export_string(&tag.to_export_string(), &reg), tag);
        assert_eq!(Tag::from_export_string("\"Color.Red\"", &reg), tag);
        assert_eq!(Tag::from_export_string("Color.Red", &reg), tag);

        assert_eq!(Tag::EMPTY.to_export_string(), "(TagName=\"None\")");
        assert_eq!(Tag::from_export_string("(TagName=\"None\")", &reg), Tag::EMPTY);
        assert_eq!(Tag::from_export_string("(TagName=\"Color.Red\"", &reg), Tag::EMPTY);
    }

    #[test]
    fn display_and_debug() {
        let reg = registry();
        let tag = reg.request_tag("A.B.C", false);
        assert_eq!(tag.to_string(), "A.B.C");
        assert_eq!(format!("{tag:?}"), "Tag(\"A.B.C\")");
        assert_eq!(format!("{:?}", Tag::EMPTY), "Tag(EMPTY)");
    }
}
