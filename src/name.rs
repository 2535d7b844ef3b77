//! Interned tag names.
//!
//! A [`NameTable`] hands out [`TagName`] handles. Interning `"A.B.C"` also
//! interns `"A.B"` and `"A"`, and every handle keeps a link to its direct
//! parent handle. Ancestor chains are therefore pointer walks: once a name has
//! been interned, nothing needs the table again to find its parents.
//!
//! Handles compare and hash by identity, so equality is O(1). Handles from two
//! different tables never compare equal, even for the same text.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

/// Handle to an interned dotted name.
#[derive(Clone)]
pub struct TagName(Arc<NameEntry>);

struct NameEntry {
    id: u32,
    text: Arc<str>,
    parent: Option<TagName>,
    depth: usize,
}

impl TagName {
    /// The full dotted text, e.g. `"Damage.Physical.Slash"`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0.text
    }

    /// Index assigned by the owning table, in interning order.
    #[inline]
    pub fn id(&self) -> u32 {
        self.0.id
    }

    /// The name with its last `.segment` removed, `None` at the root.
    #[inline]
    pub fn parent(&self) -> Option<&TagName> {
        self.0.parent.as_ref()
    }

    /// Number of ancestors (0 for a root-level name).
    #[inline]
    pub fn depth(&self) -> usize {
        self.0.depth
    }

    /// The last segment, e.g. `"Slash"` for `"Damage.Physical.Slash"`.
    pub fn leaf(&self) -> &str {
        let text = self.as_str();
        text.rfind('.').map_or(text, |dot| &text[dot + 1..])
    }

    /// Ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &TagName> {
        std::iter::successors(self.parent(), |&name| name.parent())
    }

    /// True if `self` equals `ancestor` or lies below it.
    pub fn is_within(&self, ancestor: &TagName) -> bool {
        self == ancestor || self.ancestors().any(|name| name == ancestor)
    }
}

impl PartialEq for TagName {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TagName {}

impl Hash for TagName {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl Ord for TagName {
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        compare_with_numeric_suffix(self.as_str(), other.as_str())
            // Same text from two tables: keep the order total
            .then_with(|| Arc::as_ptr(&self.0).cmp(&Arc::as_ptr(&other.0)))
    }
}

impl PartialOrd for TagName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TagName").field(&self.as_str()).finish()
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Name table
// =============================================================================

/// Thread-safe string interner for tag names.
///
/// Share it between registries with `Arc<NameTable>`; lookups take a read
/// lock, only first-time interning takes the write lock.
#[derive(Default)]
pub struct NameTable {
    inner: RwLock<NameTableInner>,
}

#[derive(Default)]
struct NameTableInner {
    by_text: HashMap<Arc<str>, TagName>,
    by_id: Vec<TagName>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text` and all of its dotted prefixes.
    ///
    /// Returns `None` for the empty string, which is never a name, and for
    /// names with more than [`MAX_NAME_SEGMENTS`] segments.
    pub fn intern(&self, text: &str) -> Option<TagName> {
        if text.is_empty() || segment_count(text) > MAX_NAME_SEGMENTS {
            return None;
        }
        if let Some(name) = self.find(text) {
            return Some(name);
        }
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        Some(inner.intern(text))
    }

    /// Look up an already interned name.
    pub fn find(&self, text: &str) -> Option<TagName> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.by_text.get(text).cloned()
    }

    /// Handle → name, by interning index.
    pub fn resolve(&self, id: u32) -> Option<TagName> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.by_id.get(id as usize).cloned()
    }

    /// Number of interned names (prefixes included).
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NameTableInner {
    fn intern(&mut self, text: &str) -> TagName {
        if let Some(name) = self.by_text.get(text) {
            return name.clone();
        }

        let separators: Vec<usize> = separator_positions(text).collect();

        // Deepest prefix already interned, then extend one segment at a time
        let mut known = separators.len();
        let mut parent = None;
        while known > 0 {
            if let Some(name) = self.by_text.get(&text[..separators[known - 1]]) {
                parent = Some(name.clone());
                break;
            }
            known -= 1;
        }
        for &end in &separators[known..] {
            parent = Some(self.push(&text[..end], parent.take()));
        }
        self.push(text, parent)
    }

    fn push(&mut self, text: &str, parent: Option<TagName>) -> TagName {
        let depth = parent.as_ref().map_or(0, |p| p.depth() + 1);
        let id = u32::try_from(self.by_id.len()).unwrap_or(u32::MAX);
        let text: Arc<str> = Arc::from(text);
        let name = TagName(Arc::new(NameEntry {
            id,
            text: Arc::clone(&text),
            parent,
            depth,
        }));

        self.by_text.insert(text, name.clone());
        self.by_id.push(name.clone());
        name
    }
}

impl Drop for NameTableInner {
    fn drop(&mut self) {
        // Children are interned after their parents. Releasing from the back
        // frees one entry per pop instead of unwinding a whole chain.
        self.by_text.clear();
        while self.by_id.pop().is_some() {}
    }
}

/// Longest accepted name, in dot-separated segments.
pub const MAX_NAME_SEGMENTS: usize = 256;

/// Number of segments in `text`. A leading dot is not a separator: ".A" is a
/// root name.
pub(crate) fn segment_count(text: &str) -> usize {
    separator_positions(text).count() + 1
}

fn separator_positions(text: &str) -> impl Iterator<Item = usize> + '_ {
    text.match_indices('.')
        .map(|(i, _)| i)
        .filter(|&i| i > 0)
}

impl fmt::Debug for NameTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameTable").field("len", &self.len()).finish()
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Compare two names, treating a trailing run of digits as a number.
///
/// ```text
/// "Item.9"  < "Item.10"
/// "Tag"     < "Tag1"
/// "A"       < "A.B"
/// ```
///
/// Prefixes compare byte-wise; a missing suffix sorts before any suffix;
/// suffixes compare by value (leading zeros ignored, no overflow). Ties fall
/// back to a byte-wise comparison of the full strings.
pub fn compare_with_numeric_suffix(a: &str, b: &str) -> Ordering {
    let (a_prefix, a_digits) = split_numeric_suffix(a);
    let (b_prefix, b_digits) = split_numeric_suffix(b);

    a_prefix
        .cmp(b_prefix)
        .then_with(|| compare_digits(a_digits, b_digits))
        .then_with(|| a.cmp(b))
}

fn split_numeric_suffix(s: &str) -> (&str, &str) {
    let digits = s.bytes().rev().take_while(u8::is_ascii_digit).count();
    s.split_at(s.len() - digits)
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => {
            let a = a.trim_start_matches('0');
            let b = b.trim_start_matches('0');
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let table = NameTable::new();
        let a = table.intern("Damage.Physical").unwrap();
        let b = table.intern("Damage.Physical").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.id(), b.id());
        // Damage, Damage.Physical
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn intern_links_parents() {
        let table = NameTable::new();
        let slash = table.intern("Damage.Physical.Slash").unwrap();

        let physical = slash.parent().unwrap();
        assert_eq!(physical.as_str(), "Damage.Physical");
        assert_eq!(physical, &table.find("Damage.Physical").unwrap());

        let damage = physical.parent().unwrap();
        assert_eq!(damage.as_str(), "Damage");
        assert!(damage.parent().is_none());

        assert_eq!(slash.depth(), 2);
        assert_eq!(damage.depth(), 0);
        assert_eq!(slash.leaf(), "Slash");
    }

    #[test]
    fn ancestors_nearest_first() {
        let table = NameTable::new();
        let name = table.intern("A.B.C.D").unwrap();
        let chain: Vec<_> = name.ancestors().map(TagName::as_str).collect();
        assert_eq!(chain, vec!["A.B.C", "A.B", "A"]);
    }

    #[test]
    fn is_within_checks_hierarchy() {
        let table = NameTable::new();
        let child = table.intern("A.B").unwrap();
        let parent = table.intern("A").unwrap();
        let lookalike = table.intern("AB").unwrap();

        assert!(child.is_within(&parent));
        assert!(child.is_within(&child));
        assert!(!parent.is_within(&child));
        assert!(!lookalike.is_within(&parent));
    }

    #[test]
    fn empty_is_not_a_name() {
        let table = NameTable::new();
        assert!(table.intern("").is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn resolve_by_id() {
        let table = NameTable::new();
        let name = table.intern("X.Y").unwrap();
        assert_eq!(table.resolve(name.id()), Some(name));
        assert!(table.resolve(99).is_none());
    }

    #[test]
    fn tables_are_independent() {
        let first = NameTable::new();
        let second = NameTable::new();
        let a = first.intern("Same").unwrap();
        let b = second.intern("Same").unwrap();
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn intern_reuses_deepest_known_prefix() {
        let table = NameTable::new();
        let ab = table.intern("A.B").unwrap();
        let abcd = table.intern("A.B.C.D").unwrap();

        assert_eq!(abcd.ancestors().nth(1), Some(&ab));
        assert_eq!(abcd.depth(), 3);
        // A, A.B, A.B.C, A.B.C.D
        assert_eq!(table.len(), 4);

        let rooted = table.intern(".X.Y").unwrap();
        assert_eq!(rooted.parent().map(TagName::as_str), Some(".X"));
    }

    #[test]
    fn deep_names_intern_and_drop() {
        let deep = vec!["s"; MAX_NAME_SEGMENTS].join(".");
        let table = NameTable::new();
        let name = table.intern(&deep).unwrap();
        assert_eq!(name.depth(), MAX_NAME_SEGMENTS - 1);
        assert_eq!(name.ancestors().count(), MAX_NAME_SEGMENTS - 1);
        drop(table);
        assert_eq!(name.as_str(), deep);
    }

    #[test]
    fn over_deep_names_are_rejected() {
        let table = NameTable::new();
        let too_deep = vec!["s"; MAX_NAME_SEGMENTS + 1].join(".");
        assert!(table.intern(&too_deep).is_none());
        assert!(table.is_empty());

        let huge = vec!["a"; 100_000].join(".");
        assert!(table.intern(&huge).is_none());
    }

    #[test]
    fn numeric_suffix_ordering() {
        assert_eq!(compare_with_numeric_suffix("Tag.2", "Tag.10"), Ordering::Less);
        assert_eq!(compare_with_numeric_suffix("Item.10", "Item.9"), Ordering::Greater);
        assert_eq!(compare_with_numeric_suffix("Tag", "Tag1"), Ordering::Less);
        assert_eq!(compare_with_numeric_suffix("A", "A.B"), Ordering::Less);
        assert_eq!(compare_with_numeric_suffix("Tag.007", "Tag.7"), Ordering::Less);
        assert_eq!(compare_with_numeric_suffix("Same", "Same"), Ordering::Equal);

        // Plain comparison would put "Tag.10" first
        assert_eq!("Tag.10".cmp("Tag.2"), Ordering::Less);
    }

    #[test]
    fn huge_suffixes_do_not_overflow() {
        let a = "N.99999999999999999999999999999";
        let b = "N.100000000000000000000000000000";
        assert_eq!(compare_with_numeric_suffix(a, b), Ordering::Less);
    }

    #[test]
    fn names_sort_with_numeric_suffix() {
        let table = NameTable::new();
        let mut names: Vec<_> = ["Item.10", "Item.9", "Item.1", "Item"]
            .iter()
            .filter_map(|t| table.intern(t))
            .collect();
        names.sort();
        let sorted: Vec<_> = names.iter().map(TagName::as_str).collect();
        assert_eq!(sorted, vec!["Item", "Item.1", "Item.9", "Item.10"]);
    }
}
