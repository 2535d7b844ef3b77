//! Message tag registry: the reference [`TagResolver`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use message_tag_config::{validate_tag_string, TagRedirect, TagsConfig};
use tracing::{debug, error, warn};

use crate::container::TagContainer;
use crate::error::TagError;
use crate::name::{self, NameTable, TagName, MAX_NAME_SEGMENTS};
use crate::redirect::TagRedirectors;
use crate::resolver::TagResolver;
use crate::tag::Tag;

/// Runtime node for a registered tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagNode {
    pub tag: Tag,
    /// False if the node only exists because a child was registered.
    pub is_explicit: bool,
}

/// Registry of known tags.
///
/// Provides:
/// - Name → [`Tag`] resolution through a shared [`NameTable`]
/// - Automatic registration of every ancestor of a registered path
/// - DFS-ordered iteration (parents first, siblings in numeric-suffix order)
/// - Redirects for renamed tags, applied on import
#[derive(Clone, Debug)]
pub struct MessageTagRegistry {
    names: Arc<NameTable>,
    /// Maximum tree depth encountered (0 = empty, 1 = only root nodes, etc.).
    max_depth: usize,
    nodes: Vec<TagNode>,
    path_to_idx: HashMap<String, usize>,
    dfs_order: Vec<Tag>,
    redirectors: TagRedirectors,
    invalid_characters: String,
    warn_on_invalid_tags: bool,
    clear_invalid_tags: bool,
}

impl Default for MessageTagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageTagRegistry {
    pub fn new() -> Self {
        Self::with_names(Arc::new(NameTable::new()))
    }

    /// An empty registry interning into `names`.
    ///
    /// Registries sharing a table produce equal tags for equal names.
    pub fn with_names(names: Arc<NameTable>) -> Self {
        let defaults = TagsConfig::default();
        Self {
            names,
            max_depth: 0,
            nodes: Vec::new(),
            path_to_idx: HashMap::new(),
            dfs_order: Vec::new(),
            redirectors: TagRedirectors::new(),
            invalid_characters: defaults.invalid_characters,
            warn_on_invalid_tags: defaults.warn_on_invalid_tags,
            clear_invalid_tags: defaults.clear_invalid_tags,
        }
    }

    /// Build a registry from explicit paths with default settings.
    pub fn build(paths: &[&str]) -> Result<Self, TagError> {
        let mut registry = Self::new();
        for path in paths {
            registry.insert(path)?;
        }
        registry.rebuild_dfs_order();
        Ok(registry)
    }

    /// Build a registry from a parsed `tags.toml`.
    pub fn from_config(config: &TagsConfig) -> Result<Self, TagError> {
        let mut registry = Self::new();
        registry.invalid_characters = config.invalid_characters.clone();
        registry.warn_on_invalid_tags = config.warn_on_invalid_tags;
        registry.clear_invalid_tags = config.clear_invalid_tags;

        for path in config.explicit_paths() {
            registry.insert(path)?;
        }
        registry.rebuild_dfs_order();
        registry.add_redirects(&config.redirects);
        Ok(registry)
    }

    /// Load and build from a `tags.toml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TagError> {
        let config = TagsConfig::from_file(path)?;
        Self::from_config(&config)
    }

    /// The interner tags from this registry come from.
    pub fn names(&self) -> &Arc<NameTable> {
        &self.names
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a tag at runtime.
    ///
    /// Parent nodes are created if they don't exist. Registering an existing
    /// path returns its tag and marks it explicit.
    ///
    /// # Errors
    ///
    /// - [`TagError::EmptyPath`] for `""`
    /// - [`TagError::InvalidTagString`] with a suggested fix otherwise
    pub fn register(&mut self, path: &str) -> Result<Tag, TagError> {
        let tag = self.insert(path)?;
        self.rebuild_dfs_order();
        Ok(tag)
    }

    /// Register without rebuilding the DFS order.
    fn insert(&mut self, path: &str) -> Result<Tag, TagError> {
        self.is_valid_tag_string(path)?;

        if let Some(&idx) = self.path_to_idx.get(path) {
            let node = &mut self.nodes[idx];
            node.is_explicit = true;
            return Ok(node.tag.clone());
        }

        let segments = name::segment_count(path);
        if segments > MAX_NAME_SEGMENTS {
            return Err(TagError::TooDeep {
                segments,
                max: MAX_NAME_SEGMENTS,
            });
        }
        let name = self.names.intern(path).ok_or(TagError::EmptyPath)?;

        // Ancestors root first
        let mut ancestors: Vec<&TagName> = name.ancestors().collect();
        ancestors.reverse();
        for ancestor in ancestors {
            if !self.path_to_idx.contains_key(ancestor.as_str()) {
                self.push_node(ancestor.clone(), false);
            }
        }
        let tag = self.push_node(name.clone(), true);

        if name.depth() >= self.max_depth {
            self.max_depth = name.depth() + 1;
        }

        debug!(tag = path, "registered message tag");
        Ok(tag)
    }

    fn push_node(&mut self, name: TagName, is_explicit: bool) -> Tag {
        let tag = Tag::from_name(name);
        let idx = self.nodes.len();
        self.path_to_idx.insert(tag.to_string(), idx);
        self.nodes.push(TagNode {
            tag: tag.clone(),
            is_explicit,
        });
        tag
    }

    /// Rebuild DFS order from current nodes.
    ///
    /// DFS order: parent before children, siblings in numeric-suffix order.
    fn rebuild_dfs_order(&mut self) {
        let mut children: HashMap<Option<&TagName>, Vec<&Tag>> = HashMap::new();
        for node in &self.nodes {
            let parent = node.tag.tag_name().and_then(TagName::parent);
            children.entry(parent).or_default().push(&node.tag);
        }
        for list in children.values_mut() {
            list.sort();
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        Self::dfs_collect(None, &children, &mut order);
        self.dfs_order = order;
    }

    fn dfs_collect(
        parent: Option<&TagName>,
        children: &HashMap<Option<&TagName>, Vec<&Tag>>,
        out: &mut Vec<Tag>,
    ) {
        if let Some(kids) = children.get(&parent) {
            for kid in kids {
                out.push((*kid).clone());
                Self::dfs_collect(kid.tag_name(), children, out);
            }
        }
    }

    /// Check a tag string against the configured invalid characters.
    ///
    /// ```text
    /// registry.is_valid_tag_string("A.B")   → Ok(())
    /// registry.is_valid_tag_string("A,B")   → Err(fixed: "A_B")
    /// registry.is_valid_tag_string("")      → Err(EmptyPath)
    /// ```
    pub fn is_valid_tag_string(&self, text: &str) -> Result<(), TagError> {
        if text.is_empty() {
            return Err(TagError::EmptyPath);
        }
        validate_tag_string(text, &self.invalid_characters)?;
        Ok(())
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Registered tag for `name`, or the empty tag.
    pub fn request_tag(&self, name: &str, error_if_not_found: bool) -> Tag {
        if let Some(&idx) = self.path_to_idx.get(name) {
            return self.nodes[idx].tag.clone();
        }
        if error_if_not_found {
            error!(tag = name, "requested message tag was not found");
        }
        Tag::EMPTY
    }

    /// Registered tags for `names`; unknown names are skipped.
    pub fn request_tag_container(&self, names: &[&str], error_if_not_found: bool) -> TagContainer {
        let tags: Vec<Tag> = names
            .iter()
            .map(|name| self.request_tag(name, error_if_not_found))
            .collect();
        TagContainer::create_from_array(&tags)
    }

    /// Node for a registered tag.
    pub fn find_tag_node(&self, tag: &Tag) -> Option<&TagNode> {
        let idx = *self.path_to_idx.get(tag.name()?)?;
        let node = &self.nodes[idx];
        (node.tag == *tag).then_some(node)
    }

    /// `tag` and its ancestors as explicit tags; empty if unregistered.
    pub fn request_tag_parents(&self, tag: &Tag) -> TagContainer {
        match self.find_tag_node(tag) {
            Some(node) => node.tag.tag_parents(),
            None => TagContainer::new(),
        }
    }

    /// Every registered descendant of `tag`, in DFS order.
    pub fn request_tag_children(&self, tag: &Tag) -> TagContainer {
        if self.find_tag_node(tag).is_none() {
            return TagContainer::new();
        }
        let children: Vec<Tag> = self
            .dfs_order
            .iter()
            .filter(|candidate| *candidate != tag && candidate.matches_tag(tag))
            .cloned()
            .collect();
        TagContainer::create_from_array(&children)
    }

    pub fn request_direct_parent(&self, tag: &Tag) -> Tag {
        match self.find_tag_node(tag) {
            Some(node) => node.tag.request_direct_parent(),
            None => Tag::EMPTY,
        }
    }

    /// The cached single-tag container for a registered tag.
    pub fn single_tag_container(&self, tag: &Tag) -> Option<TagContainer> {
        self.find_tag_node(tag)
            .map(|node| node.tag.single_tag_container())
    }

    /// [`Tag::matches_tag_depth`] for two registered tags, 0 otherwise.
    pub fn tags_match_depth(&self, a: &Tag, b: &Tag) -> usize {
        if self.find_tag_node(a).is_none() || self.find_tag_node(b).is_none() {
            return 0;
        }
        a.matches_tag_depth(b)
    }

    /// Exact match, else the shortest registered name containing `partial`.
    ///
    /// Scans every node.
    pub fn find_tag_from_partial_string_slow(&self, partial: &str) -> Tag {
        let exact = self.request_tag(partial, false);
        if exact.is_valid() || partial.is_empty() {
            return exact;
        }
        self.dfs_order
            .iter()
            .filter(|tag| tag.to_string().contains(partial))
            .min_by_key(|tag| tag.name().map_or(usize::MAX, str::len))
            .cloned()
            .unwrap_or_default()
    }

    /// All registered tags in DFS order, or only the explicitly registered
    /// ones.
    pub fn all_tags(&self, only_explicit: bool) -> TagContainer {
        let tags: Vec<Tag> = self
            .dfs_order
            .iter()
            .filter(|tag| {
                !only_explicit || self.find_tag_node(tag).is_some_and(|node| node.is_explicit)
            })
            .cloned()
            .collect();
        TagContainer::create_from_array(&tags)
    }

    /// Get the current maximum tree depth (0 = empty, 1 = only root nodes, etc.).
    #[inline]
    pub fn tree_depth(&self) -> usize {
        self.max_depth
    }

    /// Total number of registered nodes, implicit parents included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All tags in DFS order.
    #[inline]
    pub fn dfs_order(&self) -> &[Tag] {
        &self.dfs_order
    }

    /// Nodes in registration order.
    pub fn nodes(&self) -> &[TagNode] {
        &self.nodes
    }

    /// Check if a path is registered.
    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.path_to_idx.contains_key(path)
    }

    // =========================================================================
    // Import settings and redirects
    // =========================================================================

    pub fn warn_on_invalid_tags(&self) -> bool {
        self.warn_on_invalid_tags
    }

    pub fn set_warn_on_invalid_tags(&mut self, warn: bool) {
        self.warn_on_invalid_tags = warn;
    }

    pub fn clear_invalid_tags(&self) -> bool {
        self.clear_invalid_tags
    }

    /// Drop unknown names on import instead of keeping them as raw tags.
    pub fn set_clear_invalid_tags(&mut self, clear: bool) {
        self.clear_invalid_tags = clear;
    }

    pub fn add_redirects(&mut self, redirects: &[TagRedirect]) {
        self.redirectors.add_redirects(redirects, &self.names);
    }

    /// Replacement for a renamed tag.
    pub fn redirect_tag(&self, old_name: &str) -> Option<&Tag> {
        self.redirectors.get(old_name)
    }

    /// Apply redirects to a loaded container.
    ///
    /// Redirected names are replaced by their targets. Unregistered names are
    /// reported when `warn_on_invalid_tags` and removed when
    /// `clear_invalid_tags`.
    pub fn redirect_tags_for_container(&self, container: &mut TagContainer) {
        let mut names_to_remove = Vec::new();
        let mut tags_to_add = Vec::new();

        for tag in container.iter() {
            let Some(name) = tag.name() else {
                continue;
            };
            if let Some(new_tag) = self.redirect_tag(name) {
                names_to_remove.push(name.to_string());
                if new_tag.is_valid() {
                    tags_to_add.push(new_tag.clone());
                }
            } else if !self.contains(name) {
                if self.warn_on_invalid_tags {
                    warn!(tag = name, "invalid message tag found in container");
                }
                if self.clear_invalid_tags {
                    names_to_remove.push(name.to_string());
                }
            }
        }

        for name in &names_to_remove {
            container.remove_tag_by_explicit_name(name);
        }
        container.extend(tags_to_add);
    }
}

impl TagResolver for MessageTagRegistry {
    fn resolve(&self, name: &str, error_if_not_found: bool) -> Tag {
        self.request_tag(name, error_if_not_found)
    }

    fn redirect(&self, old_name: &str) -> Option<Tag> {
        self.redirect_tag(old_name).cloned()
    }

    /// Unknown names are kept as raw tags unless `clear_invalid_tags` is set.
    fn import(&self, name: &str) -> Tag {
        let name = name.trim();
        if name.is_empty() || name == "None" {
            return Tag::EMPTY;
        }
        if let Some(tag) = self.redirect_tag(name) {
            return tag.clone();
        }

        let tag = self.request_tag(name, false);
        if tag.is_valid() {
            return tag;
        }

        if self.warn_on_invalid_tags {
            warn!(tag = name, "invalid message tag found while importing");
        }
        if self.clear_invalid_tags {
            return Tag::EMPTY;
        }
        self.names
            .intern(name)
            .map(Tag::from_name)
            .unwrap_or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================
