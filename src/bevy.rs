//! Bevy integration for message tags.
//!
//! Provides:
//! - `MessageTagsPlugin`: plugin inserting a [`MessageTagRegistry`] resource
//! - `MessageTags`: component wrapping a [`TagContainer`]
//!
//! # Example
//!
//! ```ignore
//! use bevy::prelude::*;
//! use message_tag::bevy::*;
//! use message_tag::MessageTagRegistry;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(MessageTagsPlugin::from_paths(&["Movement.Idle", "Combat.Block"]))
//!         .add_systems(Startup, spawn_entities)
//!         .run();
//! }
//!
//! fn spawn_entities(mut commands: Commands, registry: Res<MessageTagRegistry>) {
//!     commands.spawn(MessageTags::from(
//!         registry.request_tag_container(&["Movement.Idle", "Combat.Block"], true),
//!     ));
//! }
//!
//! fn blocking(query: Query<&MessageTags>, registry: Res<MessageTagRegistry>) {
//!     let combat = registry.request_tag("Combat", true);
//!     for tags in &query {
//!         if tags.has_tag(&combat) {
//!             // Entity has some Combat-related tag
//!         }
//!     }
//! }
//! ```

use std::ops::{Deref, DerefMut};

use bevy::prelude::{App, Component, Plugin, Resource};
use message_tag_config::TagsConfig;

use crate::container::TagContainer;
use crate::registry::MessageTagRegistry;

// =============================================================================
// Plugin
// =============================================================================

/// Where the plugin gets its tags from.
#[derive(Default)]
enum TagSource {
    #[default]
    Empty,
    Paths(&'static [&'static str]),
    Config(TagsConfig),
}

/// Bevy plugin for the message tag system.
///
/// ```ignore
/// App::new()
///     .add_plugins(MessageTagsPlugin::from_config(TagsConfig::from_file("tags.toml")?))
/// ```
#[derive(Default)]
pub struct MessageTagsPlugin {
    source: TagSource,
}

impl MessageTagsPlugin {
    /// A plugin inserting an empty registry; tags can be registered later.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_paths(paths: &'static [&'static str]) -> Self {
        Self {
            source: TagSource::Paths(paths),
        }
    }

    pub fn from_config(config: TagsConfig) -> Self {
        Self {
            source: TagSource::Config(config),
        }
    }
}

impl Plugin for MessageTagsPlugin {
    fn build(&self, app: &mut App) {
        let registry = match &self.source {
            TagSource::Empty => Ok(MessageTagRegistry::new()),
            TagSource::Paths(paths) => MessageTagRegistry::build(paths),
            TagSource::Config(config) => MessageTagRegistry::from_config(config),
        };

        let registry = registry.unwrap_or_else(|err| {
            tracing::error!(%err, "failed to build message tag registry; starting empty");
            MessageTagRegistry::new()
        });

        app.insert_resource(registry);
    }
}

// =============================================================================
// MessageTags Component
// =============================================================================

/// The tags carried by an entity.
///
/// Derefs to [`TagContainer`], so every container query is available:
///
/// ```ignore
/// fn system(query: Query<&MessageTags>) {
///     for tags in &query {
///         if tags.has_any(&wanted) { /* ... */ }
///     }
/// }
/// ```
#[derive(Component, Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageTags(pub TagContainer);

impl MessageTags {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn into_inner(self) -> TagContainer {
        self.0
    }
}

impl Deref for MessageTags {
    type Target = TagContainer;

    fn deref(&self) -> &TagContainer {
        &self.0
    }
}

impl DerefMut for MessageTags {
    fn deref_mut(&mut self) -> &mut TagContainer {
        &mut self.0
    }
}

impl From<TagContainer> for MessageTags {
    fn from(container: TagContainer) -> Self {
        Self(container)
    }
}

// =============================================================================
// Resource impl for MessageTagRegistry
// =============================================================================

impl Resource for MessageTagRegistry {}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_inserts_registry() {
        let mut app = App::new();
        app.add_plugins(MessageTagsPlugin::from_paths(&["Movement.Idle", "Combat.Block"]));

        let registry = app.world().resource::<MessageTagRegistry>();
        assert!(registry.contains("Movement"));
        assert!(registry.contains("Combat.Block"));
    }

    #[test]
    fn plugin_from_config() {
        let config = TagsConfig::from_paths(&["A.B"]).unwrap();
        let mut app = App::new();
        app.add_plugins(MessageTagsPlugin::from_config(config));

        assert_eq!(app.world().resource::<MessageTagRegistry>().len(), 2);
    }

    #[test]
    fn invalid_paths_fall_back_to_empty_registry() {
        let mut app = App::new();
        app.add_plugins(MessageTagsPlugin::from_paths(&["Bad..Path"]));

        assert!(app.world().resource::<MessageTagRegistry>().is_empty());
    }

    #[test]
    fn component_derefs_to_container() {
        let mut app = App::new();
        app.add_plugins(MessageTagsPlugin::from_paths(&["Movement.Idle"]));

        let idle = app
            .world()
            .resource::<MessageTagRegistry>()
            .request_tag("Movement.Idle", true);
        let movement = idle.request_direct_parent();

        let mut tags = MessageTags::new();
        tags.add_tag(idle.clone());
        let entity = app.world_mut().spawn(tags).id();

        let stored = app.world().get::<MessageTags>(entity).unwrap();
        assert!(stored.has_tag(&movement));
        assert!(stored.has_tag_exact(&idle));
        assert_eq!(stored.clone().into_inner().len(), 1);
    }
}
