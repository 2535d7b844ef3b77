//! # Hierarchical Message Tags (message-tag)
//!
//! Dotted, hierarchical tags (`Damage.Physical.Slash`) and tag containers with
//! hierarchy-aware matching, inspired by UE GameplayTags.
//!
//! ## Design
//!
//! A [`Tag`] is an interned name handle. Equality and hashing are pointer
//! comparisons; ordering is numeric-suffix aware (`Item.9 < Item.10`).
//!
//! A [`TagContainer`] keeps two lists:
//!
//! ```text
//! explicit tags:  [Damage.Physical.Slash, Color.Red]
//! parent tags:    [Damage.Physical, Damage, Color]     (derived from the explicit tags)
//! ```
//!
//! `has_tag` looks at both lists, `has_tag_exact` only at the explicit one.
//!
//! ## Self-Contained Parents
//!
//! Interning a name also interns its prefixes, and each handle links to its
//! parent handle. Containers derive parent tags without a registry:
//!
//! ```ignore
//! use message_tag::{MessageTagRegistry, TagContainer};
//!
//! let registry = MessageTagRegistry::build(&["Damage.Physical.Slash"])?;
//! let slash = registry.request_tag("Damage.Physical.Slash", true);
//!
//! let container = TagContainer::from_tag(slash);
//! assert!(container.has_tag(&registry.request_tag("Damage", true)));
//! ```

pub mod bevy;
mod codec;
pub mod container;
pub mod error;
pub mod name;
pub mod redirect;
pub mod registry;
pub mod resolver;
pub mod serde_support;
pub mod tag;
mod text;

pub use container::{ContainerMatchType, TagContainer};
pub use error::{CodecError, TagError};
pub use name::{compare_with_numeric_suffix, NameTable, TagName, MAX_NAME_SEGMENTS};
pub use redirect::TagRedirectors;
pub use registry::{MessageTagRegistry, TagNode};
pub use resolver::TagResolver;
pub use serde_support::{TagContainerSeed, TagSeed};
pub use tag::Tag;

pub use message_tag_config::{
    validate_tag_string, TagRedirect, TagStringError, TagStringProblem, TagsConfig,
    TagsConfigError,
};
