//! Configuration utilities for message-tag.
//!
//! This crate provides:
//! - Parsing `tags.toml` tag source files
//! - Tag string validation shared by the config loader and the runtime registry
//! - Redirect records used to upgrade renamed tags on import
//!
//! # Usage
//!
//! ```ignore
//! let config = message_tag_config::TagsConfig::from_file("tags.toml")?;
//! for entry in config.entries() {
//!     println!("{} (depth {})", entry.path, entry.depth);
//! }
//! ```
//!
//! # File Format
//!
//! ```toml
//! invalid_characters = "\"',"
//! warn_on_invalid_tags = true
//! clear_invalid_tags = false
//!
//! [tags]
//! paths = ["Damage.Physical.Slash", "Color.Red"]
//!
//! [[redirects]]
//! old = "Damage.Slash"
//! new = "Damage.Physical.Slash"
//! ```

mod toml_parser;
mod validate;

pub use toml_parser::{TagEntry, TagRedirect, TagsConfig, TagsConfigError};
pub use validate::{
    validate_tag_string, TagStringError, TagStringProblem, ALWAYS_INVALID_CHARACTERS,
    DEFAULT_INVALID_CHARACTERS,
};
