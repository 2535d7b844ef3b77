//! TOML configuration parser for tags.toml.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

use crate::validate::{validate_tag_string, ALWAYS_INVALID_CHARACTERS, DEFAULT_INVALID_CHARACTERS};

/// Parsed tags configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TagsConfig {
    /// Characters rejected in tag strings (always includes `\r\n\t`)
    pub invalid_characters: String,
    /// Log a warning when an unknown tag is met while importing
    pub warn_on_invalid_tags: bool,
    /// Drop unknown tags on import instead of keeping them verbatim
    pub clear_invalid_tags: bool,
    /// Old name → new name redirects, in file order
    pub redirects: Vec<TagRedirect>,
    /// All tag entries (including auto-generated parents)
    entries: Vec<TagEntry>,
}

/// A single tag entry with computed properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Full dot-separated path (e.g., "Damage.Physical.Slash")
    pub path: String,
    /// Tree depth (0 = root)
    pub depth: u8,
    /// Parent path (None for root nodes)
    pub parent: Option<String>,
    /// True if the path was listed in the file, false if it was only implied by a child
    pub is_explicit: bool,
}

/// Redirects a renamed tag to its replacement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagRedirect {
    #[serde(rename = "old")]
    pub old_tag_name: String,
    #[serde(rename = "new")]
    pub new_tag_name: String,
}

impl TagRedirect {
    pub fn new(old_tag_name: impl Into<String>, new_tag_name: impl Into<String>) -> Self {
        Self {
            old_tag_name: old_tag_name.into(),
            new_tag_name: new_tag_name.into(),
        }
    }
}

/// Raw TOML structure.
#[derive(Debug, Deserialize)]
struct RawTagsConfig {
    /// Optional invalid character set (defaults to `"',`)
    invalid_characters: Option<String>,
    warn_on_invalid_tags: Option<bool>,
    clear_invalid_tags: Option<bool>,
    /// Tag definitions
    #[serde(default)]
    tags: RawTags,
    #[serde(default)]
    redirects: Vec<TagRedirect>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTags {
    /// List of dot-separated paths
    #[serde(default)]
    paths: Vec<String>,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            invalid_characters: format!("{DEFAULT_INVALID_CHARACTERS}{ALWAYS_INVALID_CHARACTERS}"),
            warn_on_invalid_tags: true,
            clear_invalid_tags: false,
            redirects: Vec::new(),
            entries: Vec::new(),
        }
    }
}

impl TagsConfig {
    /// Parse from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TagsConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            TagsConfigError::Io(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_str(&content)
    }

    /// Parse from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, TagsConfigError> {
        let raw: RawTagsConfig =
            toml::from_str(content).map_err(|e| TagsConfigError::Parse(e.to_string()))?;

        let mut invalid_characters = raw
            .invalid_characters
            .unwrap_or_else(|| DEFAULT_INVALID_CHARACTERS.to_string());
        for c in ALWAYS_INVALID_CHARACTERS.chars() {
            if !invalid_characters.contains(c) {
                invalid_characters.push(c);
            }
        }

        // Validate and expand paths
        let entries = Self::expand_paths(&raw.tags.paths, &invalid_characters)?;

        for redirect in &raw.redirects {
            if redirect.old_tag_name.is_empty() {
                return Err(TagsConfigError::Validation(
                    "Redirect with empty 'old' name".into(),
                ));
            }
            // An empty target removes the old tag on import
            if redirect.new_tag_name.is_empty() {
                continue;
            }
            validate_tag_string(&redirect.new_tag_name, &invalid_characters).map_err(|e| {
                TagsConfigError::Validation(format!(
                    "Invalid redirect target for '{}': {}",
                    redirect.old_tag_name, e
                ))
            })?;
        }

        Ok(Self {
            invalid_characters,
            warn_on_invalid_tags: raw.warn_on_invalid_tags.unwrap_or(true),
            clear_invalid_tags: raw.clear_invalid_tags.unwrap_or(false),
            redirects: raw.redirects,
            entries,
        })
    }

    /// Build a config from in-memory paths with default settings.
    pub fn from_paths<S: AsRef<str>>(paths: &[S]) -> Result<Self, TagsConfigError> {
        let mut config = Self::default();
        let paths: Vec<String> = paths.iter().map(|p| p.as_ref().to_string()).collect();
        config.entries = Self::expand_paths(&paths, &config.invalid_characters)?;
        Ok(config)
    }

    /// Get all entries.
    pub fn entries(&self) -> impl Iterator<Item = &TagEntry> {
        self.entries.iter()
    }

    /// Only the entries listed in the file.
    pub fn explicit_paths(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.is_explicit)
            .map(|e| e.path.as_str())
    }

    /// Get entry count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand paths to include all parent nodes.
    ///
    /// e.g., "A.B.C" expands to ["A", "A.B", "A.B.C"]
    fn expand_paths(
        paths: &[String],
        invalid_characters: &str,
    ) -> Result<Vec<TagEntry>, TagsConfigError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut explicit: HashSet<&str> = HashSet::new();
        let mut entries: Vec<TagEntry> = Vec::new();

        for path in paths {
            validate_tag_string(path, invalid_characters)
                .map_err(|e| TagsConfigError::Validation(e.to_string()))?;
            explicit.insert(path.as_str());

            let segments: Vec<&str> = path.split('.').collect();

            // Add all ancestors and the path itself
            for depth in 0..segments.len() {
                let ancestor_path = segments[..=depth].join(".");
                if seen.insert(ancestor_path.clone()) {
                    let parent = if depth == 0 {
                        None
                    } else {
                        Some(segments[..depth].join("."))
                    };
                    entries.push(TagEntry {
                        path: ancestor_path,
                        depth: u8::try_from(depth).unwrap_or(u8::MAX),
                        parent,
                        is_explicit: false,
                    });
                }
            }
        }

        for entry in &mut entries {
            entry.is_explicit = explicit.contains(entry.path.as_str());
        }

        // Sort by path for deterministic output
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(entries)
    }
}

/// Errors during config parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagsConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_config() {
        let toml = r#"
[tags]
paths = [
    "Damage.Physical.Slash",
    "Damage.Physical.Blunt",
    "Color.Red",
]
"#;
        let config = TagsConfig::from_str(toml).unwrap();

        // Damage, Damage.Physical, Damage.Physical.Slash, Damage.Physical.Blunt, Color, Color.Red
        assert_eq!(config.len(), 6);

        let paths: Vec<_> = config.entries().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"Damage"));
        assert!(paths.contains(&"Damage.Physical"));
        assert!(paths.contains(&"Damage.Physical.Slash"));
        assert!(paths.contains(&"Color"));
        assert!(paths.contains(&"Color.Red"));

        let explicit: Vec<_> = config.explicit_paths().collect();
        assert_eq!(
            explicit,
            vec!["Color.Red", "Damage.Physical.Blunt", "Damage.Physical.Slash"]
        );
    }

    #[test]
    fn defaults_when_settings_missing() {
        let config = TagsConfig::from_str("[tags]\npaths = [\"A\"]\n").unwrap();
        assert!(config.warn_on_invalid_tags);
        assert!(!config.clear_invalid_tags);
        assert!(config.redirects.is_empty());
        assert!(config.invalid_characters.starts_with(DEFAULT_INVALID_CHARACTERS));
        assert!(config.invalid_characters.contains('\t'));
    }

    #[test]
    fn empty_file_is_valid() {
        let config = TagsConfig::from_str("").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn expand_creates_parents() {
        let toml = r#"
[tags]
paths = ["A.B.C.D"]
"#;
        let config = TagsConfig::from_str(toml).unwrap();

        let entries: Vec<_> = config.entries().collect();
        assert_eq!(entries.len(), 4);

        assert_eq!(entries[0].path, "A");
        assert_eq!(entries[0].depth, 0);
        assert_eq!(entries[0].parent, None);
        assert!(!entries[0].is_explicit);

        assert_eq!(entries[2].path, "A.B.C");
        assert_eq!(entries[2].depth, 2);
        assert_eq!(entries[2].parent, Some("A.B".into()));

        assert_eq!(entries[3].path, "A.B.C.D");
        assert_eq!(entries[3].depth, 3);
        assert_eq!(entries[3].parent, Some("A.B.C".into()));
        assert!(entries[3].is_explicit);
    }

    #[test]
    fn deduplicates_parents() {
        let toml = r#"
[tags]
paths = ["A.B.C", "A.B.D", "A.X"]
"#;
        let config = TagsConfig::from_str(toml).unwrap();

        // A, A.B, A.B.C, A.B.D, A.X = 5 entries (A and A.B not duplicated)
        assert_eq!(config.len(), 5);
    }

    #[test]
    fn rejects_invalid_path() {
        let cases = [
            "",     // empty
            ".A",   // starts with dot
            "A.",   // ends with dot
            "A..B", // double dot
            "A,B",  // invalid character
            " A",   // leading space
        ];

        for case in cases {
            let toml = format!(
                r#"
[tags]
paths = ["{}"]
"#,
                case
            );
            assert!(
                TagsConfig::from_str(&toml).is_err(),
                "Should reject: {:?}",
                case
            );
        }
    }

    #[test]
    fn custom_invalid_characters() {
        let toml = r##"
invalid_characters = "#"

[tags]
paths = ["A,B"]
"##;
        assert!(TagsConfig::from_str(toml).is_ok());

        let toml = r##"
invalid_characters = "#"

[tags]
paths = ["A#B"]
"##;
        assert!(TagsConfig::from_str(toml).is_err());
    }

    #[test]
    fn parses_redirects() {
        let toml = r#"
clear_invalid_tags = true

[tags]
paths = ["Damage.Physical.Slash"]

[[redirects]]
old = "Damage.Slash"
new = "Damage.Physical.Slash"
"#;
        let config = TagsConfig::from_str(toml).unwrap();
        assert!(config.clear_invalid_tags);
        assert_eq!(
            config.redirects,
            vec![TagRedirect::new("Damage.Slash", "Damage.Physical.Slash")]
        );
    }

    #[test]
    fn rejects_invalid_redirect_target() {
        let toml = r#"
[[redirects]]
old = "A"
new = "B."
"#;
        let err = TagsConfig::from_str(toml).unwrap_err();
        assert!(err.to_string().contains("redirect target"));
    }

    #[test]
    fn empty_redirect_target_is_allowed() {
        let toml = r#"
[[redirects]]
old = "Legacy.Tag"
new = ""
"#;
        let config = TagsConfig::from_str(toml).unwrap();
        assert_eq!(config.redirects, vec![TagRedirect::new("Legacy.Tag", "")]);
    }

    #[test]
    fn from_paths_uses_defaults() {
        let config = TagsConfig::from_paths(&["X.Y", "Z"]).unwrap();
        assert_eq!(config.len(), 3);
        assert!(config.warn_on_invalid_tags);
    }
}
