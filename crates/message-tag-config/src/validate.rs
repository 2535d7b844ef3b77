//! Tag string validation.
//!
//! A tag string is a dot-separated path such as `Damage.Physical.Slash`.
//! Validation reports the first problem found and, when possible, a fixed
//! version of the string that would pass.

use std::fmt;

use thiserror::Error;

/// Characters rejected in tag strings unless the config overrides them.
pub const DEFAULT_INVALID_CHARACTERS: &str = "\"',";

/// Characters that are always rejected, regardless of configuration.
pub const ALWAYS_INVALID_CHARACTERS: &str = "\r\n\t";

/// What made a tag string invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStringProblem {
    Empty,
    StartsWithPeriod,
    EndsWithPeriod,
    StartsWithSpace,
    EndsWithSpace,
    /// Two dots with nothing in between (`A..B`).
    EmptySegment,
    InvalidCharacter(char),
}

impl fmt::Display for TagStringProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "tag is empty"),
            Self::StartsWithPeriod => write!(f, "tag starts with '.'"),
            Self::EndsWithPeriod => write!(f, "tag ends with '.'"),
            Self::StartsWithSpace => write!(f, "tag starts with space"),
            Self::EndsWithSpace => write!(f, "tag ends with space"),
            Self::EmptySegment => write!(f, "tag contains an empty segment"),
            Self::InvalidCharacter(c) => write!(f, "tag contains invalid character {c:?}"),
        }
    }
}

/// A rejected tag string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tag string '{tag}': {problem}")]
pub struct TagStringError {
    pub tag: String,
    pub problem: TagStringProblem,
    /// Suggested replacement, `None` when nothing usable is left.
    pub fixed: Option<String>,
}

/// Validate a dotted tag string.
///
/// `invalid_characters` is the configured set; [`ALWAYS_INVALID_CHARACTERS`]
/// are checked in addition.
///
/// ```text
/// validate_tag_string("A.B", "\"',")   → Ok(())
/// validate_tag_string(".A.B ", "\"',") → Err(fixed: "A.B")
/// validate_tag_string("A,B", "\"',")   → Err(fixed: "A_B")
/// ```
pub fn validate_tag_string(tag: &str, invalid_characters: &str) -> Result<(), TagStringError> {
    if tag.is_empty() {
        return Err(TagStringError {
            tag: String::new(),
            problem: TagStringProblem::Empty,
            fixed: None,
        });
    }

    let mut problem: Option<TagStringProblem> = None;
    let mut trimmed = tag;

    // Leading and trailing dots/spaces can be interleaved (" .A. "), strip until stable
    loop {
        let before = trimmed.len();
        if let Some(rest) = trimmed.strip_prefix('.') {
            problem.get_or_insert(TagStringProblem::StartsWithPeriod);
            trimmed = rest;
        }
        if let Some(rest) = trimmed.strip_suffix('.') {
            problem.get_or_insert(TagStringProblem::EndsWithPeriod);
            trimmed = rest;
        }
        if let Some(rest) = trimmed.strip_prefix(' ') {
            problem.get_or_insert(TagStringProblem::StartsWithSpace);
            trimmed = rest;
        }
        if let Some(rest) = trimmed.strip_suffix(' ') {
            problem.get_or_insert(TagStringProblem::EndsWithSpace);
            trimmed = rest;
        }
        if trimmed.len() == before {
            break;
        }
    }

    let mut fixed = String::with_capacity(trimmed.len());
    for segment in trimmed.split('.') {
        if segment.is_empty() {
            problem.get_or_insert(TagStringProblem::EmptySegment);
            continue;
        }
        if !fixed.is_empty() {
            fixed.push('.');
        }
        for c in segment.chars() {
            if invalid_characters.contains(c) || ALWAYS_INVALID_CHARACTERS.contains(c) {
                problem.get_or_insert(TagStringProblem::InvalidCharacter(c));
                fixed.push('_');
            } else {
                fixed.push(c);
            }
        }
    }

    match problem {
        None => Ok(()),
        Some(problem) => Err(TagStringError {
            tag: tag.to_string(),
            problem,
            fixed: (!fixed.is_empty()).then_some(fixed),
        }),
    }
}
