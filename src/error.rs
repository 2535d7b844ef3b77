//! Error types.

use message_tag_config::{TagStringError, TagsConfigError};
use thiserror::Error;

/// Registry and construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("empty tag path is not allowed")]
    EmptyPath,
    #[error("tag path has {segments} segments, over the limit of {max}")]
    TooDeep { segments: usize, max: usize },
    #[error(transparent)]
    InvalidTagString(#[from] TagStringError),
    #[error("failed to load tag config: {0}")]
    Config(#[from] TagsConfigError),
}

/// Binary encode/decode errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },
    #[error("tag name is not valid UTF-8")]
    InvalidUtf8,
    #[error("tag name is {0} bytes, over the 65535 byte limit")]
    NameTooLong(usize),
    #[error("container holds {0} tags, over the u32 limit")]
    TooManyTags(usize),
}
