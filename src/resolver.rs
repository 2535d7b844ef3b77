//! The name → tag collaborator.

use crate::tag::Tag;

/// Turns dotted strings into canonical [`Tag`]s.
///
/// The container algorithms never call a resolver; only the construction and
/// import boundaries do ([`Tag::request`], text and binary decoding, serde
/// seeds). [`MessageTagRegistry`](crate::MessageTagRegistry) is the shipped
/// implementation.
pub trait TagResolver {
    /// Resolve a registered name. Unknown names yield [`Tag::EMPTY`].
    fn resolve(&self, name: &str, error_if_not_found: bool) -> Tag;

    /// Replacement for a renamed tag, if one is known.
    fn redirect(&self, _old_name: &str) -> Option<Tag> {
        None
    }

    /// Resolve a name read from external data.
    ///
    /// `""` and `"None"` are the empty tag. Redirects are applied before
    /// resolution.
    fn import(&self, name: &str) -> Tag {
        let name = name.trim();
        if name.is_empty() || name == "None" {
            return Tag::EMPTY;
        }
        match self.redirect(name) {
            Some(tag) => tag,
            None => self.resolve(name, false),
        }
    }
}

impl<R: TagResolver + ?Sized> TagResolver for &R {
    fn resolve(&self, name: &str, error_if_not_found: bool) -> Tag {
        (**self).resolve(name, error_if_not_found)
    }

    fn redirect(&self, old_name: &str) -> Option<Tag> {
        (**self).redirect(old_name)
    }

    fn import(&self, name: &str) -> Tag {
        (**self).import(name)
    }
}
