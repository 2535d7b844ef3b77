//! Renamed-tag redirects.

use std::collections::HashMap;

use message_tag_config::TagRedirect;
use tracing::warn;

use crate::name::NameTable;
use crate::tag::Tag;

/// Longest redirect chain followed when flattening.
const MAX_REDIRECT_HOPS: usize = 10;

/// Old name → replacement tag.
///
/// Chains (`A → B`, `B → C`) are flattened when added, so a lookup is always
/// a single hop. A redirect to `""` maps to the empty tag, which removes the
/// old name on import.
#[derive(Debug, Default, Clone)]
pub struct TagRedirectors {
    redirects: HashMap<String, Tag>,
}

impl TagRedirectors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch, following each target through the rest of the batch.
    pub fn add_redirects(&mut self, redirects: &[TagRedirect], names: &NameTable) {
        for redirect in redirects {
            let old = redirect.old_tag_name.as_str();
            let mut target = redirect.new_tag_name.as_str();

            if old == target {
                warn!(tag = old, "ignoring redirect to itself");
                continue;
            }

            let mut hops = 0;
            while let Some(next) = redirects
                .iter()
                .find(|candidate| candidate.old_tag_name == target)
            {
                hops += 1;
                if hops > MAX_REDIRECT_HOPS {
                    warn!(
                        tag = old,
                        "redirect chain is longer than {MAX_REDIRECT_HOPS} hops or loops; stopping at '{target}'"
                    );
                    break;
                }
                target = next.new_tag_name.as_str();
            }

            let tag = names.intern(target).map(Tag::from_name).unwrap_or_default();
            match self.redirects.get(old) {
                Some(existing) if *existing != tag => {
                    warn!(
                        tag = old,
                        "conflicting redirects: keeping '{existing}', ignoring '{tag}'"
                    );
                }
                Some(_) => {}
                None => {
                    self.redirects.insert(old.to_string(), tag);
                }
            }
        }
    }

    pub fn get(&self, old_name: &str) -> Option<&Tag> {
        self.redirects.get(old_name)
    }

    pub fn len(&self) -> usize {
        self.redirects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.redirects.is_empty()
    }

    pub fn clear(&mut self) {
        self.redirects.clear();
    }
}
