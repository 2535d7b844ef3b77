//! Text form parsing shared by [`Tag`](crate::Tag) and
//! [`TagContainer`](crate::TagContainer).
//!
//! ```text
//! tag:        (TagName="A.B")   "A.B"   A.B
//! container:  (TagName="A.B",TagName="C")
//!             ((TagName="A.B"),(TagName="C"))
//!             (MessageTags=((TagName="A.B")),ParentTags=((TagName="A")))
//! ```

pub(crate) const TAG_NAME_KEY: &str = "TagName";
const EXPLICIT_TAGS_KEY: &str = "MessageTags";
const PARENT_TAGS_KEY: &str = "ParentTags";

/// Extract the dotted name from a single tag item.
pub(crate) fn parse_tag_name(item: &str) -> Option<&str> {
    let item = item.trim();
    let item = strip_parens(item).unwrap_or(item);
    if item.starts_with('"') {
        return unquote(item);
    }
    match item.split_once('=') {
        Some((key, value)) if key.trim() == TAG_NAME_KEY => parse_value(value),
        Some(_) => None,
        None => parse_value(item),
    }
}

/// A quoted value may hold any character but `"`; a bare one stops short of
/// the text form's delimiters.
fn parse_value(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.starts_with('"') {
        unquote(value)
    } else {
        unquote(value).filter(|name| !name.contains(['(', ')', '=']))
    }
}

/// Extract every explicit tag name from a container's text form.
///
/// `None` on malformed input. Stored parent tags are skipped; they are
/// always rederived.
pub(crate) fn parse_container_names(text: &str) -> Option<Vec<&str>> {
    let inner = strip_parens(text)?;
    let mut names = Vec::new();
    for item in split_top_level(inner)? {
        match item.split_once('=') {
            Some((key, value)) if key.trim() == EXPLICIT_TAGS_KEY => {
                names.extend(parse_container_names(value)?);
            }
            Some((key, _)) if key.trim() == PARENT_TAGS_KEY => {}
            _ => names.push(parse_tag_name(item)?),
        }
    }
    Some(names)
}

/// Split on commas that sit outside parentheses and quotes.
fn split_top_level(s: &str) -> Option<Vec<&str>> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => depth = depth.checked_sub(1)?,
            ',' if !in_quotes && depth == 0 => {
                items.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 || in_quotes {
        return None;
    }
    items.push(&s[start..]);

    Some(
        items
            .into_iter()
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect(),
    )
}

fn strip_parens(s: &str) -> Option<&str> {
    s.trim()
        .strip_prefix('(')?
        .strip_suffix(')')
        .map(str::trim)
}

fn unquote(s: &str) -> Option<&str> {
    let s = s.trim();
    match s.strip_prefix('"') {
        Some(rest) => rest.strip_suffix('"').filter(|name| !name.contains('"')),
        None => (!s.contains('"')).then_some(s),
    }
}
