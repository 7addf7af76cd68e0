//! Fence info string parsing.

use std::collections::BTreeMap;

/// Parse a fence info string into tags and attributes.
///
/// Formats:
/// - `lang [tag ...] [key=value ...]`
/// - `{.lang [.tag ...] [#id] [key=value ...]}`
///
/// Leading dots are stripped from tags, `#id` tokens are ignored and quotes
/// around attribute values are removed.
#[must_use]
pub(crate) fn parse_fence_info(info: &str) -> (Vec<String>, BTreeMap<String, String>) {
    let info = info.trim();
    let info = info
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(info);

    let mut tags = Vec::new();
    let mut attrs = BTreeMap::new();
    for part in info.split_whitespace() {
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim_matches('"').trim_matches('\'');
            attrs.insert(key.to_owned(), value.to_owned());
        } else if part.starts_with('#') {
            continue;
        } else {
            let tag = part.trim_start_matches('.');
            if !tag.is_empty() {
                tags.push(tag.to_owned());
            }
        }
    }

    (tags, attrs)
}
