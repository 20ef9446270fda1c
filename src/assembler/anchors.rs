//! Anchor identifiers for fragments in the composite

use url::Url;

use crate::utils::SYNTHESIZED_ANCHOR_PREFIX;

fn is_anchor_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Anchor for a title: whitespace runs become `_`, every character outside
/// `[A-Za-z0-9_.-]` is dropped. `None` when nothing is left.
#[must_use]
pub fn anchor_from_title(title: &str) -> Option<String> {
    let anchor: String = title
        .split_whitespace()
        .map(|word| word.chars().filter(|c| is_anchor_char(*c)).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    (!anchor.is_empty()).then_some(anchor)
}

/// Anchor for an untitled fragment, from the last query value or the last
/// path segment of its URL.
#[must_use]
pub fn anchor_from_url(url: &Url) -> String {
    let from_query = url
        .query_pairs()
        .filter_map(|(_, value)| anchor_from_title(&value))
        .last();
    let from_path = || {
        url.path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
            .and_then(|segment| {
                let stem = segment.rsplit_once('.').map_or(segment, |(stem, _)| stem);
                anchor_from_title(stem)
            })
    };

    match from_query.or_else(from_path) {
        Some(tail) => format!("{SYNTHESIZED_ANCHOR_PREFIX}{tail}"),
        None => SYNTHESIZED_ANCHOR_PREFIX.trim_end_matches('_').to_string(),
    }
}

/// Anchor for a fragment; never fails.
#[must_use]
pub fn derive_anchor(title: Option<&str>, url: &Url) -> String {
    title
        .and_then(anchor_from_title)
        .unwrap_or_else(|| anchor_from_url(url))
}

/// `base` if unused, otherwise `base_2`, `base_3`, ... until `is_taken`
/// says no.
pub fn disambiguate(base: String, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(&base) {
        return base;
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{base}_{n}");
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
