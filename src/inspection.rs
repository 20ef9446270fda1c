//! Per-page structure summaries written to `patterns.json`.
//!
//! Used to tune the selector table for a new documentation site: for every
//! extracted page it records the links found and which headings, classes
//! and ids the content region uses.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::crawl_engine::crawl_types::{HarvestError, HarvestResult};
use crate::page_extractor::ContentFragment;
use crate::page_extractor::links::collapse_whitespace;

static HEADING_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3").expect("HEADING_SELECTOR: hardcoded selector is valid")
});
static ANY_ELEMENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("*").expect("ANY_ELEMENT: hardcoded selector is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub text: String,
    pub url: String,
    pub in_scope: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPatterns {
    /// Text of every h1-h3, in document order.
    pub titles: Vec<String>,
    /// Distinct class names, sorted.
    pub classes: Vec<String>,
    /// Distinct ids, sorted.
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePatterns {
    pub section_name: String,
    pub url: String,
    pub anchor: Option<String>,
    pub links: Vec<LinkRecord>,
    pub patterns: ContentPatterns,
}

/// Summarize the structure of a fragment's HTML.
#[must_use]
pub fn content_patterns(html: &str) -> ContentPatterns {
    let fragment = Html::parse_fragment(html);

    let titles = fragment
        .select(&HEADING_SELECTOR)
        .map(|h| collapse_whitespace(&h.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect();

    let mut classes = BTreeSet::new();
    let mut ids = BTreeSet::new();
    for element in fragment.select(&ANY_ELEMENT) {
        classes.extend(element.value().classes().map(str::to_string));
        if let Some(id) = element.value().id() {
            ids.insert(id.to_string());
        }
    }

    ContentPatterns {
        titles,
        classes: classes.into_iter().collect(),
        ids: ids.into_iter().collect(),
    }
}

/// Summary record for one extracted fragment.
#[must_use]
pub fn page_patterns(fragment: &ContentFragment, fallback_name: &str) -> PagePatterns {
    PagePatterns {
        section_name: fragment
            .title
            .clone()
            .unwrap_or_else(|| fallback_name.to_string()),
        url: fragment.source_url.to_string(),
        anchor: fragment.anchor.clone(),
        links: fragment
            .links
            .iter()
            .map(|l| LinkRecord {
                text: l.text.clone(),
                url: l.url.clone(),
                in_scope: l.in_scope,
            })
            .collect(),
        patterns: content_patterns(&fragment.html),
    }
}

pub fn write_patterns(path: &Path, pages: &[PagePatterns]) -> HarvestResult<()> {
    let json = serde_json::to_string_pretty(pages).map_err(|source| HarvestError::Serialize {
        what: "page patterns",
        source,
    })?;
    std::fs::write(path, json).map_err(|source| HarvestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_headings_classes_and_ids() {
        let html = r#"<div class="body conbody" id="main">
            <h2>Install</h2><p class="note">x</p><h3 id="req">Requirements</h3><h4>skip</h4>
            <p class="note tip">y</p></div>"#;
        let patterns = content_patterns(html);
        assert_eq!(patterns.titles, vec!["Install", "Requirements"]);
        assert_eq!(patterns.classes, vec!["body", "conbody", "note", "tip"]);
        assert_eq!(patterns.ids, vec!["main", "req"]);
    }
}
