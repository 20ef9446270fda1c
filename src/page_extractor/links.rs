//! Link discovery inside an extracted fragment

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::{is_in_scope, normalize_url, resolve_href};

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("ANCHOR_SELECTOR: hardcoded selector is valid"));

/// A link found in a fragment, resolved and classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredLink {
    /// Display text, whitespace collapsed.
    pub text: String,
    /// Absolute URL.
    pub url: String,
    /// Under the base URL prefix; only these are eligible for traversal.
    pub in_scope: bool,
}

/// Collapse runs of whitespace to single spaces and trim.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Every `a[href]` of `fragment_html`, resolved against `page_url`, in
/// document order and without repeated targets.
#[must_use]
pub fn discover_links(fragment_html: &str, page_url: &Url, base: &Url) -> Vec<DiscoveredLink> {
    let fragment = Html::parse_fragment(fragment_html);
    let mut seen = HashSet::new();

    fragment
        .select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let url = resolve_href(page_url, href)?;
            if !seen.insert(normalize_url(url.as_str())) {
                return None;
            }
            Some(DiscoveredLink {
                text: collapse_whitespace(&anchor.text().collect::<String>()),
                in_scope: is_in_scope(&url, base),
                url: url.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_and_dedups_links() {
        let base = Url::parse("https://help.example.com/view/DOC/2024/ENU/").unwrap();
        let page = Url::parse("https://help.example.com/view/DOC/2024/ENU/?guid=OV").unwrap();
        let html = r##"<div>
            <a href="?guid=IN">Install
               now</a>
            <a href="?guid=IN#step2">Install again</a>
            <a href="https://www.example.com/store">Store</a>
            <a href="#local">Local</a>
            <a href="mailto:docs@example.com">Mail</a>
        </div>"##;

        let links = discover_links(html, &page, &base);
        assert_eq!(
            links,
            vec![
                DiscoveredLink {
                    text: "Install now".to_string(),
                    url: "https://help.example.com/view/DOC/2024/ENU/?guid=IN".to_string(),
                    in_scope: true,
                },
                DiscoveredLink {
                    text: "Store".to_string(),
                    url: "https://www.example.com/store".to_string(),
                    in_scope: false,
                },
            ]
        );
    }
}
