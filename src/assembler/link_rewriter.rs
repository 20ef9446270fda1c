//! Link classification and the single rewrite pass over a fragment.
//!
//! Runs on a DOM (kuchiki) rather than a stream because the display text of
//! an anchor is only known after its children are parsed.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;
use log::trace;
use url::Url;

use super::anchors::disambiguate;
use crate::page_extractor::links::collapse_whitespace;
use crate::utils::{is_in_scope, is_special_href, normalize_url};

/// Where a link points after assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// `#anchor` of an assembled fragment.
    Local(String),
    /// Absolute URL on the live site.
    Absolute(String),
    Unchanged,
}

/// Lookup tables built from every assembled fragment.
#[derive(Debug, Default)]
pub struct AnchorIndex {
    /// Normalized source URL → anchor.
    by_url: HashMap<String, String>,
    /// Title → anchors of every fragment carrying it.
    by_title: HashMap<String, Vec<String>>,
}

impl AnchorIndex {
    pub fn insert(&mut self, source_url: &Url, title: Option<&str>, anchor: &str) {
        self.by_url
            .entry(normalize_url(source_url.as_str()))
            .or_insert_with(|| anchor.to_string());
        if let Some(title) = title.map(collapse_whitespace).filter(|t| !t.is_empty()) {
            self.by_title.entry(title).or_default().push(anchor.to_string());
        }
    }

    #[must_use]
    pub fn anchor_for_url(&self, url: &Url) -> Option<&str> {
        self.by_url.get(&normalize_url(url.as_str())).map(String::as_str)
    }

    /// Anchor of the only fragment titled `text`; `None` when the title is
    /// unknown or shared.
    #[must_use]
    pub fn anchor_for_unique_title(&self, text: &str) -> Option<&str> {
        match self.by_title.get(&collapse_whitespace(text))?.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

/// Decide what `href` (found on `source_url`, displayed as `text`) becomes.
///
/// 1. A target that was assembled becomes `#anchor`. The URL decides; the
///    display text is consulted only when it names exactly one fragment.
/// 2. An in-scope `?query` reference becomes absolute against `base`.
/// 3. Anything else is left alone.
#[must_use]
pub fn classify_link(
    index: &AnchorIndex,
    href: &str,
    text: &str,
    source_url: &Url,
    base: &Url,
) -> LinkTarget {
    let href = href.trim();
    // In-page fragments keep pointing inside their own fragment
    if href.is_empty() || href.starts_with('#') || is_special_href(href) {
        return LinkTarget::Unchanged;
    }

    if let Ok(resolved) = source_url.join(href)
        && let Some(anchor) = index.anchor_for_url(&resolved)
    {
        return LinkTarget::Local(anchor.to_string());
    }

    if let Some(anchor) = index.anchor_for_unique_title(text) {
        return LinkTarget::Local(anchor.to_string());
    }

    if href.starts_with('?')
        && let Ok(absolute) = base.join(href)
        && is_in_scope(&absolute, base)
    {
        return LinkTarget::Absolute(absolute.to_string());
    }

    LinkTarget::Unchanged
}

/// Elements that may hold the title heading as their first child.
const HEADING_CONTAINERS: &[&str] = &[
    "div", "article", "main", "section", "aside", "header", "body", "blockquote", "figure", "li",
    "dd", "td",
];

/// How a fragment is placed in the composite: its anchor and the heading
/// shown above its content.
#[derive(Debug, Clone, Copy)]
pub struct FragmentPlacement<'a> {
    pub anchor: &'a str,
    pub title: Option<&'a str>,
    /// Heading level, clamped to `h1`..`h6`.
    pub level: usize,
}

impl FragmentPlacement<'_> {
    fn heading_html(&self) -> Option<String> {
        let level = self.level.clamp(1, 6);
        self.title.map(|title| {
            format!(
                "<h{level} class=\"docweave-title\">{}</h{level}>",
                html_escape::encode_text(title)
            )
        })
    }

    /// `inner` wrapped in an anchored `div` headed by the title. Used for
    /// text-only fragments and when the rewrite pass fails.
    #[must_use]
    pub fn wrap(&self, inner: &str) -> String {
        format!(
            "<div id=\"{}\">{}{inner}</div>",
            html_escape::encode_double_quoted_attribute(self.anchor),
            self.heading_html().unwrap_or_default()
        )
    }
}

/// Parse `markup` and detach the first node matching `selector`.
fn parse_detached(markup: &str, selector: &str) -> Result<NodeRef> {
    let document = kuchiki::parse_html().one(markup);
    let node = document
        .select_first(selector)
        .map_err(|()| anyhow::anyhow!("No {selector} in generated markup"))?
        .as_node()
        .clone();
    node.detach();
    Ok(node)
}

/// Give the fragment's root element the anchor as its id, head it with the
/// title, make inner ids unique across the composite and rewrite every link
/// according to [`classify_link`].
///
/// `taken_ids` holds every anchor plus the ids kept by earlier fragments.
/// An inner id found there is renamed to `<anchor>_<id>` and the
/// fragment's own `#id` links follow it. A pre-existing root id is kept as
/// `data-source-id`; `#` links to it now target the anchor.
pub fn rewrite_fragment(
    html: &str,
    placement: &FragmentPlacement<'_>,
    index: &AnchorIndex,
    taken_ids: &mut HashSet<String>,
    source_url: &Url,
    base: &Url,
) -> Result<String> {
    let anchor = placement.anchor;
    let document = kuchiki::parse_html().one(html);
    let body = document
        .select_first("body")
        .map_err(|()| anyhow::anyhow!("Fragment has no body after parsing"))?;

    let first = body
        .as_node()
        .children()
        .find(|child| child.as_element().is_some());
    let Some(first) = first else {
        // Text-only fragment: wrap it so the anchor has a target
        return Ok(placement.wrap(html));
    };

    let holds_heading = first
        .as_element()
        .is_some_and(|e| HEADING_CONTAINERS.contains(&&*e.name.local));
    let root = if placement.title.is_none() || holds_heading {
        first
    } else {
        let wrapper = parse_detached("<div></div>", "div")?;
        first.insert_before(wrapper.clone());
        wrapper.append(first);
        wrapper
    };

    // Inner id → id it was renamed to
    let mut renamed: HashMap<String, String> = HashMap::new();

    if let Some(element) = root.as_element() {
        let mut attrs = element.attributes.borrow_mut();
        if let Some(previous) = attrs.get("id").map(str::to_string)
            && previous != anchor
        {
            attrs.insert("data-source-id", previous.clone());
            renamed.insert(previous, anchor.to_string());
        }
        attrs.insert("id", anchor.to_string());
    }

    if let Some(heading) = placement.heading_html() {
        root.prepend(parse_detached(&heading, "h1, h2, h3, h4, h5, h6")?);
    }

    let with_ids: Vec<_> = document
        .select("[id]")
        .map_err(|()| anyhow::anyhow!("Invalid id selector"))?
        .filter(|element| element.as_node() != &root)
        .collect();
    let mut kept_here: HashSet<String> = HashSet::new();
    for element in with_ids {
        let mut attrs = element.attributes.borrow_mut();
        let Some(id) = attrs.get("id").map(str::to_string) else {
            continue;
        };
        if id.is_empty() {
            continue;
        }
        if taken_ids.contains(&id) {
            let fresh = disambiguate(format!("{anchor}_{id}"), |c| taken_ids.contains(c));
            trace!("Renaming id {id} -> {fresh} in #{anchor}");
            taken_ids.insert(fresh.clone());
            attrs.insert("id", fresh.clone());
            // A repeat inside this fragment keeps links on the first one
            if !kept_here.contains(&id) {
                renamed.entry(id).or_insert(fresh);
            }
        } else {
            taken_ids.insert(id.clone());
            kept_here.insert(id);
        }
    }

    // Collect first: attributes are mutated while walking
    let links: Vec<_> = document
        .select("a[href]")
        .map_err(|()| anyhow::anyhow!("Invalid anchor selector"))?
        .collect();

    for link in links {
        let href = {
            let attrs = link.attributes.borrow();
            attrs.get("href").map(str::to_string)
        };
        let Some(href) = href else { continue };

        if let Some(id) = href.trim().strip_prefix('#')
            && let Some(new_id) = renamed.get(id)
        {
            link.attributes
                .borrow_mut()
                .insert("href", format!("#{new_id}"));
            continue;
        }

        let text = link.as_node().text_contents();
        match classify_link(index, &href, &text, source_url, base) {
            LinkTarget::Local(target) => {
                trace!("{href} -> #{target}");
                link.attributes
                    .borrow_mut()
                    .insert("href", format!("#{target}"));
            }
            LinkTarget::Absolute(url) => {
                trace!("{href} -> {url}");
                link.attributes.borrow_mut().insert("href", url);
            }
            LinkTarget::Unchanged => {}
        }
    }

    let mut output = Vec::new();
    for child in body.as_node().children() {
        child
            .serialize(&mut output)
            .context("Failed to serialize rewritten fragment")?;
    }
    String::from_utf8(output).context("Failed to convert fragment bytes to UTF-8 string")
}
