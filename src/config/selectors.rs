//! Selector tables for the navigation tree and the content pages
//!
//! Every region the harvester looks for is described by a primary CSS
//! selector and an ordered list of fallbacks. The defaults match the
//! collapsible `node-tree` navigation used by large vendor help centers.

use anyhow::{Result, anyhow};
use scraper::Selector;
use serde::{Deserialize, Serialize};

/// A primary selector plus fallbacks, tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSelectors {
    pub primary: String,
    #[serde(default)]
    pub fallbacks: Vec<String>,
}

impl RegionSelectors {
    pub fn new(primary: impl Into<String>, fallbacks: &[&str]) -> Self {
        Self {
            primary: primary.into(),
            fallbacks: fallbacks.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Primary first, then fallbacks in configured order.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }

    /// Human readable list used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        self.candidates().collect::<Vec<_>>().join(", ")
    }
}

/// Selectors for every structural element the harvester touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorTable {
    /// Container that must exist on the root page.
    pub tree_container: String,
    /// Top-level tree items, used when no sub-tree roots are configured.
    pub root_items: String,
    /// Items below a node, queried relative to that node.
    pub child_items: String,
    /// Clickable expand/collapse affordance inside an item.
    pub expand_toggle: String,
    /// Attribute holding the expansion state (`"true"` / `"false"`).
    pub expanded_attribute: String,
    /// Attribute holding the stable node identifier.
    pub identifier_attribute: String,
    /// Title element inside an item.
    pub node_title: RegionSelectors,
    /// Link element inside an item.
    pub node_link: String,
    /// Links under a sub-tree root in link-list mode.
    pub group_links: String,
    /// Primary content panel of a page.
    pub content: RegionSelectors,
    /// Page heading.
    pub page_title: RegionSelectors,
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self {
            tree_container: ".node-tree-container".to_string(),
            root_items: ".node-tree-container > .node-tree > .node-tree-item".to_string(),
            child_items: "ul.node-tree > .node-tree-item".to_string(),
            expand_toggle: ".expand-collapse".to_string(),
            expanded_attribute: "aria-expanded".to_string(),
            identifier_attribute: "data-id".to_string(),
            node_title: RegionSelectors::new("a[role='button']", &["a[href]"]),
            node_link: "a[href]".to_string(),
            group_links: "ul[role='group'] a[href]".to_string(),
            content: RegionSelectors::new(
                ".body.conbody",
                &["[itemprop='articleBody']", "article", "main"],
            ),
            page_title: RegionSelectors::new(".head-text h1[itemprop='headline']", &["h1"]),
        }
    }
}

fn check(selector: &str, field: &str) -> Result<()> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| anyhow!("Invalid CSS selector for {field} '{selector}': {e}"))
}

fn check_region(region: &RegionSelectors, field: &str) -> Result<()> {
    region.candidates().try_for_each(|s| check(s, field))
}

impl SelectorTable {
    /// Parse every selector once so a typo fails at configuration time
    /// instead of silently matching nothing mid-run.
    pub fn validate(&self) -> Result<()> {
        check(&self.tree_container, "tree_container")?;
        check(&self.root_items, "root_items")?;
        check(&self.child_items, "child_items")?;
        check(&self.expand_toggle, "expand_toggle")?;
        check(&self.node_link, "node_link")?;
        check(&self.group_links, "group_links")?;
        check_region(&self.node_title, "node_title")?;
        check_region(&self.content, "content")?;
        check_region(&self.page_title, "page_title")?;

        if self.expanded_attribute.trim().is_empty() {
            return Err(anyhow!("expanded_attribute must not be empty"));
        }
        if self.identifier_attribute.trim().is_empty() {
            return Err(anyhow!("identifier_attribute must not be empty"));
        }
        Ok(())
    }

    /// Selector for the tree item carrying `identifier`.
    #[must_use]
    pub fn item_with_identifier(&self, identifier: &str) -> String {
        let escaped = identifier.replace('\\', "\\\\").replace('"', "\\\"");
        format!("[{}=\"{}\"]", self.identifier_attribute, escaped)
    }
}
