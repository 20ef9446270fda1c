use url::Url;

use super::links::DiscoveredLink;

/// The primary content region of one page, sanitized and ready to be
/// folded into the composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFragment {
    /// URL the fragment was extracted from.
    pub source_url: Url,
    /// Outer HTML of the content region.
    pub html: String,
    pub title: Option<String>,
    /// Depth of the originating tree node; discovered pages sit one below
    /// the page that linked them.
    pub depth: usize,
    pub links: Vec<DiscoveredLink>,
    /// Assigned by the assembler.
    pub anchor: Option<String>,
}

impl ContentFragment {
    /// In-scope links only, in document order.
    pub fn in_scope_links(&self) -> impl Iterator<Item = &DiscoveredLink> {
        self.links.iter().filter(|l| l.in_scope)
    }
}
