//! Navigation tree walker
//!
//! Walks the collapsible navigation tree of the root page depth-first,
//! expanding collapsed nodes on demand, and yields the leaves in source
//! order. The walk keeps an explicit work stack; deep trees never grow the
//! call stack.
//!
//! Children of a collapsed node only exist in the DOM once the node has been
//! expanded, so the walk is lazy: a node is expanded when it is popped, not
//! when its parent is.

use std::collections::{HashSet, VecDeque};

use futures::stream::{self, LocalBoxStream, StreamExt};
use log::{debug, warn};
use url::Url;

use crate::browsing::{BrowseError, BrowsingSession, with_page_timeout};
use crate::config::HarvestConfig;
use crate::crawl_engine::crawl_types::{FailureKind, HarvestError, HarvestResult, ItemFailure};
use crate::crawl_engine::progress::ProgressReporter;
use crate::utils::{UNKNOWN_TITLE, resolve_href};

/// A content page reached from the navigation tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafRef {
    pub title: String,
    /// Stable key of the tree node, when the tree provides one.
    pub identifier: Option<String>,
    pub url: Url,
    /// 0 for sub-tree roots.
    pub depth: usize,
}

/// What the walk produces, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavItem {
    Leaf(LeafRef),
    /// A node that could not be expanded; it was treated as a leaf.
    Failure(ItemFailure),
}

impl NavItem {
    #[must_use]
    pub fn as_leaf(&self) -> Option<&LeafRef> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Failure(_) => None,
        }
    }
}

struct Pending<N> {
    node: N,
    depth: usize,
}

/// Reads tree structure through a browsing session.
pub struct TreeNavigator<'a, S: BrowsingSession, P: ProgressReporter> {
    session: &'a S,
    config: &'a HarvestConfig,
    base: Url,
    progress: &'a P,
}

impl<'a, S, P> TreeNavigator<'a, S, P>
where
    S: BrowsingSession,
    S::Node: 'a,
    P: ProgressReporter,
{
    pub fn new(session: &'a S, config: &'a HarvestConfig, base: Url, progress: &'a P) -> Self {
        Self {
            session,
            config,
            base,
            progress,
        }
    }

    /// Find the nodes the walk starts from.
    ///
    /// With configured sub-tree roots, each identifier is looked up and
    /// missing ones are logged; with none, every top-level item is a root.
    /// Fails when the tree container is absent or no root is found at all.
    pub async fn locate_roots(&self) -> HarvestResult<Vec<S::Node>> {
        let selectors = self.config.selectors();
        let unreachable = |reason: String| HarvestError::RootUnreachable {
            url: self.base.to_string(),
            reason,
        };

        let containers = self
            .session
            .query_all(&selectors.tree_container)
            .await
            .map_err(|e| unreachable(format!("{e:#}")))?;
        if containers.is_empty() {
            return Err(unreachable(format!(
                "navigation tree '{}' not found",
                selectors.tree_container
            )));
        }

        let wanted = self.config.subtree_roots();
        if wanted.is_empty() {
            let roots = self
                .session
                .query_all(&selectors.root_items)
                .await
                .map_err(|e| unreachable(format!("{e:#}")))?;
            if roots.is_empty() {
                return Err(unreachable(format!(
                    "navigation tree has no items matching '{}'",
                    selectors.root_items
                )));
            }
            return Ok(roots);
        }

        let mut roots = Vec::with_capacity(wanted.len());
        for identifier in wanted {
            let found = self
                .session
                .query_all(&selectors.item_with_identifier(identifier))
                .await
                .map_err(|e| unreachable(format!("{e:#}")))?;
            match found.into_iter().next() {
                Some(node) => roots.push(node),
                None => warn!("Sub-tree root '{identifier}' not found in navigation tree"),
            }
        }

        if roots.is_empty() {
            return Err(HarvestError::SubtreeRootsNotFound(wanted.to_vec()));
        }
        Ok(roots)
    }

    /// Depth-first, pre-order walk from a single node.
    pub fn explore(self, node: S::Node, depth: usize) -> LocalBoxStream<'a, NavItem> {
        self.walk(vec![Pending { node, depth }])
    }

    /// Walk several roots in order, each at depth 0.
    pub fn explore_roots(self, roots: Vec<S::Node>) -> LocalBoxStream<'a, NavItem> {
        self.walk(
            roots
                .into_iter()
                .map(|node| Pending { node, depth: 0 })
                .collect(),
        )
    }

    fn walk(self, roots: Vec<Pending<S::Node>>) -> LocalBoxStream<'a, NavItem> {
        let mut stack = roots;
        stack.reverse();

        let walk = TreeWalk {
            nav: self,
            stack,
            seen_identifiers: HashSet::new(),
            seen_urls: HashSet::new(),
            pending: VecDeque::new(),
        };

        stream::unfold(walk, |mut walk| async move {
            let item = walk.next_item().await?;
            Some((item, walk))
        })
        .boxed_local()
    }

    /// Flat variant: expand each root once and take every link of its group.
    pub async fn link_list(&self, roots: Vec<S::Node>) -> Vec<NavItem> {
        let selectors = self.config.selectors();
        let mut items = Vec::new();
        let mut seen_urls = HashSet::new();

        for root in roots {
            let identifier = self.identifier(&root).await;
            let title = self.title(&root).await;
            self.progress.report_section(&title, identifier.as_deref(), 0);

            if let Err(reason) = self.ensure_expanded(&root).await {
                let target = identifier.clone().unwrap_or_else(|| title.clone());
                warn!("Could not expand sub-tree root '{target}': {reason}");
                items.push(NavItem::Failure(ItemFailure::new(
                    FailureKind::ExpansionFailed,
                    target,
                    reason,
                )));
            }

            let links = match self.session.query_within(&root, &selectors.group_links).await {
                Ok(links) => links,
                Err(e) => {
                    warn!("Failed to list links under '{title}': {e:#}");
                    continue;
                }
            };

            for link in links {
                let text = self.text_of(&link).await;
                let text = text.unwrap_or_else(|| UNKNOWN_TITLE.to_string());
                if self.config.is_title_excluded(&text) {
                    self.progress.report_excluded(&text, 1);
                    continue;
                }

                let href = self.session.attribute(&link, "href").await.ok().flatten();
                let Some(url) = href.as_deref().and_then(|h| resolve_href(&self.base, h)) else {
                    debug!("Link '{text}' has no usable href, skipping");
                    continue;
                };
                if !seen_urls.insert(url.to_string()) {
                    continue;
                }

                let leaf = LeafRef {
                    title: text,
                    identifier: None,
                    url,
                    depth: 1,
                };
                self.progress.report_leaf(&leaf);
                items.push(NavItem::Leaf(leaf));
            }
        }

        items
    }

    async fn identifier(&self, node: &S::Node) -> Option<String> {
        self.session
            .attribute(node, &self.config.selectors().identifier_attribute)
            .await
            .ok()
            .flatten()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }

    async fn text_of(&self, node: &S::Node) -> Option<String> {
        self.session
            .inner_text(node)
            .await
            .ok()
            .flatten()
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|t| !t.is_empty())
    }

    /// First title candidate that yields text. Candidates are queried
    /// within the node, so the node's own title precedes its children's.
    async fn title(&self, node: &S::Node) -> String {
        for selector in self.config.selectors().node_title.candidates() {
            let Ok(found) = self.session.query_within(node, selector).await else {
                continue;
            };
            if let Some(first) = found.first()
                && let Some(text) = self.text_of(first).await
            {
                return text;
            }
        }
        UNKNOWN_TITLE.to_string()
    }

    async fn href(&self, node: &S::Node) -> Option<String> {
        let links = self
            .session
            .query_within(node, &self.config.selectors().node_link)
            .await
            .ok()?;
        let first = links.first()?;
        self.session.attribute(first, "href").await.ok().flatten()
    }

    async fn is_collapsed(&self, node: &S::Node) -> bool {
        let state = self
            .session
            .attribute(node, &self.config.selectors().expanded_attribute)
            .await
            .ok()
            .flatten();
        state.as_deref().map(str::trim) == Some("false")
    }

    /// Expand `node` if it is collapsed. `Err` carries the reason the node
    /// could not be expanded.
    async fn ensure_expanded(&self, node: &S::Node) -> Result<(), String> {
        if !self.is_collapsed(node).await {
            return Ok(());
        }

        let selectors = self.config.selectors();
        let toggles = self
            .session
            .query_within(node, &selectors.expand_toggle)
            .await
            .map_err(|e| format!("{e:#}"))?;
        let Some(toggle) = toggles.first() else {
            // Nothing to click; whatever children are present will be used
            return Ok(());
        };

        let timeout = self.config.timeouts().expand;
        with_page_timeout(
            async {
                self.session.click(toggle).await?;
                self.session.wait_stable(timeout).await?;
                Ok::<(), BrowseError>(())
            },
            timeout,
            "expand",
        )
        .await
        .map_err(|e| e.to_string())?;

        if self.is_collapsed(node).await {
            return Err("node still collapsed after clicking its toggle".to_string());
        }
        Ok(())
    }
}

struct TreeWalk<'a, S: BrowsingSession, P: ProgressReporter> {
    nav: TreeNavigator<'a, S, P>,
    stack: Vec<Pending<S::Node>>,
    seen_identifiers: HashSet<String>,
    seen_urls: HashSet<String>,
    /// Items produced by the last step but not yet handed out.
    pending: VecDeque<NavItem>,
}

impl<'a, S, P> TreeWalk<'a, S, P>
where
    S: BrowsingSession,
    S::Node: 'a,
    P: ProgressReporter,
{
    async fn next_item(&mut self) -> Option<NavItem> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }
            let Pending { node, depth } = self.stack.pop()?;
            self.visit(node, depth).await;
        }
    }

    /// Process one node: either queue it as a leaf or push its children.
    async fn visit(&mut self, node: S::Node, depth: usize) {
        let nav = &self.nav;
        let identifier = nav.identifier(&node).await;

        // Child queries match descendants too, so a node can be reached twice
        if let Some(id) = &identifier
            && !self.seen_identifiers.insert(id.clone())
        {
            return;
        }

        let title = nav.title(&node).await;
        if nav.config.is_title_excluded(&title) {
            debug!("Skipping '{title}' and its sub-tree (excluded title)");
            nav.progress.report_excluded(&title, depth);
            return;
        }

        let mut children = Vec::new();
        match nav.ensure_expanded(&node).await {
            Ok(()) => {
                match nav
                    .session
                    .query_within(&node, &nav.config.selectors().child_items)
                    .await
                {
                    Ok(found) => children = found,
                    Err(e) => warn!("Failed to list children of '{title}': {e:#}"),
                }
            }
            Err(reason) => {
                let target = identifier.clone().unwrap_or_else(|| title.clone());
                warn!("Expansion of '{target}' failed, treating it as a leaf: {reason}");
                self.pending.push_back(NavItem::Failure(ItemFailure::new(
                    FailureKind::ExpansionFailed,
                    target,
                    reason,
                )));
            }
        }

        if children.is_empty() {
            let href = nav.href(&node).await;
            let Some(url) = href.as_deref().and_then(|h| resolve_href(&nav.base, h)) else {
                debug!("Leaf '{title}' has no usable link, skipping");
                return;
            };
            if identifier.is_none() && !self.seen_urls.insert(url.to_string()) {
                return;
            }

            let leaf = LeafRef {
                title,
                identifier,
                url,
                depth,
            };
            nav.progress.report_leaf(&leaf);
            self.pending.push_back(NavItem::Leaf(leaf));
            return;
        }

        nav.progress.report_section(&title, identifier.as_deref(), depth);
        for child in children.into_iter().rev() {
            self.stack.push(Pending {
                node: child,
                depth: depth + 1,
            });
        }
    }
}
