//! Test utilities for the docweave test suite
//!
//! Provides an in-memory [`BrowsingEngine`] backed by `scraper` documents.
//! Navigation trees behave like the lazily loaded trees of real help
//! centers: the child group of an item with `aria-expanded="false"` is
//! invisible to queries until the item's `.expand-collapse` toggle is
//! clicked.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::anyhow;
use docweave::browsing::{BrowseError, BrowseResult, BrowsingEngine, BrowsingSession};
use docweave::config::{Complete, HarvestConfig, HarvestConfigBuilder, WithBaseUrl};
use docweave::crawl_engine::{ItemFailure, ProgressReporter, RunReport};
use docweave::navigator::LeafRef;
use docweave::utils::normalize_url;
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

pub const BASE_URL: &str = "https://docs.example.com/docs/index.html";

/// Absolute URL of a page under the documentation root.
pub fn page_url(path: &str) -> String {
    format!("https://docs.example.com/docs/{path}")
}

/// How the mock site answers a navigation.
#[derive(Debug, Clone)]
pub enum MockPage {
    Html(String),
    /// Navigation never completes.
    Timeout,
    /// Navigation completes but the page never settles.
    NeverSettles(String),
}

/// Calls observed by the engine, shared by all of its sessions.
#[derive(Debug, Default)]
pub struct MockLog {
    pub fetches: Vec<String>,
    pub opened: usize,
    pub closed: usize,
    pub clicks: usize,
}

#[derive(Debug, Default)]
pub struct MockSite {
    pages: HashMap<String, MockPage>,
}

impl MockSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages
            .insert(normalize_url(url), MockPage::Html(html.into()));
        self
    }

    pub fn with(mut self, url: &str, page: MockPage) -> Self {
        self.pages.insert(normalize_url(url), page);
        self
    }

    pub fn into_engine(self) -> MockEngine {
        MockEngine {
            site: Rc::new(self),
            log: Rc::new(RefCell::new(MockLog::default())),
        }
    }
}

pub struct MockEngine {
    site: Rc<MockSite>,
    pub log: Rc<RefCell<MockLog>>,
}

impl MockEngine {
    pub fn fetches(&self) -> Vec<String> {
        self.log.borrow().fetches.clone()
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        let wanted = normalize_url(url);
        self.log
            .borrow()
            .fetches
            .iter()
            .filter(|u| **u == wanted)
            .count()
    }

    /// Sessions opened but not closed.
    pub fn open_sessions(&self) -> usize {
        let log = self.log.borrow();
        log.opened - log.closed
    }
}

impl BrowsingEngine for MockEngine {
    type Session = MockSession;

    async fn open_session(&self) -> BrowseResult<MockSession> {
        self.log.borrow_mut().opened += 1;
        Ok(MockSession {
            site: Rc::clone(&self.site),
            log: Rc::clone(&self.log),
            loaded: RefCell::new(None),
        })
    }
}

struct Loaded {
    document: Html,
    settles: bool,
    expanded: HashSet<NodeId>,
}

pub struct MockSession {
    site: Rc<MockSite>,
    log: Rc<RefCell<MockLog>>,
    loaded: RefCell<Option<Loaded>>,
}

fn parse_selector(selector: &str) -> BrowseResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| BrowseError::Engine(anyhow!("invalid selector '{selector}': {e}")))
}

fn no_page() -> BrowseError {
    BrowseError::Engine(anyhow!("no page loaded"))
}

impl Loaded {
    fn element(&self, node: NodeId) -> BrowseResult<ElementRef<'_>> {
        self.document
            .tree
            .get(node)
            .and_then(ElementRef::wrap)
            .ok_or_else(|| BrowseError::Engine(anyhow!("stale node handle")))
    }

    /// Hidden when inside the child group of an item that is still
    /// collapsed.
    fn is_visible(&self, element: ElementRef<'_>) -> bool {
        element.ancestors().all(|ancestor| {
            let Some(group) = ElementRef::wrap(ancestor) else {
                return true;
            };
            if group.value().name() != "ul" {
                return true;
            }
            let Some(owner) = ancestor.parent().and_then(ElementRef::wrap) else {
                return true;
            };
            owner.value().attr("aria-expanded") != Some("false")
                || self.expanded.contains(&owner.id())
        })
    }
}

impl BrowsingSession for MockSession {
    type Node = NodeId;

    async fn navigate(&self, url: &str, _timeout: Duration) -> BrowseResult<()> {
        let key = normalize_url(url);
        self.log.borrow_mut().fetches.push(key.clone());

        let (html, settles) = match self.site.pages.get(&key) {
            Some(MockPage::Html(html)) => (html.clone(), true),
            Some(MockPage::NeverSettles(html)) => (html.clone(), false),
            Some(MockPage::Timeout) => {
                return Err(BrowseError::TimedOut {
                    operation: "navigate",
                    after: Duration::from_millis(10),
                });
            }
            None => (
                "<html><head><title>404</title></head><body><h1>404 Not Found</h1></body></html>"
                    .to_string(),
                true,
            ),
        };

        *self.loaded.borrow_mut() = Some(Loaded {
            document: Html::parse_document(&html),
            settles,
            expanded: HashSet::new(),
        });
        Ok(())
    }

    async fn wait_stable(&self, timeout: Duration) -> BrowseResult<()> {
        let loaded = self.loaded.borrow();
        let loaded = loaded.as_ref().ok_or_else(no_page)?;
        if loaded.settles {
            Ok(())
        } else {
            Err(BrowseError::TimedOut {
                operation: "settle",
                after: timeout,
            })
        }
    }

    async fn query_all(&self, selector: &str) -> BrowseResult<Vec<NodeId>> {
        let selector = parse_selector(selector)?;
        let loaded = self.loaded.borrow();
        let loaded = loaded.as_ref().ok_or_else(no_page)?;
        Ok(loaded
            .document
            .select(&selector)
            .filter(|e| loaded.is_visible(*e))
            .map(|e| e.id())
            .collect())
    }

    async fn query_within(&self, node: &NodeId, selector: &str) -> BrowseResult<Vec<NodeId>> {
        let selector = parse_selector(selector)?;
        let loaded = self.loaded.borrow();
        let loaded = loaded.as_ref().ok_or_else(no_page)?;
        let scope = loaded.element(*node)?;
        // querySelectorAll never matches the scope element itself
        Ok(scope
            .select(&selector)
            .filter(|e| e.id() != *node && loaded.is_visible(*e))
            .map(|e| e.id())
            .collect())
    }

    async fn attribute(&self, node: &NodeId, name: &str) -> BrowseResult<Option<String>> {
        let loaded = self.loaded.borrow();
        let loaded = loaded.as_ref().ok_or_else(no_page)?;
        if name == "aria-expanded" && loaded.expanded.contains(node) {
            return Ok(Some("true".to_string()));
        }
        Ok(loaded.element(*node)?.value().attr(name).map(str::to_string))
    }

    async fn inner_text(&self, node: &NodeId) -> BrowseResult<Option<String>> {
        let loaded = self.loaded.borrow();
        let loaded = loaded.as_ref().ok_or_else(no_page)?;
        let text: String = loaded.element(*node)?.text().collect();
        Ok(Some(text))
    }

    async fn click(&self, node: &NodeId) -> BrowseResult<()> {
        self.log.borrow_mut().clicks += 1;
        let mut loaded = self.loaded.borrow_mut();
        let loaded = loaded.as_mut().ok_or_else(no_page)?;

        let toggle = loaded.element(*node)?;
        match toggle.value().attr("data-mock-expand") {
            Some("timeout") => {
                return Err(BrowseError::TimedOut {
                    operation: "click",
                    after: Duration::from_millis(10),
                });
            }
            Some("stuck") => return Ok(()),
            _ => {}
        }

        let item = toggle
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().attr("aria-expanded").is_some())
            .map(|e| e.id());
        if let Some(item) = item {
            loaded.expanded.insert(item);
        }
        Ok(())
    }

    async fn content(&self) -> BrowseResult<String> {
        let loaded = self.loaded.borrow();
        let loaded = loaded.as_ref().ok_or_else(no_page)?;
        Ok(loaded.document.html())
    }

    async fn close(self) -> BrowseResult<()> {
        self.log.borrow_mut().closed += 1;
        Ok(())
    }
}

/// A content page in the default help-center layout.
pub fn content_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{title}</title><script>window.analytics = 1;</script></head>
<body>
  <header class="head-text"><h1 itemprop="headline">{title}</h1></header>
  <nav class="sidebar"><a href="index.html">Home</a></nav>
  <div class="body conbody">{body}</div>
  <footer>footer</footer>
</body>
</html>"#
    )
}

/// The navigation root page wrapping a `ul.node-tree` list of items.
pub fn nav_page(items: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Docs</title></head>
<body>
  <div class="node-tree-container">
    <ul class="node-tree">{items}</ul>
  </div>
</body>
</html>"#
    )
}

/// A leaf tree item.
pub fn leaf(id: &str, title: &str, href: &str) -> String {
    format!(
        r#"<li class="node-tree-item" data-id="{id}"><a role="button" href="{href}">{title}</a></li>"#
    )
}

/// A collapsed tree item whose children appear only once expanded.
pub fn collapsed(id: &str, title: &str, href: &str, children: &[String]) -> String {
    branch(id, title, href, children, "false", "")
}

/// An already expanded tree item.
pub fn expanded(id: &str, title: &str, href: &str, children: &[String]) -> String {
    branch(id, title, href, children, "true", "")
}

/// A collapsed item whose toggle misbehaves (`timeout` or `stuck`).
pub fn broken(id: &str, title: &str, href: &str, children: &[String], mode: &str) -> String {
    branch(
        id,
        title,
        href,
        children,
        "false",
        &format!(r#" data-mock-expand="{mode}""#),
    )
}

fn branch(
    id: &str,
    title: &str,
    href: &str,
    children: &[String],
    state: &str,
    toggle_attrs: &str,
) -> String {
    format!(
        r#"<li class="node-tree-item" data-id="{id}" aria-expanded="{state}">
  <span class="expand-collapse"{toggle_attrs}></span>
  <a role="button" href="{href}">{title}</a>
  <ul class="node-tree" role="group">{}</ul>
</li>"#,
        children.concat()
    )
}

/// Builder preloaded with the mock site's base URL and short timeouts.
pub fn config_builder(output_dir: &Path) -> HarvestConfigBuilder<Complete> {
    base_builder().output_dir(output_dir)
}

pub fn base_builder() -> HarvestConfigBuilder<WithBaseUrl> {
    HarvestConfig::builder()
        .base_url(BASE_URL)
        .page_load_timeout_secs(1)
        .settle_timeout_secs(1)
        .expand_timeout_ms(200)
}

pub fn test_config(output_dir: &Path) -> HarvestConfig {
    config_builder(output_dir).build().unwrap()
}

/// Progress reporter that records every event as a short string.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_with(&self, prefix: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressReporter for RecordingProgress {
    fn report_root_loaded(&self, url: &str) {
        self.push(format!("root:{url}"));
    }

    fn report_section(&self, title: &str, _identifier: Option<&str>, depth: usize) {
        self.push(format!("section:{depth}:{title}"));
    }

    fn report_excluded(&self, title: &str, _depth: usize) {
        self.push(format!("excluded:{title}"));
    }

    fn report_leaf(&self, leaf: &LeafRef) {
        self.push(format!("leaf:{}:{}", leaf.depth, leaf.title));
    }

    fn report_page_extracted(&self, _url: &str, anchor: &str) {
        self.push(format!("extracted:{anchor}"));
    }

    fn report_duplicate(&self, url: &str) {
        self.push(format!("duplicate:{url}"));
    }

    fn report_failure(&self, failure: &ItemFailure) {
        self.push(format!("failure:{}", failure.kind));
    }

    fn report_rendered(&self, path: &Path) {
        self.push(format!("rendered:{}", path.display()));
    }

    fn report_completed(&self, _report: &RunReport) {
        self.push("completed".to_string());
    }
}
