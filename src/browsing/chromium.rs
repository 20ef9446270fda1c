//! chromiumoxide-backed browsing engine

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use chromiumoxide::element::Element;
use serde::Deserialize;
use tracing::{debug, trace};

use super::{BrowseError, BrowseResult, BrowsingEngine, BrowsingSession, with_page_timeout};
use crate::utils::{SETTLE_POLL_INTERVAL_MS, SETTLE_QUIET_WINDOW_MS};

const SETTLE_PROBE_SCRIPT: &str = r"
    (function() {
        return {
            readyState: document.readyState,
            resources: performance.getEntriesByType('resource').length,
            bodyExists: document.body !== null
        };
    })()
";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettleProbe {
    ready_state: String,
    resources: u64,
    body_exists: bool,
}

/// Opens one tab per session on a shared browser.
#[derive(Clone)]
pub struct ChromiumEngine {
    browser: Arc<Browser>,
}

impl ChromiumEngine {
    #[must_use]
    pub fn new(browser: Arc<Browser>) -> Self {
        Self { browser }
    }
}

impl BrowsingEngine for ChromiumEngine {
    type Session = ChromiumSession;

    async fn open_session(&self) -> BrowseResult<ChromiumSession> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("Failed to create page")?;
        Ok(ChromiumSession { page })
    }
}

pub struct ChromiumSession {
    page: Page,
}

impl ChromiumSession {
    async fn probe(&self) -> anyhow::Result<SettleProbe> {
        let result = self
            .page
            .evaluate(SETTLE_PROBE_SCRIPT)
            .await
            .context("Failed to evaluate settle probe")?;
        result
            .into_value::<SettleProbe>()
            .context("Unexpected settle probe result")
    }
}

impl BrowsingSession for ChromiumSession {
    type Node = Element;

    async fn navigate(&self, url: &str, timeout: Duration) -> BrowseResult<()> {
        debug!("Navigating to {url}");
        with_page_timeout(
            async {
                self.page
                    .goto(url)
                    .await
                    .with_context(|| format!("Navigation to {url} failed"))?;
                self.page
                    .wait_for_navigation()
                    .await
                    .with_context(|| format!("Page load of {url} failed"))?;
                Ok::<(), BrowseError>(())
            },
            timeout,
            "navigation",
        )
        .await
    }

    async fn wait_stable(&self, timeout: Duration) -> BrowseResult<()> {
        let quiet_window = Duration::from_millis(SETTLE_QUIET_WINDOW_MS);
        let poll_interval = Duration::from_millis(SETTLE_POLL_INTERVAL_MS);

        with_page_timeout(
            async {
                let mut last_count: Option<u64> = None;
                let mut quiet_since = Instant::now();

                loop {
                    match self.probe().await {
                        Ok(probe) if probe.ready_state == "complete" && probe.body_exists => {
                            if last_count == Some(probe.resources) {
                                if quiet_since.elapsed() >= quiet_window {
                                    trace!("Page settled with {} resources", probe.resources);
                                    return Ok::<(), BrowseError>(());
                                }
                            } else {
                                last_count = Some(probe.resources);
                                quiet_since = Instant::now();
                            }
                        }
                        Ok(probe) => {
                            trace!("Page not ready yet: {}", probe.ready_state);
                            last_count = None;
                        }
                        // Evaluation fails transiently while a navigation commits
                        Err(e) => trace!("Settle probe failed, retrying: {e:#}"),
                    }
                    tokio::time::sleep(poll_interval).await;
                }
            },
            timeout,
            "settle wait",
        )
        .await
    }

    async fn query_all(&self, selector: &str) -> BrowseResult<Vec<Element>> {
        Ok(self
            .page
            .find_elements(selector)
            .await
            .with_context(|| format!("Query '{selector}' failed"))?)
    }

    async fn query_within(&self, node: &Element, selector: &str) -> BrowseResult<Vec<Element>> {
        Ok(node
            .find_elements(selector)
            .await
            .with_context(|| format!("Query '{selector}' failed"))?)
    }

    async fn attribute(&self, node: &Element, name: &str) -> BrowseResult<Option<String>> {
        Ok(node
            .attribute(name)
            .await
            .with_context(|| format!("Failed to read attribute '{name}'"))?)
    }

    async fn inner_text(&self, node: &Element) -> BrowseResult<Option<String>> {
        Ok(node
            .inner_text()
            .await
            .context("Failed to read element text")?)
    }

    async fn click(&self, node: &Element) -> BrowseResult<()> {
        node.click().await.context("Failed to click element")?;
        Ok(())
    }

    async fn content(&self) -> BrowseResult<String> {
        Ok(self
            .page
            .content()
            .await
            .context("Failed to read page content")?)
    }

    async fn close(self) -> BrowseResult<()> {
        self.page.close().await.context("Failed to close page")?;
        Ok(())
    }
}
