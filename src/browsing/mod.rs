//! Browsing collaborator seam
//!
//! The harvester never talks to a browser directly. It drives a
//! [`BrowsingEngine`] that opens [`BrowsingSession`]s (one tab each) and
//! works on opaque node handles. Production runs use the chromiumoxide
//! implementation in [`chromium`]; tests plug in an in-memory engine.

pub mod chromium;
pub mod page_timeout;

use std::time::Duration;

pub use chromium::{ChromiumEngine, ChromiumSession};
pub use page_timeout::with_page_timeout;

#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    #[error("{operation} timed out after {after:?}")]
    TimedOut {
        operation: &'static str,
        after: Duration,
    },

    #[error(transparent)]
    Engine(#[from] anyhow::Error),
}

impl BrowseError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

pub type BrowseResult<T> = Result<T, BrowseError>;

/// One browsing context (a tab). Closed explicitly with [`close`](Self::close).
#[allow(async_fn_in_trait)]
pub trait BrowsingSession {
    /// Handle to an element of the current page.
    type Node;

    /// Load `url`, bounded by `timeout`.
    async fn navigate(&self, url: &str, timeout: Duration) -> BrowseResult<()>;

    /// Wait until the document is complete and resource activity has gone
    /// quiet, bounded by `timeout`.
    async fn wait_stable(&self, timeout: Duration) -> BrowseResult<()>;

    /// Elements of the whole page matching `selector`, in document order.
    async fn query_all(&self, selector: &str) -> BrowseResult<Vec<Self::Node>>;

    /// Descendants of `node` matching `selector`, in document order.
    async fn query_within(&self, node: &Self::Node, selector: &str)
    -> BrowseResult<Vec<Self::Node>>;

    async fn attribute(&self, node: &Self::Node, name: &str) -> BrowseResult<Option<String>>;

    async fn inner_text(&self, node: &Self::Node) -> BrowseResult<Option<String>>;

    async fn click(&self, node: &Self::Node) -> BrowseResult<()>;

    /// Serialized DOM of the current page.
    async fn content(&self) -> BrowseResult<String>;

    /// Release the browsing context.
    async fn close(self) -> BrowseResult<()>;
}

#[allow(async_fn_in_trait)]
pub trait BrowsingEngine {
    type Session: BrowsingSession;

    async fn open_session(&self) -> BrowseResult<Self::Session>;
}
