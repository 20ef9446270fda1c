//! Content extraction
//!
//! Loads a page, picks its primary content region through the configured
//! selector table, sanitizes it and collects the links inside it.

// Sub-modules
pub mod extractor;
pub mod links;
pub mod sanitize;
pub mod schema;

use std::time::Duration;

use crate::browsing::BrowseError;
use crate::crawl_engine::crawl_types::{FailureKind, ItemFailure};

// Re-exports for public API
pub use extractor::{extract, fragment_from_html};
pub use links::{DiscoveredLink, discover_links};
pub use sanitize::sanitize_fragment;
pub use schema::ContentFragment;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Navigation to {url} timed out ({operation} after {after:?})")]
    NavigationTimeout {
        url: String,
        operation: &'static str,
        after: Duration,
    },

    /// No selector of the content table matched. Never an empty fragment.
    #[error("No content region on {url} (tried {tried})")]
    ContentNotFound { url: String, tried: String },

    /// The region matched but nothing visible survived sanitization.
    #[error("Content region on {url} is empty after removing hidden elements")]
    EmptyContent { url: String },

    #[error("Browser failure on {url}: {reason}")]
    Browser { url: String, reason: String },

    #[error("Failed to process markup of {url}: {reason}")]
    Markup { url: String, reason: String },
}

impl ExtractError {
    pub(crate) fn from_browse(url: &str, err: BrowseError) -> Self {
        match err {
            BrowseError::TimedOut { operation, after } => Self::NavigationTimeout {
                url: url.to_string(),
                operation,
                after,
            },
            BrowseError::Engine(e) => Self::Browser {
                url: url.to_string(),
                reason: format!("{e:#}"),
            },
        }
    }

    pub(crate) fn markup(url: &str, reason: impl Into<String>) -> Self {
        Self::Markup {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::NavigationTimeout { url, .. }
            | Self::ContentNotFound { url, .. }
            | Self::EmptyContent { url }
            | Self::Browser { url, .. }
            | Self::Markup { url, .. } => url,
        }
    }

    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NavigationTimeout { .. } => FailureKind::NavigationTimeout,
            Self::ContentNotFound { .. } | Self::EmptyContent { .. } => {
                FailureKind::ContentNotFound
            }
            Self::Browser { .. } | Self::Markup { .. } => FailureKind::Browser,
        }
    }

    /// Record form for the run report.
    #[must_use]
    pub fn to_failure(&self) -> ItemFailure {
        ItemFailure::new(self.kind(), self.url(), self.to_string())
    }
}
