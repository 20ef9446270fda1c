//! Error taxonomy for harvest runs.
//!
//! Per-item failures ([`ItemFailure`]) are recorded and the run moves on;
//! [`HarvestError`] aborts the run before anything useful can be produced.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Fatal, run-level errors
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The browser could not be started
    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    /// The root page (or its navigation tree) could not be loaded
    #[error("Root page {url} unreachable: {reason}")]
    RootUnreachable { url: String, reason: String },

    /// None of the configured sub-tree roots exist in the navigation tree
    #[error("None of the configured sub-tree roots were found: {}", .0.join(", "))]
    SubtreeRootsNotFound(Vec<String>),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl From<anyhow::Error> for HarvestError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the whole context chain
        Self::Config(format!("{err:#}"))
    }
}

/// Convenience alias for Result with `HarvestError`
pub type HarvestResult<T> = Result<T, HarvestError>;

/// Kind of a recorded, non-fatal failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NavigationTimeout,
    ContentNotFound,
    ExpansionFailed,
    Browser,
    RenderFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NavigationTimeout => "navigation timeout",
            Self::ContentNotFound => "content not found",
            Self::ExpansionFailed => "expansion failed",
            Self::Browser => "browser failure",
            Self::RenderFailure => "render failure",
        };
        f.write_str(name)
    }
}

/// A failure attached to one URL or tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub kind: FailureKind,
    /// URL or node identifier the failure belongs to.
    pub target: String,
    pub reason: String,
}

impl ItemFailure {
    pub fn new(kind: FailureKind, target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}: {}", self.kind, self.target, self.reason)
    }
}
