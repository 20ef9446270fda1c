//! Core configuration types for a harvest run

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::selectors::SelectorTable;

/// How work items are produced from the navigation tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// Depth-first walk with on-demand expansion of collapsed nodes.
    #[default]
    Tree,
    /// Expand each sub-tree root once and take every link in its group.
    LinkList,
}

/// Final artifact produced from the composite document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderFormat {
    #[default]
    Pdf,
    /// Persist the composite HTML only.
    Html,
}

/// Main configuration struct for a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Root page carrying the navigation tree. Also the scope prefix.
    pub(crate) base_url: String,

    /// Output directory for the composite, the artifact and the reports.
    ///
    /// **INVARIANT:** Always an absolute path (normalized in builder).
    pub(crate) output_dir: PathBuf,

    /// Identifiers of the tree nodes to harvest. Empty means every top-level item.
    pub(crate) subtree_roots: Vec<String>,

    /// Nodes whose title contains any of these phrases are skipped with their sub-tree.
    pub(crate) excluded_titles: Vec<String>,

    /// Glob patterns (`*` wildcard) of URLs never to fetch.
    pub(crate) excluded_url_patterns: Vec<String>,

    /// Compiled from `excluded_url_patterns` at build time
    #[serde(skip)]
    pub(crate) excluded_url_patterns_compiled: Vec<regex::Regex>,

    pub(crate) selectors: SelectorTable,
    pub(crate) navigation_mode: NavigationMode,

    /// How many hops of in-scope links discovered inside fragments to follow.
    pub(crate) follow_depth: u8,

    /// Stop claiming new pages after this many fetches.
    pub(crate) limit: Option<usize>,
    pub(crate) headless: bool,
    pub(crate) render_format: RenderFormat,

    /// Write `patterns.json` with per-page structure summaries.
    pub(crate) dump_patterns: bool,

    /// Title of the composite document. Defaults to the root page's host.
    pub(crate) document_title: Option<String>,

    /// Timeout in seconds for `navigate()`
    ///
    /// Default: 30 seconds
    pub(crate) page_load_timeout_secs: Option<u64>,

    /// Upper bound in seconds on the settle wait after navigation
    ///
    /// Default: 10 seconds
    pub(crate) settle_timeout_secs: Option<u64>,

    /// Upper bound in milliseconds on waiting for a node to expand
    ///
    /// Default: 5000 ms
    pub(crate) expand_timeout_ms: Option<u64>,

    /// Timeout in seconds for the render step
    ///
    /// Default: 120 seconds
    pub(crate) render_timeout_secs: Option<u64>,

    /// Chrome user data directory, unique per run when set.
    #[serde(skip)]
    pub(crate) chrome_data_dir: Option<PathBuf>,
}
