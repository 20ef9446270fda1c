//! Shared configuration constants for docweave
//!
//! Default values used by the config builder, the browsing layer and the
//! assembler, kept in one place to avoid magic numbers.

/// Default timeout for `navigate()`: 30 seconds
pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 30;

/// Default bound on the settle wait after navigation: 10 seconds
///
/// The settle wait returns as soon as the page is quiet; this only caps
/// pages that keep issuing requests (long-polling, analytics beacons).
pub const DEFAULT_SETTLE_TIMEOUT_SECS: u64 = 10;

/// Default bound on waiting for a tree node to finish expanding: 5 seconds
///
/// Covers the click, the XHR that loads the children and the settle window.
pub const DEFAULT_EXPAND_TIMEOUT_MS: u64 = 5_000;

/// Default bound on the print-to-PDF call: 120 seconds
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 120;

/// A page counts as settled once no new resource entries appear for this long
pub const SETTLE_QUIET_WINDOW_MS: u64 = 500;

/// Poll interval while waiting for a page to settle
pub const SETTLE_POLL_INTERVAL_MS: u64 = 100;

/// Title given to tree nodes that carry no recognizable title element
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Prefix for anchors synthesized from a URL when a fragment has no title
pub const SYNTHESIZED_ANCHOR_PREFIX: &str = "page_";

/// File stem of the persisted composite document
pub const COMPOSITE_FILE_STEM: &str = "composite";

/// Run report written next to the composite
pub const REPORT_FILE_NAME: &str = "report.json";

/// Per-page inspection dump
pub const PATTERNS_FILE_NAME: &str = "patterns.json";

/// Chrome user agent string
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
