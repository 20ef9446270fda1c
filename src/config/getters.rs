//! Getter methods for `HarvestConfig`

use std::path::{Path, PathBuf};

use super::selectors::SelectorTable;
use super::types::{HarvestConfig, NavigationMode, RenderFormat};
use crate::utils::{
    DEFAULT_EXPAND_TIMEOUT_MS, DEFAULT_PAGE_LOAD_TIMEOUT_SECS, DEFAULT_RENDER_TIMEOUT_SECS,
    DEFAULT_SETTLE_TIMEOUT_SECS,
};

impl HarvestConfig {
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn subtree_roots(&self) -> &[String] {
        &self.subtree_roots
    }

    #[must_use]
    pub fn excluded_titles(&self) -> &[String] {
        &self.excluded_titles
    }

    #[must_use]
    pub fn excluded_url_patterns(&self) -> &[String] {
        &self.excluded_url_patterns
    }

    #[must_use]
    pub fn selectors(&self) -> &SelectorTable {
        &self.selectors
    }

    #[must_use]
    pub fn navigation_mode(&self) -> NavigationMode {
        self.navigation_mode
    }

    #[must_use]
    pub fn follow_depth(&self) -> u8 {
        self.follow_depth
    }

    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn render_format(&self) -> RenderFormat {
        self.render_format
    }

    #[must_use]
    pub fn dump_patterns(&self) -> bool {
        self.dump_patterns
    }

    #[must_use]
    pub fn document_title(&self) -> Option<&str> {
        self.document_title.as_deref()
    }

    #[must_use]
    pub fn page_load_timeout_secs(&self) -> u64 {
        self.page_load_timeout_secs
            .unwrap_or(DEFAULT_PAGE_LOAD_TIMEOUT_SECS)
    }

    #[must_use]
    pub fn settle_timeout_secs(&self) -> u64 {
        self.settle_timeout_secs
            .unwrap_or(DEFAULT_SETTLE_TIMEOUT_SECS)
    }

    #[must_use]
    pub fn expand_timeout_ms(&self) -> u64 {
        self.expand_timeout_ms.unwrap_or(DEFAULT_EXPAND_TIMEOUT_MS)
    }

    #[must_use]
    pub fn render_timeout_secs(&self) -> u64 {
        self.render_timeout_secs
            .unwrap_or(DEFAULT_RENDER_TIMEOUT_SECS)
    }

    #[must_use]
    pub fn chrome_data_dir(&self) -> Option<&PathBuf> {
        self.chrome_data_dir.as_ref()
    }
}
