//! JSON configuration file support
//!
//! A config file carries the same settings as the command line. Every field
//! is optional; command line flags override whatever the file sets.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::builder::HarvestConfigBuilder;
use super::selectors::SelectorTable;
use super::types::{NavigationMode, RenderFormat};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub subtree_roots: Vec<String>,
    pub excluded_titles: Vec<String>,
    pub excluded_url_patterns: Vec<String>,
    pub selectors: Option<SelectorTable>,
    pub navigation_mode: Option<NavigationMode>,
    pub follow_depth: Option<u8>,
    pub limit: Option<usize>,
    pub headless: Option<bool>,
    pub render_format: Option<RenderFormat>,
    pub dump_patterns: Option<bool>,
    pub document_title: Option<String>,
    pub page_load_timeout_secs: Option<u64>,
    pub settle_timeout_secs: Option<u64>,
    pub expand_timeout_ms: Option<u64>,
    pub render_timeout_secs: Option<u64>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Apply every setting present in the file onto `builder`.
    #[must_use]
    pub fn apply<State>(self, builder: HarvestConfigBuilder<State>) -> HarvestConfigBuilder<State> {
        let mut builder = builder
            .subtree_roots(self.subtree_roots)
            .excluded_titles(self.excluded_titles)
            .excluded_url_patterns(self.excluded_url_patterns);

        if let Some(selectors) = self.selectors {
            builder = builder.selectors(selectors);
        }
        if let Some(mode) = self.navigation_mode {
            builder = builder.navigation_mode(mode);
        }
        if let Some(hops) = self.follow_depth {
            builder = builder.follow_depth(hops);
        }
        if self.limit.is_some() {
            builder = builder.limit(self.limit);
        }
        if let Some(headless) = self.headless {
            builder = builder.headless(headless);
        }
        if let Some(format) = self.render_format {
            builder = builder.render_format(format);
        }
        if let Some(dump) = self.dump_patterns {
            builder = builder.dump_patterns(dump);
        }
        if let Some(title) = self.document_title {
            builder = builder.document_title(title);
        }
        if let Some(secs) = self.page_load_timeout_secs {
            builder = builder.page_load_timeout_secs(secs);
        }
        if let Some(secs) = self.settle_timeout_secs {
            builder = builder.settle_timeout_secs(secs);
        }
        if let Some(millis) = self.expand_timeout_ms {
            builder = builder.expand_timeout_ms(millis);
        }
        if let Some(secs) = self.render_timeout_secs {
            builder = builder.render_timeout_secs(secs);
        }
        builder
    }
}
