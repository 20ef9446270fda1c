//! Type-safe builder for `HarvestConfig` using the typestate pattern
//!
//! `base_url` and then `output_dir` must be supplied before `build()` is
//! available; every other field has a default.

use crate::utils::{
    DEFAULT_EXPAND_TIMEOUT_MS, DEFAULT_PAGE_LOAD_TIMEOUT_SECS, DEFAULT_RENDER_TIMEOUT_SECS,
    DEFAULT_SETTLE_TIMEOUT_SECS,
};
use anyhow::{Context, Result, anyhow};
use regex::Regex;
use std::marker::PhantomData;
use std::path::PathBuf;
use url::Url;

use super::selectors::SelectorTable;
use super::types::{HarvestConfig, NavigationMode, RenderFormat};

/// Compile a glob pattern into a regex
///
/// `*` matches any sequence; everything else is literal. Anchored at both ends.
fn compile_glob_pattern(pattern: &str) -> Result<Regex> {
    let regex_pattern = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    let anchored = format!("^{regex_pattern}$");

    Regex::new(&anchored).map_err(|e| anyhow!("Invalid glob pattern '{pattern}': {e}"))
}

// Type states for the builder
pub struct WithBaseUrl;
pub struct Complete;

#[derive(Debug, Clone)]
pub(crate) struct BuilderFields {
    pub(crate) base_url: Option<String>,
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) subtree_roots: Vec<String>,
    pub(crate) excluded_titles: Vec<String>,
    pub(crate) excluded_url_patterns: Vec<String>,
    pub(crate) selectors: SelectorTable,
    pub(crate) navigation_mode: NavigationMode,
    pub(crate) follow_depth: u8,
    pub(crate) limit: Option<usize>,
    pub(crate) headless: bool,
    pub(crate) render_format: RenderFormat,
    pub(crate) dump_patterns: bool,
    pub(crate) document_title: Option<String>,
    pub(crate) page_load_timeout_secs: Option<u64>,
    pub(crate) settle_timeout_secs: Option<u64>,
    pub(crate) expand_timeout_ms: Option<u64>,
    pub(crate) render_timeout_secs: Option<u64>,
    pub(crate) chrome_data_dir: Option<PathBuf>,
}

impl Default for BuilderFields {
    fn default() -> Self {
        Self {
            base_url: None,
            output_dir: None,
            subtree_roots: Vec::new(),
            excluded_titles: Vec::new(),
            excluded_url_patterns: Vec::new(),
            selectors: SelectorTable::default(),
            navigation_mode: NavigationMode::Tree,
            follow_depth: 0,
            limit: None,
            headless: true,
            render_format: RenderFormat::Pdf,
            dump_patterns: false,
            document_title: None,
            page_load_timeout_secs: Some(DEFAULT_PAGE_LOAD_TIMEOUT_SECS),
            settle_timeout_secs: Some(DEFAULT_SETTLE_TIMEOUT_SECS),
            expand_timeout_ms: Some(DEFAULT_EXPAND_TIMEOUT_MS),
            render_timeout_secs: Some(DEFAULT_RENDER_TIMEOUT_SECS),
            chrome_data_dir: None,
        }
    }
}

pub struct HarvestConfigBuilder<State = ()> {
    pub(crate) fields: BuilderFields,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for HarvestConfigBuilder<()> {
    fn default() -> Self {
        Self {
            fields: BuilderFields::default(),
            _phantom: PhantomData,
        }
    }
}

impl HarvestConfig {
    /// Create a builder for configuring a `HarvestConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> HarvestConfigBuilder<()> {
        HarvestConfigBuilder::default()
    }
}

impl<State> HarvestConfigBuilder<State> {
    fn transition<Next>(self) -> HarvestConfigBuilder<Next> {
        HarvestConfigBuilder {
            fields: self.fields,
            _phantom: PhantomData,
        }
    }
}

impl HarvestConfigBuilder<()> {
    pub fn base_url(mut self, url: impl Into<String>) -> HarvestConfigBuilder<WithBaseUrl> {
        let url_string = url.into();

        // Add https:// if no scheme is present
        let normalized_url =
            if url_string.starts_with("http://") || url_string.starts_with("https://") {
                url_string
            } else {
                format!("https://{url_string}")
            };

        self.fields.base_url = Some(normalized_url);
        self.transition()
    }
}

impl HarvestConfigBuilder<WithBaseUrl> {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> HarvestConfigBuilder<Complete> {
        self.fields.output_dir = Some(dir.into());
        self.transition()
    }
}

// Build method only available when all required fields are set
impl HarvestConfigBuilder<Complete> {
    pub fn build(self) -> Result<HarvestConfig> {
        let fields = self.fields;

        let base_url = fields
            .base_url
            .ok_or_else(|| anyhow!("base_url is required"))?;
        let parsed =
            Url::parse(&base_url).with_context(|| format!("Invalid base URL '{base_url}'"))?;
        if parsed.host_str().is_none() {
            return Err(anyhow!("Base URL '{base_url}' has no host"));
        }

        let output_dir = fields
            .output_dir
            .ok_or_else(|| anyhow!("output_dir is required"))?;
        let output_dir = std::path::absolute(&output_dir).with_context(|| {
            format!("Failed to resolve output directory {}", output_dir.display())
        })?;

        fields.selectors.validate()?;

        let excluded_url_patterns_compiled = fields
            .excluded_url_patterns
            .iter()
            .map(|p| compile_glob_pattern(p))
            .collect::<Result<Vec<_>>>()?;

        let subtree_roots = fields
            .subtree_roots
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        let excluded_titles = fields
            .excluded_titles
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect();

        Ok(HarvestConfig {
            base_url,
            output_dir,
            subtree_roots,
            excluded_titles,
            excluded_url_patterns: fields.excluded_url_patterns,
            excluded_url_patterns_compiled,
            selectors: fields.selectors,
            navigation_mode: fields.navigation_mode,
            follow_depth: fields.follow_depth,
            limit: fields.limit,
            headless: fields.headless,
            render_format: fields.render_format,
            dump_patterns: fields.dump_patterns,
            document_title: fields.document_title,
            page_load_timeout_secs: fields.page_load_timeout_secs,
            settle_timeout_secs: fields.settle_timeout_secs,
            expand_timeout_ms: fields.expand_timeout_ms,
            render_timeout_secs: fields.render_timeout_secs,
            chrome_data_dir: fields.chrome_data_dir,
        })
    }
}

// Optional fields, settable in any state
impl<State> HarvestConfigBuilder<State> {
    #[must_use]
    pub fn subtree_root(mut self, identifier: impl Into<String>) -> Self {
        self.fields.subtree_roots.push(identifier.into());
        self
    }

    #[must_use]
    pub fn subtree_roots<I, S>(mut self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .subtree_roots
            .extend(identifiers.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn excluded_titles<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .excluded_titles
            .extend(phrases.into_iter().map(Into::into));
        self
    }

    /// Exclude URLs matching glob patterns, e.g. `*/videos/*`
    #[must_use]
    pub fn excluded_url_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .excluded_url_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn selectors(mut self, selectors: SelectorTable) -> Self {
        self.fields.selectors = selectors;
        self
    }

    #[must_use]
    pub fn navigation_mode(mut self, mode: NavigationMode) -> Self {
        self.fields.navigation_mode = mode;
        self
    }

    #[must_use]
    pub fn follow_depth(mut self, hops: u8) -> Self {
        self.fields.follow_depth = hops;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.fields.limit = limit;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.fields.headless = headless;
        self
    }

    #[must_use]
    pub fn render_format(mut self, format: RenderFormat) -> Self {
        self.fields.render_format = format;
        self
    }

    #[must_use]
    pub fn dump_patterns(mut self, enabled: bool) -> Self {
        self.fields.dump_patterns = enabled;
        self
    }

    #[must_use]
    pub fn document_title(mut self, title: impl Into<String>) -> Self {
        self.fields.document_title = Some(title.into());
        self
    }

    #[must_use]
    pub fn page_load_timeout_secs(mut self, secs: u64) -> Self {
        self.fields.page_load_timeout_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn settle_timeout_secs(mut self, secs: u64) -> Self {
        self.fields.settle_timeout_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn expand_timeout_ms(mut self, millis: u64) -> Self {
        self.fields.expand_timeout_ms = Some(millis);
        self
    }

    #[must_use]
    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.fields.render_timeout_secs = Some(secs);
        self
    }

    /// Use a dedicated Chrome profile directory (removed after the run)
    #[must_use]
    pub fn chrome_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fields.chrome_data_dir = Some(dir.into());
        self
    }
}
