//! Derived values and predicates on `HarvestConfig`

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use super::types::HarvestConfig;
use crate::utils::{COMPOSITE_FILE_STEM, PATTERNS_FILE_NAME, REPORT_FILE_NAME};

/// Every bounded wait of a run, resolved from the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub page_load: Duration,
    pub settle: Duration,
    pub expand: Duration,
    pub render: Duration,
}

impl HarvestConfig {
    /// The base URL, parsed. Validated by the builder.
    pub fn parsed_base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).with_context(|| format!("Invalid base URL '{}'", self.base_url))
    }

    #[must_use]
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            page_load: Duration::from_secs(self.page_load_timeout_secs()),
            settle: Duration::from_secs(self.settle_timeout_secs()),
            expand: Duration::from_millis(self.expand_timeout_ms()),
            render: Duration::from_secs(self.render_timeout_secs()),
        }
    }

    /// True when `title` contains any configured exclusion phrase.
    #[must_use]
    pub fn is_title_excluded(&self, title: &str) -> bool {
        self.excluded_titles
            .iter()
            .any(|phrase| title.contains(phrase.as_str()))
    }

    /// True when `url` matches a configured exclusion glob.
    #[must_use]
    pub fn is_url_excluded(&self, url: &str) -> bool {
        self.excluded_url_patterns_compiled
            .iter()
            .any(|re| re.is_match(url))
    }

    /// Title of the composite, falling back to the base URL's host.
    #[must_use]
    pub fn resolved_document_title(&self) -> String {
        if let Some(title) = self.document_title() {
            return title.to_string();
        }
        self.parsed_base_url()
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "Documentation".to_string())
    }

    /// File name stem for the composite and the rendered artifact.
    #[must_use]
    pub fn document_stem(&self) -> String {
        match self.document_title() {
            Some(title) => {
                let sanitized = sanitize_filename::sanitize(title.replace(char::is_whitespace, "_"));
                if sanitized.is_empty() {
                    COMPOSITE_FILE_STEM.to_string()
                } else {
                    sanitized
                }
            }
            None => COMPOSITE_FILE_STEM.to_string(),
        }
    }

    #[must_use]
    pub fn composite_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.html", self.document_stem()))
    }

    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }

    #[must_use]
    pub fn patterns_path(&self) -> PathBuf {
        self.output_dir.join(PATTERNS_FILE_NAME)
    }
}
