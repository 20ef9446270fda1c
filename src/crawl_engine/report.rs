//! Run report persisted as `report.json` next to the composite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::crawl_types::{FailureKind, HarvestError, HarvestResult, ItemFailure};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Leaf references produced by the navigator (or the link list).
    pub leaves: usize,
    /// Pages handed to the extractor.
    pub pages_fetched: usize,
    /// Fragments in the composite.
    pub fragments: usize,
    /// Work items dropped because their URL was already claimed.
    pub duplicates_skipped: usize,
    /// Work items dropped because they are out of scope or excluded.
    pub out_of_scope_skipped: usize,
    pub failures: Vec<ItemFailure>,
    pub composite_path: Option<PathBuf>,
    pub artifact_path: Option<PathBuf>,
}

impl RunReport {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            started_at: Utc::now(),
            finished_at: None,
            leaves: 0,
            pages_fetched: 0,
            fragments: 0,
            duplicates_skipped: 0,
            out_of_scope_skipped: 0,
            failures: Vec::new(),
            composite_path: None,
            artifact_path: None,
        }
    }

    pub fn record(&mut self, failure: ItemFailure) {
        self.failures.push(failure);
    }

    #[must_use]
    pub fn failures_of(&self, kind: FailureKind) -> Vec<&ItemFailure> {
        self.failures.iter().filter(|f| f.kind == kind).collect()
    }

    #[must_use]
    pub fn render_failed(&self) -> bool {
        self.failures.iter().any(|f| f.kind == FailureKind::RenderFailure)
    }

    /// No failures of any kind.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn write_to(&self, path: &Path) -> HarvestResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| HarvestError::Serialize {
            what: "run report",
            source,
        })?;
        std::fs::write(path, json).map_err(|source| HarvestError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
