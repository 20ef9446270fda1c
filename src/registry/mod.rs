//! Visit registry: the canonical set of URLs already claimed this run.
//!
//! Every fetch in the pipeline is preceded by a [`VisitRegistry::claim`]; a
//! URL that was claimed once is never handed to the extractor again, whether
//! it shows up twice in the navigation tree or as a cross-reference inside a
//! fragment.

use dashmap::DashSet;
use url::Url;

use crate::utils::{is_in_scope, normalize_url, resolve_href};

#[derive(Debug)]
pub struct VisitRegistry {
    base: Url,
    visited: DashSet<String>,
}

impl VisitRegistry {
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self {
            base,
            visited: DashSet::new(),
        }
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve `url` against the base and normalize it.
    ///
    /// `None` when the URL is unparsable, not http(s), or outside the base
    /// prefix. Such URLs are never visited.
    #[must_use]
    pub fn canonicalize(&self, url: &str) -> Option<String> {
        let resolved = resolve_href(&self.base, url)?;
        is_in_scope(&resolved, &self.base).then(|| normalize_url(resolved.as_str()))
    }

    /// Read-only check: in scope and not claimed yet.
    #[must_use]
    pub fn should_visit(&self, url: &str) -> bool {
        self.canonicalize(url)
            .is_some_and(|key| !self.visited.contains(&key))
    }

    /// Record `url` as processed. Returns whether it was newly recorded.
    pub fn mark_visited(&self, url: &str) -> bool {
        match self.canonicalize(url) {
            Some(key) => self.visited.insert(key),
            None => false,
        }
    }

    /// Atomic check-and-mark. Returns `true` for exactly one caller per
    /// canonical URL; the caller that wins performs the fetch.
    pub fn claim(&self, url: &str) -> bool {
        self.mark_visited(url)
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.canonicalize(url)
            .is_some_and(|key| self.visited.contains(&key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    /// Snapshot of claimed URLs, sorted.
    #[must_use]
    pub fn visited_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.visited.iter().map(|u| u.key().clone()).collect();
        urls.sort();
        urls
    }
}
