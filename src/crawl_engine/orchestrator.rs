//! Main harvest orchestration logic
//!
//! Drives one ordered pipeline:
//! - Root page load and navigation tree walk (or link list)
//! - Registry claim before every fetch
//! - Extraction, optional follow of discovered links
//! - Assembly, link rewrite, persistence and rendering
//!
//! Per-item failures are recorded in the run report and never stop the run.

use std::collections::VecDeque;

use futures::StreamExt;
use futures::stream::{self, LocalBoxStream};
use log::{debug, error, info, warn};
use url::Url;

use super::crawl_types::{FailureKind, HarvestError, HarvestResult, ItemFailure};
use super::progress::ProgressReporter;
use super::report::RunReport;
use crate::assembler::DocumentAssembler;
use crate::browsing::{BrowsingEngine, BrowsingSession};
use crate::config::{HarvestConfig, NavigationMode};
use crate::inspection::{PagePatterns, page_patterns, write_patterns};
use crate::navigator::{LeafRef, NavItem, TreeNavigator};
use crate::page_extractor::extract;
use crate::registry::VisitRegistry;
use crate::render::RenderSink;
use crate::utils::UNKNOWN_TITLE;

/// Accumulators owned by one run.
struct Harvest<'a, E: BrowsingEngine, P: ProgressReporter> {
    config: &'a HarvestConfig,
    engine: &'a E,
    progress: &'a P,
    base: Url,
    registry: VisitRegistry,
    assembler: DocumentAssembler,
    report: RunReport,
    patterns: Vec<PagePatterns>,
    /// Set once the page limit is reached.
    exhausted: bool,
}

impl<'a, E: BrowsingEngine, P: ProgressReporter> Harvest<'a, E, P> {
    fn record(&mut self, failure: ItemFailure) {
        self.progress.report_failure(&failure);
        self.report.record(failure);
    }

    fn limit_reached(&self) -> bool {
        self.config
            .limit()
            .is_some_and(|limit| self.report.pages_fetched >= limit)
    }

    /// Extract `leaf`, then the in-scope pages it links to, up to the
    /// configured follow depth.
    async fn process_leaf(&mut self, leaf: LeafRef) {
        let mut queue = VecDeque::from([(leaf, 0u8)]);

        while let Some((target, hops)) = queue.pop_front() {
            if self.limit_reached() {
                if !self.exhausted {
                    info!("Page limit reached, not claiming further pages");
                }
                self.exhausted = true;
                return;
            }

            let url = target.url.as_str();
            if self.config.is_url_excluded(url) || self.registry.canonicalize(url).is_none() {
                debug!("Skipping out-of-scope or excluded URL: {url}");
                self.report.out_of_scope_skipped += 1;
                continue;
            }
            if !self.registry.claim(url) {
                debug!("Already claimed: {url}");
                self.report.duplicates_skipped += 1;
                self.progress.report_duplicate(url);
                continue;
            }

            self.report.pages_fetched += 1;
            let fragment = match extract(self.engine, &target, self.config, &self.base).await {
                Ok(fragment) => fragment,
                Err(e) => {
                    warn!("{e}");
                    self.record(e.to_failure());
                    continue;
                }
            };

            if hops < self.config.follow_depth() {
                for link in fragment.in_scope_links() {
                    if !self.registry.should_visit(&link.url) {
                        continue;
                    }
                    let Ok(link_url) = Url::parse(&link.url) else {
                        continue;
                    };
                    let title = if link.text.is_empty() {
                        UNKNOWN_TITLE.to_string()
                    } else {
                        link.text.clone()
                    };
                    queue.push_back((
                        LeafRef {
                            title,
                            identifier: None,
                            url: link_url,
                            depth: target.depth + 1,
                        },
                        hops + 1,
                    ));
                }
            }

            let summary = self
                .config
                .dump_patterns()
                .then(|| page_patterns(&fragment, &target.title));
            let anchor = self.assembler.add(fragment);
            if let Some(mut summary) = summary {
                summary.anchor = Some(anchor.clone());
                self.patterns.push(summary);
            }
            self.progress.report_page_extracted(url, &anchor);
        }
    }

    /// Load the root page, walk the tree and process every leaf.
    async fn walk<S: BrowsingSession>(&mut self, nav_session: &S) -> HarvestResult<()> {
        let config = self.config;
        let timeouts = config.timeouts();
        let root_url = self.base.to_string();

        nav_session
            .navigate(&root_url, timeouts.page_load)
            .await
            .map_err(|e| HarvestError::RootUnreachable {
                url: root_url.clone(),
                reason: e.to_string(),
            })?;
        if let Err(e) = nav_session.wait_stable(timeouts.settle).await {
            warn!("Root page did not settle, continuing: {e}");
        }
        self.progress.report_root_loaded(&root_url);
        info!("Loaded navigation root {root_url}");

        let navigator = TreeNavigator::new(nav_session, config, self.base.clone(), self.progress);
        let roots = navigator.locate_roots().await?;

        let mut items: LocalBoxStream<'_, NavItem> = match config.navigation_mode() {
            NavigationMode::Tree => navigator.explore_roots(roots),
            NavigationMode::LinkList => stream::iter(navigator.link_list(roots).await).boxed_local(),
        };

        while let Some(item) = items.next().await {
            match item {
                NavItem::Failure(failure) => self.record(failure),
                NavItem::Leaf(leaf) => {
                    self.report.leaves += 1;
                    self.process_leaf(leaf).await;
                }
            }
            if self.exhausted {
                break;
            }
        }
        Ok(())
    }
}

/// Run the whole pipeline against `engine`, rendering with `sink`.
///
/// Returns the run report, also written as `report.json`. Errors only for
/// fatal conditions: unreachable root, missing tree, output directory I/O.
pub async fn run_pipeline<E, R, P>(
    config: &HarvestConfig,
    engine: &E,
    sink: &R,
    progress: &P,
) -> HarvestResult<RunReport>
where
    E: BrowsingEngine,
    R: RenderSink,
    P: ProgressReporter,
{
    let base = config.parsed_base_url()?;
    let output_dir = config.output_dir();
    std::fs::create_dir_all(output_dir).map_err(|source| HarvestError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut harvest = Harvest {
        config,
        engine,
        progress,
        registry: VisitRegistry::new(base.clone()),
        assembler: DocumentAssembler::new(base.clone(), config.resolved_document_title()),
        report: RunReport::new(base.as_str()),
        patterns: Vec::new(),
        exhausted: false,
        base,
    };

    let nav_session = engine
        .open_session()
        .await
        .map_err(|e| HarvestError::RootUnreachable {
            url: harvest.base.to_string(),
            reason: format!("could not open a browsing session: {e}"),
        })?;
    let walked = harvest.walk(&nav_session).await;
    if let Err(e) = nav_session.close().await {
        warn!("Failed to close navigation page: {e}");
    }
    walked?;

    let Harvest {
        assembler,
        mut report,
        patterns,
        ..
    } = harvest;

    let composite = assembler.finalize();
    report.fragments = composite.fragments.len();
    let composite_path = config.composite_path();
    composite.write_to(&composite_path)?;
    report.composite_path = Some(composite_path.clone());
    info!(
        "Wrote composite with {} fragments to {}",
        report.fragments,
        composite_path.display()
    );

    if config.dump_patterns() {
        write_patterns(&config.patterns_path(), &patterns)?;
    }

    match sink.render(&composite_path, output_dir).await {
        Ok(artifact) => {
            info!(
                "Rendered {} ({} bytes)",
                artifact.path.display(),
                artifact.bytes
            );
            progress.report_rendered(&artifact.path);
            report.artifact_path = Some(artifact.path);
        }
        Err(e) => {
            error!("Rendering failed, composite kept at {}: {e}", composite_path.display());
            let failure = ItemFailure::new(
                FailureKind::RenderFailure,
                composite_path.display().to_string(),
                e.to_string(),
            );
            progress.report_failure(&failure);
            report.record(failure);
        }
    }

    report.finish();
    report.write_to(&config.report_path())?;
    progress.report_completed(&report);
    Ok(report)
}
