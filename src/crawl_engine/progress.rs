//! Progress reporting abstraction for harvest runs
//!
//! Defines the `ProgressReporter` trait for lifecycle event reporting
//! and provides a no-op implementation plus the outline printer used by the
//! command line.

use std::path::Path;

use super::crawl_types::ItemFailure;
use super::report::RunReport;
use crate::navigator::LeafRef;

/// Trait for reporting harvest progress at key lifecycle events
pub trait ProgressReporter: Send + Sync {
    /// The root page and its navigation tree are loaded
    fn report_root_loaded(&self, url: &str);

    /// An inner tree node is being descended into
    fn report_section(&self, title: &str, identifier: Option<&str>, depth: usize);

    /// A node was skipped with its sub-tree because of its title
    fn report_excluded(&self, title: &str, depth: usize);

    /// A leaf content reference was produced
    fn report_leaf(&self, leaf: &LeafRef);

    /// A fragment was added to the composite under `anchor`
    fn report_page_extracted(&self, url: &str, anchor: &str);

    /// A URL was not fetched because it was already claimed
    fn report_duplicate(&self, url: &str);

    /// A non-fatal failure was recorded
    fn report_failure(&self, failure: &ItemFailure);

    /// The final artifact was written
    fn report_rendered(&self, path: &Path);

    /// The run has finished
    fn report_completed(&self, report: &RunReport);
}

/// Progress reporter that does nothing
#[derive(Debug, Clone, Copy)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_root_loaded(&self, _url: &str) {}

    #[inline(always)]
    fn report_section(&self, _title: &str, _identifier: Option<&str>, _depth: usize) {}

    #[inline(always)]
    fn report_excluded(&self, _title: &str, _depth: usize) {}

    #[inline(always)]
    fn report_leaf(&self, _leaf: &LeafRef) {}

    #[inline(always)]
    fn report_page_extracted(&self, _url: &str, _anchor: &str) {}

    #[inline(always)]
    fn report_duplicate(&self, _url: &str) {}

    #[inline(always)]
    fn report_failure(&self, _failure: &ItemFailure) {}

    #[inline(always)]
    fn report_rendered(&self, _path: &Path) {}

    #[inline(always)]
    fn report_completed(&self, _report: &RunReport) {}
}

/// Prints the navigation outline to stdout as it is walked, indented by depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineProgress;

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

impl ProgressReporter for OutlineProgress {
    fn report_root_loaded(&self, url: &str) {
        println!("Navigation tree loaded from {url}");
    }

    fn report_section(&self, title: &str, identifier: Option<&str>, depth: usize) {
        println!(
            "{}Section: {title}, ID: {}",
            indent(depth),
            identifier.unwrap_or("-")
        );
    }

    fn report_excluded(&self, title: &str, depth: usize) {
        println!("{}Skipping: {title}", indent(depth));
    }

    fn report_leaf(&self, leaf: &LeafRef) {
        println!("{}Page: {} ({})", indent(leaf.depth), leaf.title, leaf.url);
    }

    fn report_page_extracted(&self, _url: &str, _anchor: &str) {}

    fn report_duplicate(&self, _url: &str) {}

    fn report_failure(&self, failure: &ItemFailure) {
        eprintln!("  ! {failure}");
    }

    fn report_rendered(&self, path: &Path) {
        println!("Wrote {}", path.display());
    }

    fn report_completed(&self, report: &RunReport) {
        println!(
            "Done: {} fragments, {} duplicates skipped, {} failures",
            report.fragments,
            report.duplicates_skipped,
            report.failures.len()
        );
    }
}
