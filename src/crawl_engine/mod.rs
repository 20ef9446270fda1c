//! Harvest Engine Module
//!
//! This module contains the pipeline that turns a navigation tree into a
//! composite document, the error taxonomy, progress reporting and the run
//! report.

// Sub-modules
pub mod cleanup;
pub mod crawl_types;
pub mod execution;
pub mod orchestrator;
pub mod progress;
pub mod report;

// Re-exports for public API
pub use execution::{harvest, harvest_with_progress};

// Re-export orchestration and progress types for advanced usage
pub use orchestrator::run_pipeline;
pub use progress::{NoOpProgress, OutlineProgress, ProgressReporter};

// Re-export error and report types
pub use crawl_types::{FailureKind, HarvestError, HarvestResult, ItemFailure};
pub use report::RunReport;
