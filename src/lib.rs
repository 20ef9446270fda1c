pub mod assembler;
pub mod browser_setup;
pub mod browsing;
pub mod cli;
pub mod config;
pub mod crawl_engine;
pub mod inspection;
pub mod navigator;
pub mod page_extractor;
pub mod registry;
pub mod render;
pub mod utils;

pub use browser_setup::{
    ProfileDir, download_managed_browser, find_browser_executable, launch_browser,
};
pub use browsing::{BrowseError, BrowseResult, BrowsingEngine, BrowsingSession};
pub use config::{HarvestConfig, NavigationMode, RenderFormat, SelectorTable};
pub use crawl_engine::{
    FailureKind, HarvestError, HarvestResult, ItemFailure, NoOpProgress, OutlineProgress,
    ProgressReporter, RunReport, harvest, harvest_with_progress, run_pipeline,
};
pub use navigator::{LeafRef, NavItem, TreeNavigator};
pub use page_extractor::schema::*;
pub use page_extractor::{ExtractError, extract};
pub use registry::VisitRegistry;
pub use render::{HtmlOnlySink, RenderError, RenderSink, RenderedArtifact};
