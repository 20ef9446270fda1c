//! Production entry point: launch Chromium, run the pipeline, clean up.

use std::sync::Arc;

use log::info;

use super::cleanup::shutdown_browser;
use super::crawl_types::{HarvestError, HarvestResult};
use super::orchestrator::run_pipeline;
use super::progress::{NoOpProgress, ProgressReporter};
use super::report::RunReport;
use crate::browser_setup::launch_browser;
use crate::browsing::ChromiumEngine;
use crate::config::{HarvestConfig, RenderFormat};
use crate::render::{ChromiumPdfSink, HtmlOnlySink};

/// Harvest the site described by `config` with a real browser.
///
/// The browser is shut down on every path, including fatal errors. Its
/// profile directory is removed unless the caller configured one.
pub async fn harvest_with_progress<P: ProgressReporter>(
    config: &HarvestConfig,
    progress: &P,
) -> HarvestResult<RunReport> {
    let (browser, handler_task, profile) =
        launch_browser(config.headless(), config.chrome_data_dir().cloned())
            .await
            .map_err(|e| HarvestError::BrowserLaunch(format!("{e:#}")))?;
    info!("Browser launched, profile at {}", profile.path().display());

    let browser = Arc::new(browser);
    let engine = ChromiumEngine::new(Arc::clone(&browser));

    let outcome = match config.render_format() {
        RenderFormat::Pdf => {
            let sink = ChromiumPdfSink::new(Arc::clone(&browser), config.timeouts().render);
            run_pipeline(config, &engine, &sink, progress).await
        }
        RenderFormat::Html => run_pipeline(config, &engine, &HtmlOnlySink, progress).await,
    };

    drop(engine);
    shutdown_browser(browser, handler_task, &profile).await;

    outcome
}

/// [`harvest_with_progress`] without progress output.
pub async fn harvest(config: &HarvestConfig) -> HarvestResult<RunReport> {
    harvest_with_progress(config, &NoOpProgress).await
}
