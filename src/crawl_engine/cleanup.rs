//! Browser and resource cleanup functionality
//!
//! This module handles cleanup tasks after a harvest is complete.

use anyhow::Result;
use chromiumoxide::Browser;
use log::{debug, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::browser_setup::ProfileDir;

/// Result of cleanup operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupResult {
    /// All cleanup operations succeeded
    Success,
    /// Some cleanup operations failed, with error details
    PartialFailure(Vec<String>),
}

/// Clean up browser and the profile directory if this run created it
pub async fn cleanup_browser_and_data(
    mut browser: Browser,
    profile: &ProfileDir,
) -> Result<CleanupResult> {
    let mut errors = Vec::new();

    debug!(target: "docweave::cleanup", "Closing browser");
    if let Err(e) = browser.close().await {
        warn!(target: "docweave::cleanup", "Failed to close browser: {e}");
        errors.push(format!("Browser close failed: {e}"));
    } else {
        debug!(target: "docweave::cleanup", "Browser closed successfully");
    }

    // Wait for browser process to fully exit (prevents "not closed manually" warning)
    debug!(target: "docweave::cleanup", "Waiting for browser process to exit");
    if let Err(e) = browser.wait().await {
        warn!(target: "docweave::cleanup", "Failed to wait for browser exit: {e}");
        errors.push(format!("Browser wait failed: {e}"));
    } else {
        debug!(target: "docweave::cleanup", "Browser process exited successfully");
    }

    match profile.release() {
        Ok(true) => {
            debug!(target: "docweave::cleanup", "Chrome data directory cleaned up successfully");
        }
        Ok(false) => {}
        Err(e) => {
            warn!(target: "docweave::cleanup", "Failed to clean up Chrome data directory: {e}");
            errors.push(format!("Directory cleanup failed: {e}"));
        }
    }

    if errors.is_empty() {
        Ok(CleanupResult::Success)
    } else {
        Ok(CleanupResult::PartialFailure(errors))
    }
}

/// Close the shared browser once every other holder has dropped it, then
/// stop its CDP handler task.
pub async fn shutdown_browser(
    browser: Arc<Browser>,
    handler_task: JoinHandle<()>,
    profile: &ProfileDir,
) {
    match Arc::try_unwrap(browser) {
        Ok(browser) => match cleanup_browser_and_data(browser, profile).await {
            Ok(CleanupResult::Success) => {
                debug!(target: "docweave::cleanup", "Browser and data cleanup completed successfully");
            }
            Ok(CleanupResult::PartialFailure(errors)) => {
                warn!(target: "docweave::cleanup", "Cleanup completed with failures: {errors:?}");
            }
            Err(e) => warn!(target: "docweave::cleanup", "Cleanup failed: {e}"),
        },
        Err(arc) => warn!(
            target: "docweave::cleanup",
            "Browser still has {} strong references, cleanup will happen on drop",
            Arc::strong_count(&arc)
        ),
    }

    handler_task.abort();
    if let Err(e) = handler_task.await
        && !e.is_cancelled()
    {
        warn!(target: "docweave::cleanup", "Handler task failed during abort: {e}");
    }
}
