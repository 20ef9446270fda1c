//! Print-to-PDF through the same Chromium instance that did the crawling

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use tracing::{info, warn};
use url::Url;

use super::{RenderError, RenderSink, RenderedArtifact, file_len};
use crate::config::RenderFormat;

pub struct ChromiumPdfSink {
    browser: Arc<Browser>,
    timeout: Duration,
}

impl ChromiumPdfSink {
    #[must_use]
    pub fn new(browser: Arc<Browser>, timeout: Duration) -> Self {
        Self { browser, timeout }
    }

    async fn print(&self, document_url: &str) -> Result<Vec<u8>, RenderError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Renderer(format!("Failed to create page: {e}")))?;

        let printed = async {
            page.goto(document_url)
                .await
                .map_err(|e| RenderError::Renderer(format!("Failed to load composite: {e}")))?;
            page.wait_for_navigation()
                .await
                .map_err(|e| RenderError::Renderer(format!("Composite never finished loading: {e}")))?;

            let params = PrintToPdfParams {
                print_background: Some(true),
                ..Default::default()
            };
            page.pdf(params)
                .await
                .map_err(|e| RenderError::Renderer(format!("Print to PDF failed: {e}")))
        };

        let outcome = match tokio::time::timeout(self.timeout, printed).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::TimedOut(self.timeout)),
        };

        if let Err(e) = page.close().await {
            warn!("Failed to close render page: {e}");
        }
        outcome
    }
}

impl RenderSink for ChromiumPdfSink {
    async fn render(
        &self,
        document_path: &Path,
        output_dir: &Path,
    ) -> Result<RenderedArtifact, RenderError> {
        if !document_path.is_file() {
            return Err(RenderError::MissingDocument(document_path.to_path_buf()));
        }
        let absolute = std::path::absolute(document_path).map_err(|source| RenderError::Io {
            path: document_path.to_path_buf(),
            source,
        })?;
        let document_url = Url::from_file_path(&absolute).map_err(|()| {
            RenderError::Renderer(format!("Cannot express {} as a file URL", absolute.display()))
        })?;

        info!("Rendering {} to PDF", absolute.display());
        let pdf = self.print(document_url.as_str()).await?;

        let stem = document_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("composite");
        let pdf_path = output_dir.join(format!("{stem}.pdf"));
        std::fs::write(&pdf_path, &pdf).map_err(|source| RenderError::Io {
            path: pdf_path.clone(),
            source,
        })?;

        Ok(RenderedArtifact {
            bytes: file_len(&pdf_path)?,
            path: pdf_path,
            format: RenderFormat::Pdf,
        })
    }
}
