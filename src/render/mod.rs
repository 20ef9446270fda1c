//! Render sinks: turn the persisted composite into the final artifact.
//!
//! The composite HTML is always written before a sink runs, so a failed
//! render leaves it in place for inspection or a retry.

pub mod chromium_pdf;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::RenderFormat;

pub use chromium_pdf::ChromiumPdfSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub path: PathBuf,
    pub format: RenderFormat,
    pub bytes: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Composite document {} does not exist", .0.display())]
    MissingDocument(PathBuf),

    #[error("Rendering timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Renderer failed: {0}")]
    Renderer(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Converts the composite at `document_path` into an artifact under
/// `output_dir`.
#[allow(async_fn_in_trait)]
pub trait RenderSink {
    async fn render(
        &self,
        document_path: &Path,
        output_dir: &Path,
    ) -> Result<RenderedArtifact, RenderError>;
}

fn file_len(path: &Path) -> Result<u64, RenderError> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// The composite HTML is the artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlOnlySink;

impl RenderSink for HtmlOnlySink {
    async fn render(
        &self,
        document_path: &Path,
        _output_dir: &Path,
    ) -> Result<RenderedArtifact, RenderError> {
        if !document_path.is_file() {
            return Err(RenderError::MissingDocument(document_path.to_path_buf()));
        }
        Ok(RenderedArtifact {
            path: document_path.to_path_buf(),
            format: RenderFormat::Html,
            bytes: file_len(document_path)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn html_sink_reports_the_composite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("composite.html");
        std::fs::write(&path, "<html></html>").unwrap();

        let artifact = HtmlOnlySink.render(&path, dir.path()).await.unwrap();
        assert_eq!(artifact.path, path);
        assert_eq!(artifact.format, RenderFormat::Html);
        assert_eq!(artifact.bytes, 13);
    }

    #[tokio::test]
    async fn html_sink_fails_without_document() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = HtmlOnlySink
            .render(&dir.path().join("missing.html"), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingDocument(_)));
    }
}
