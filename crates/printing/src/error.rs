use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while producing a preview.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// The request was superseded or the queue was disposed.
    #[error("preview generation cancelled")]
    Cancelled,
    #[error("document pagination failed: {0}")]
    Document(#[from] DocumentError),
    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
    #[error("preview provider failed: {0}")]
    Provider(String),
}

impl PreviewError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PreviewError::Cancelled)
    }
}

/// Errors raised by a source document while paginating.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document has no selection to print")]
    NoSelection,
    #[error("pagination failed: {0}")]
    Pagination(String),
}

/// Errors raised by raster and vector renderers.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("raster rendering failed: {0}")]
    Raster(String),
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("PDF generation failed: {0}")]
    Pdf(String),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Misuse of the preview update queue, reported to the caller directly.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("preview update queue has been disposed")]
    Disposed,
    #[error("failed to start preview worker: {0}")]
    Spawn(#[source] io::Error),
    #[error("preview event channel disconnected")]
    Disconnected,
}
