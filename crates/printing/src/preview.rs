//! Preview results and the provider seam that produces them.

use std::fmt;
use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::error::PreviewError;
use crate::page::PrintPage;
use crate::session::SessionSnapshot;

/// Identifies one accepted `request_update` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preview-request-{}", self.0)
    }
}

/// What made the session ask for a new preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    OptionsChanged,
    TicketChanged,
    PrinterChanged,
    Navigation,
    Refresh,
}

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Finalized preview pages plus the optional vector document.
///
/// Dropping the model releases it; an attached release hook runs exactly once
/// at that point, including for results the queue discards.
pub struct PrintPreviewModel {
    pages: Vec<PrintPage>,
    vector_document: Option<Arc<[u8]>>,
    on_release: Option<ReleaseHook>,
}

impl PrintPreviewModel {
    pub fn new(pages: Vec<PrintPage>) -> Self {
        Self {
            pages,
            vector_document: None,
            on_release: None,
        }
    }

    pub fn with_vector_document(mut self, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.vector_document = Some(bytes.into());
        self
    }

    pub fn with_release_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }

    pub fn pages(&self) -> &[PrintPage] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&PrintPage> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn vector_document(&self) -> Option<&Arc<[u8]>> {
        self.vector_document.as_ref()
    }
}

impl Drop for PrintPreviewModel {
    fn drop(&mut self) {
        if let Some(hook) = self.on_release.take() {
            hook();
        }
    }
}

impl fmt::Debug for PrintPreviewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrintPreviewModel")
            .field("pages", &self.pages.len())
            .field(
                "vector_document",
                &self.vector_document.as_ref().map(|bytes| bytes.len()),
            )
            .finish()
    }
}

/// Builds a preview from a session snapshot.
///
/// Implementations poll `cancel` between units of work and return
/// [`PreviewError::Cancelled`] once it fires.
pub trait PreviewProvider: Send + Sync {
    fn create_preview(
        &self,
        snapshot: &SessionSnapshot,
        cancel: &dyn CancelToken,
    ) -> Result<PrintPreviewModel, PreviewError>;
}

/// Terminal outcome of one preview request.
#[derive(Debug)]
pub enum PreviewEvent {
    Available {
        model: PrintPreviewModel,
        reason: UpdateReason,
        request: RequestId,
    },
    Failed {
        error: PreviewError,
        request: RequestId,
    },
}

impl PreviewEvent {
    pub fn request(&self) -> RequestId {
        match self {
            PreviewEvent::Available { request, .. } | PreviewEvent::Failed { request, .. } => {
                *request
            }
        }
    }
}
