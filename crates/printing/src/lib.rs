//! Print-preview core: tiling layouts, page normalization, rendering and the
//! preview update queue that keeps only the newest preview visible.

pub mod cancel;
pub mod config;
pub mod display;
pub mod document;
pub mod error;
pub mod imposition;
pub mod job;
pub mod layout;
pub mod metadata;
pub mod normalize;
pub mod options;
pub mod page;
pub mod pdf;
pub mod pipeline;
pub mod preview;
pub mod queue;
pub mod raster;
pub mod render;
pub mod session;

pub use cancel::{CancelToken, CancellationToken, NeverCancel};
pub use config::{PreviewSettings, PreviewSettingsError};
pub use display::{
    Color, DisplayCommand, GlyphRun, Point, PrintDisplayList, Rect, Rectangle, Size, Stroke,
    Transform,
};
pub use document::{PageListDocument, PaginationRequest, PrintDocument, TextDocument};
pub use error::{DocumentError, PreviewError, QueueError, RenderError};
pub use imposition::{apply_layout, Imposer, DEFAULT_TILE_SPACING_PT};
pub use job::{
    DuplexMode, Margin, Orientation, PageRange, PaperId, PaperSize, PrintColorMode,
    PrintSessionId, PrintTarget, PrintTicket, TargetCapabilities,
};
pub use layout::{HighlightSpan, LayoutInput, SimplePaginator, TextStyle, WrapMode};
pub use metadata::{LayoutKind, LayoutMetadata, NUpOrder, MAX_TILES_PER_AXIS};
pub use normalize::{compute_metrics, ensure_metrics, normalize_page, DPI_TOLERANCE};
pub use options::PrintOptions;
pub use page::{PageContent, PageSettings, PrintPage, PrintPageMetrics, Rotation, TilePlacement};
pub use pdf::PdfVectorRenderer;
pub use pipeline::RenderPipeline;
pub use preview::{PreviewEvent, PreviewProvider, PrintPreviewModel, RequestId, UpdateReason};
pub use queue::{PreviewEvents, PreviewUpdateQueue, QueueState};
pub use raster::ImageRasterRenderer;
pub use render::{RasterImage, RasterRenderer, VectorRenderer};
pub use session::{PrintSession, SessionSnapshot};
