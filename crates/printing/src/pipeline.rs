//! Paginate → lay out → normalize → render.
//!
//! The pipeline touches no files on its own; all output goes through the
//! injected [`RasterRenderer`] and [`VectorRenderer`].

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use crate::cancel::CancelToken;
use crate::config::PreviewSettings;
use crate::display::Color;
use crate::document::PaginationRequest;
use crate::error::{PreviewError, RenderError};
use crate::imposition::Imposer;
use crate::job::PageRange;
use crate::normalize::{ensure_metrics, normalize_page};
use crate::page::PrintPage;
use crate::pdf::PdfVectorRenderer;
use crate::preview::{PreviewProvider, PrintPreviewModel};
use crate::raster::ImageRasterRenderer;
use crate::render::{RasterImage, RasterRenderer, VectorRenderer};
use crate::session::SessionSnapshot;

const MARGIN_GUIDE_COLOR: Color = Color::new(0.85, 0.85, 0.85, 1.0);

#[derive(Clone)]
pub struct RenderPipeline {
    settings: PreviewSettings,
    raster: Arc<dyn RasterRenderer>,
    vector: Arc<dyn VectorRenderer>,
}

impl RenderPipeline {
    /// Pipeline using the built-in bitmap and PDF renderers.
    pub fn new(settings: PreviewSettings) -> Self {
        let raster = ImageRasterRenderer {
            background: settings.background_color(),
            margin_guides: settings.show_margin_guides.then_some(MARGIN_GUIDE_COLOR),
        };
        Self::with_renderers(settings, Arc::new(raster), Arc::new(PdfVectorRenderer))
    }

    pub fn with_renderers(
        mut settings: PreviewSettings,
        raster: Arc<dyn RasterRenderer>,
        vector: Arc<dyn VectorRenderer>,
    ) -> Self {
        settings.sanitize();
        Self {
            settings,
            raster,
            vector,
        }
    }

    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    /// Paginates the snapshot's document, applies the page range and layout,
    /// then normalizes every page to `target_dpi`.
    pub fn collect_pages(
        &self,
        snapshot: &SessionSnapshot,
        target_dpi: f32,
        cancel: &dyn CancelToken,
    ) -> Result<Vec<PrintPage>, PreviewError> {
        let options = &snapshot.options;
        let settings = options.page_settings();
        let request = PaginationRequest {
            settings: &settings,
            selection_only: options.selection_only,
            cancel,
        };
        let mut pages = snapshot.document.paginate(&request)?;
        cancel.check()?;

        if options.page_range != PageRange::All {
            pages = filter_page_range(pages, &options.page_range);
        }
        let logical = pages.len();
        let pages = Imposer::new(self.settings.tile_spacing_pt).apply(pages, options);
        debug!(
            "{}: {} logical pages -> {} sheets at {} dpi",
            snapshot.session_id,
            logical,
            pages.len(),
            target_dpi
        );

        let mut normalized = Vec::with_capacity(pages.len());
        for page in pages {
            cancel.check()?;
            normalized.push(normalize_page(page, target_dpi));
        }
        Ok(normalized)
    }

    pub fn render_bitmaps(
        &self,
        pages: &[PrintPage],
        target_dpi: f32,
        cancel: &dyn CancelToken,
    ) -> Result<Vec<RasterImage>, PreviewError> {
        let mut images = Vec::with_capacity(pages.len());
        for page in pages {
            cancel.check()?;
            let metrics = ensure_metrics(page, target_dpi);
            images.push(self.raster.render_to_bitmap(page, &metrics)?);
        }
        Ok(images)
    }

    /// `None` for an empty page sequence.
    pub fn create_vector_document(
        pages: &[PrintPage],
        renderer: &dyn VectorRenderer,
    ) -> Result<Option<Vec<u8>>, RenderError> {
        if pages.is_empty() {
            return Ok(None);
        }
        renderer.create_pdf_bytes(pages).map(Some)
    }

    pub fn export_pdf(&self, path: &Path, pages: &[PrintPage]) -> Result<(), RenderError> {
        self.vector.export_pdf(path, pages)
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(PreviewSettings::default())
    }
}

impl PreviewProvider for RenderPipeline {
    fn create_preview(
        &self,
        snapshot: &SessionSnapshot,
        cancel: &dyn CancelToken,
    ) -> Result<PrintPreviewModel, PreviewError> {
        let pages = self.collect_pages(snapshot, self.settings.target_dpi, cancel)?;
        let wants_vector = self.settings.include_vector_document
            && snapshot
                .printer
                .as_ref()
                .map_or(true, |printer| printer.capabilities.supports_vector);

        let vector = if wants_vector {
            cancel.check()?;
            Self::create_vector_document(&pages, self.vector.as_ref())?
        } else {
            None
        };

        info!(
            "{}: preview ready with {} pages{}",
            snapshot.session_id,
            pages.len(),
            if vector.is_some() { " and a vector document" } else { "" }
        );
        let model = PrintPreviewModel::new(pages);
        Ok(match vector {
            Some(bytes) => model.with_vector_document(bytes),
            None => model,
        })
    }
}

/// Keeps pages whose 1-based position in the paginated sequence is in `range`.
fn filter_page_range(pages: Vec<PrintPage>, range: &PageRange) -> Vec<PrintPage> {
    pages
        .into_iter()
        .enumerate()
        .filter(|(index, _)| range.contains(*index as u32 + 1))
        .map(|(_, page)| page)
        .collect()
}
