//! Renderer seams consumed by the render pipeline.

use std::fs;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};

use crate::error::RenderError;
use crate::page::{PrintPage, PrintPageMetrics};

/// A rendered page bitmap.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub dpi: f32,
    pub pixels: RgbaImage,
}

impl RasterImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut data = Vec::new();
        PngEncoder::new(&mut data).write_image(
            self.pixels.as_raw(),
            self.width(),
            self.height(),
            ColorType::Rgba8,
        )?;
        Ok(data)
    }
}

/// Turns one normalized page into a bitmap.
pub trait RasterRenderer: Send + Sync {
    fn render_to_bitmap(
        &self,
        page: &PrintPage,
        metrics: &PrintPageMetrics,
    ) -> Result<RasterImage, RenderError>;
}

/// Turns a page sequence into a vector document.
pub trait VectorRenderer: Send + Sync {
    fn create_pdf_bytes(&self, pages: &[PrintPage]) -> Result<Vec<u8>, RenderError>;

    fn export_pdf(&self, path: &Path, pages: &[PrintPage]) -> Result<(), RenderError> {
        let bytes = self.create_pdf_bytes(pages)?;
        fs::write(path, bytes).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
