use image::{Rgba, RgbaImage};

use crate::display::{Color, DisplayCommand, Rect, Transform};
use crate::error::RenderError;
use crate::page::{PageContent, PrintPage, PrintPageMetrics, Rotation};
use crate::render::{RasterImage, RasterRenderer};

/// Refuse bitmaps above this many pixels instead of exhausting memory.
pub const MAX_RASTER_PIXELS: u64 = 150_000_000;

/// Preview-quality rasterizer: glyph runs become solid boxes.
#[derive(Debug, Clone)]
pub struct ImageRasterRenderer {
    pub background: Color,
    pub margin_guides: Option<Color>,
}

impl Default for ImageRasterRenderer {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            margin_guides: Some(Color::new(0.9, 0.9, 0.9, 1.0)),
        }
    }
}

impl RasterRenderer for ImageRasterRenderer {
    fn render_to_bitmap(
        &self,
        page: &PrintPage,
        metrics: &PrintPageMetrics,
    ) -> Result<RasterImage, RenderError> {
        let width = metrics.pixel_width();
        let height = metrics.pixel_height();
        if u64::from(width) * u64::from(height) > MAX_RASTER_PIXELS {
            return Err(RenderError::Raster(format!(
                "{width}x{height} px bitmap exceeds the raster limit"
            )));
        }

        let mut image = RgbaImage::from_pixel(width, height, color_to_rgba(self.background));
        let to_pixels = Transform::new(metrics.dpi_x / 72.0, metrics.dpi_y / 72.0, 0.0, 0.0);
        let transform = match &page.content {
            PageContent::Display(_) => Transform::new(
                metrics.content_scale,
                metrics.content_scale,
                metrics.content_offset.x,
                metrics.content_offset.y,
            )
            .then(&to_pixels),
            _ => to_pixels,
        };
        let clip = Rect::new(0.0, 0.0, width as f32, height as f32);
        draw_content(&mut image, &page.content, &transform, &clip);

        if let Some(color) = self.margin_guides {
            draw_margin_guides(&mut image, &to_pixels.apply_rect(&metrics.content_rect), color);
        }

        Ok(RasterImage {
            dpi: metrics.dpi_x,
            pixels: image,
        })
    }
}

fn draw_content(image: &mut RgbaImage, content: &PageContent, transform: &Transform, clip: &Rect) {
    match content {
        PageContent::Blank => {}
        PageContent::Display(list) => {
            for command in &list.commands {
                let mut rect = transform.apply_rect(&command.bounds());
                let color = match command {
                    DisplayCommand::GlyphRun(run) => run.color,
                    DisplayCommand::BackgroundRect(background) => background.color,
                    DisplayCommand::HorizontalRule { stroke, .. } => {
                        rect.height = rect.height.max(1.0);
                        stroke.color
                    }
                };
                fill_rect(image, &rect.intersect(clip), color);
            }
        }
        PageContent::Composite(tiles) => {
            for tile in tiles.iter() {
                let placed = Transform::map_rect(
                    &tile.source,
                    &tile.target,
                    tile.rotation == Rotation::Half,
                )
                .then(transform);
                let tile_clip = transform.apply_rect(&tile.target).intersect(clip);
                if tile_clip.is_empty() {
                    continue;
                }
                draw_content(image, &tile.content, &placed, &tile_clip);
            }
        }
    }
}

fn fill_rect(buffer: &mut RgbaImage, rect: &Rect, color: Color) {
    if rect.is_empty() {
        return;
    }
    let x0 = (rect.x.round().max(0.0) as u32).min(buffer.width());
    let y0 = (rect.y.round().max(0.0) as u32).min(buffer.height());
    let x1 = (rect.right().round().max(0.0) as u32).min(buffer.width());
    let y1 = (rect.bottom().round().max(0.0) as u32).min(buffer.height());
    let rgba = color_to_rgba(color);
    for yy in y0..y1 {
        for xx in x0..x1 {
            buffer.put_pixel(xx, yy, rgba);
        }
    }
}

fn draw_margin_guides(buffer: &mut RgbaImage, area: &Rect, color: Color) {
    let rgba = color_to_rgba(color);
    let (width, height) = (buffer.width(), buffer.height());
    for x in [area.x, area.right()] {
        let x = x.round();
        if x >= 0.0 && (x as u32) < width {
            for y in 0..height {
                buffer.put_pixel(x as u32, y, rgba);
            }
        }
    }
    for y in [area.y, area.bottom()] {
        let y = y.round();
        if y >= 0.0 && (y as u32) < height {
            for x in 0..width {
                buffer.put_pixel(x, y as u32, rgba);
            }
        }
    }
}

fn color_to_rgba(color: Color) -> Rgba<u8> {
    Rgba([
        clamp_to_u8(color.r),
        clamp_to_u8(color.g),
        clamp_to_u8(color.b),
        clamp_to_u8(color.a),
    ])
}

fn clamp_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Point, PrintDisplayList, Rectangle, Size};
    use crate::job::{Margin, PaperSize};
    use crate::normalize::compute_metrics;
    use crate::page::{PageSettings, TilePlacement};
    use std::sync::Arc;

    fn settings() -> PageSettings {
        PageSettings {
            paper: PaperSize::from_points(72.0, 72.0),
            margins: Margin::zero(),
            ..PageSettings::default()
        }
    }

    fn red_square() -> PrintDisplayList {
        let mut list = PrintDisplayList::default();
        list.push(DisplayCommand::BackgroundRect(Rectangle {
            origin: Point::new(0.0, 0.0),
            size: Size::new(36.0, 36.0),
            color: Color::new(1.0, 0.0, 0.0, 1.0),
        }));
        list
    }

    fn renderer() -> ImageRasterRenderer {
        ImageRasterRenderer {
            margin_guides: None,
            ..ImageRasterRenderer::default()
        }
    }

    #[test]
    fn renders_display_list_at_target_dpi() {
        let page = PrintPage::from_display_list(red_square(), settings());
        let metrics = compute_metrics(&page, 144.0);
        let image = renderer().render_to_bitmap(&page, &metrics).unwrap();
        assert_eq!(image.width(), 144);
        assert_eq!(image.pixels.get_pixel(10, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(image.pixels.get_pixel(100, 100), &Rgba([255, 255, 255, 255]));
        assert!(image.encode_png().unwrap().starts_with(b"\x89PNG"));
    }

    #[test]
    fn half_turned_tile_lands_in_opposite_corner() {
        let source = PrintPage::from_display_list(red_square(), settings());
        let tile = TilePlacement {
            content: source.content.clone(),
            source_page: 1,
            source: Rect::new(0.0, 0.0, 72.0, 72.0),
            target: Rect::new(0.0, 0.0, 72.0, 72.0),
            rotation: Rotation::Half,
        };
        let sheet = PrintPage::new(PageContent::Composite(Arc::from(vec![tile])), settings());
        let metrics = compute_metrics(&sheet, 72.0);
        let image = renderer().render_to_bitmap(&sheet, &metrics).unwrap();
        assert_eq!(image.pixels.get_pixel(60, 60), &Rgba([255, 0, 0, 255]));
        assert_eq!(image.pixels.get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
    }
}
