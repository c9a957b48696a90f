use std::sync::Arc;

use log::trace;

use crate::display::{Point, Rect};
use crate::page::{PageContent, PrintPage, PrintPageMetrics};

/// DPI difference, per axis, below which cached metrics are reused.
pub const DPI_TOLERANCE: f32 = 0.1;

/// Resolution used when a caller passes something unusable.
pub const FALLBACK_DPI: f32 = 72.0;

/// Metrics for `page` at `target_dpi`, reusing the cached instance when it is
/// within [`DPI_TOLERANCE`] on both axes.
pub fn ensure_metrics(page: &PrintPage, target_dpi: f32) -> Arc<PrintPageMetrics> {
    let target_dpi = sanitize_dpi(target_dpi);
    if let Some(existing) = &page.metrics {
        if within_tolerance(existing, target_dpi) {
            return Arc::clone(existing);
        }
        trace!(
            "recomputing page metrics: {:.2}x{:.2} dpi -> {:.2} dpi",
            existing.dpi_x,
            existing.dpi_y,
            target_dpi
        );
    }
    Arc::new(compute_metrics(page, target_dpi))
}

/// Returns `page` unchanged if its metrics fit `target_dpi`, otherwise a new
/// page value wrapping fresh metrics.
pub fn normalize_page(page: PrintPage, target_dpi: f32) -> PrintPage {
    let metrics = ensure_metrics(&page, target_dpi);
    match &page.metrics {
        Some(existing) if Arc::ptr_eq(existing, &metrics) => page,
        _ => page.with_metrics(metrics),
    }
}

/// Computes metrics from the page's settings and content extents.
///
/// Content that overflows the content rectangle is shrunk uniformly and
/// shifted back inside it; centering flags centre it on the respective axis.
pub fn compute_metrics(page: &PrintPage, target_dpi: f32) -> PrintPageMetrics {
    let dpi = sanitize_dpi(target_dpi);
    let settings = &page.settings;
    let page_size = settings.page_size();
    let content_rect = settings.content_rect();

    let bounds = match &page.content {
        PageContent::Display(_) => page.content.bounds(),
        // Blank pages draw nothing and tiled sheets are already placed.
        PageContent::Blank | PageContent::Composite(_) => None,
    };

    let (content_scale, content_offset) = match bounds {
        Some(bounds) if !bounds.is_empty() => {
            let scale = fit_scale(&bounds, &content_rect);
            let offset = Point::new(
                axis_offset(
                    bounds.x,
                    bounds.width,
                    scale,
                    content_rect.x,
                    content_rect.width,
                    settings.center_horizontally,
                ),
                axis_offset(
                    bounds.y,
                    bounds.height,
                    scale,
                    content_rect.y,
                    content_rect.height,
                    settings.center_vertically,
                ),
            );
            (scale, offset)
        }
        _ => (1.0, Point::default()),
    };

    PrintPageMetrics {
        page_size,
        content_rect,
        content_scale,
        content_offset,
        dpi_x: dpi,
        dpi_y: dpi,
    }
}

fn within_tolerance(metrics: &PrintPageMetrics, target_dpi: f32) -> bool {
    (metrics.dpi_x - target_dpi).abs() <= DPI_TOLERANCE
        && (metrics.dpi_y - target_dpi).abs() <= DPI_TOLERANCE
}

fn sanitize_dpi(dpi: f32) -> f32 {
    if dpi.is_finite() && dpi > 0.0 {
        dpi
    } else {
        FALLBACK_DPI
    }
}

fn fit_scale(bounds: &Rect, area: &Rect) -> f32 {
    if area.is_empty() {
        return 1.0;
    }
    (area.width / bounds.width)
        .min(area.height / bounds.height)
        .min(1.0)
}

fn axis_offset(
    start: f32,
    extent: f32,
    scale: f32,
    area_start: f32,
    area_extent: f32,
    center: bool,
) -> f32 {
    let scaled_start = start * scale;
    let scaled_extent = extent * scale;
    let placed = if center {
        area_start + (area_extent - scaled_extent) / 2.0
    } else {
        let max_start = (area_start + area_extent - scaled_extent).max(area_start);
        scaled_start.clamp(area_start, max_start)
    };
    placed - scaled_start
}
