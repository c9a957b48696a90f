//! Applies the tiling layout (N-Up, booklet, poster) to a paginated sequence.
//!
//! Output sheets use the page setup of the print options; every source page
//! is referenced through a [`TilePlacement`] whose `source_page` is its
//! 1-based position in the input sequence.

use std::sync::Arc;

use log::debug;

use crate::display::{Rect, Size};
use crate::metadata::{LayoutKind, LayoutMetadata, NUpOrder};
use crate::options::PrintOptions;
use crate::page::{PageContent, PageSettings, PrintPage, Rotation, TilePlacement};

/// Gap between neighbouring tiles on a sheet, in points.
pub const DEFAULT_TILE_SPACING_PT: f32 = 6.0;

/// Layout engine configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Imposer {
    pub tile_spacing_pt: f32,
}

impl Default for Imposer {
    fn default() -> Self {
        Self {
            tile_spacing_pt: DEFAULT_TILE_SPACING_PT,
        }
    }
}

/// [`Imposer::apply`] with the default tile spacing.
pub fn apply_layout(pages: Vec<PrintPage>, options: &PrintOptions) -> Vec<PrintPage> {
    Imposer::default().apply(pages, options)
}

impl Imposer {
    pub fn new(tile_spacing_pt: f32) -> Self {
        Self {
            tile_spacing_pt: if tile_spacing_pt.is_finite() {
                tile_spacing_pt.max(0.0)
            } else {
                DEFAULT_TILE_SPACING_PT
            },
        }
    }

    pub fn apply(&self, pages: Vec<PrintPage>, options: &PrintOptions) -> Vec<PrintPage> {
        if pages.is_empty() {
            return pages;
        }
        let metadata = options.layout_metadata();
        let sheet = options.page_settings();
        let input = pages.len();
        let output = match metadata.kind {
            LayoutKind::Standard => return pages,
            LayoutKind::NUp => self.n_up(&pages, &metadata, &sheet),
            LayoutKind::Booklet => self.booklet(&pages, metadata.booklet_bind_long_edge, &sheet),
            LayoutKind::Poster => poster(&pages, &metadata, options.poster_overlap(), &sheet),
        };
        debug!(
            "{} layout: {} input pages -> {} output pages",
            metadata.kind,
            input,
            output.len()
        );
        output
    }

    fn n_up(
        &self,
        pages: &[PrintPage],
        metadata: &LayoutMetadata,
        sheet: &PageSettings,
    ) -> Vec<PrintPage> {
        let tiles = metadata.nup_tile_count() as usize;
        let cells = grid_cells(
            &sheet.content_rect(),
            metadata.nup_rows,
            metadata.nup_columns,
            self.tile_spacing_pt,
        );

        pages
            .chunks(tiles)
            .enumerate()
            .map(|(group, chunk)| {
                let placements: Vec<TilePlacement> = chunk
                    .iter()
                    .enumerate()
                    .map(|(slot, page)| {
                        let cell = cell_for(
                            &cells,
                            metadata.nup_order,
                            slot as u32,
                            metadata.nup_rows,
                            metadata.nup_columns,
                        );
                        whole_page_tile(page, group * tiles + slot, cell, Rotation::None)
                    })
                    .collect();
                sheet_page(placements, sheet, group)
            })
            .collect()
    }

    fn booklet(
        &self,
        pages: &[PrintPage],
        bind_long_edge: bool,
        sheet: &PageSettings,
    ) -> Vec<PrintPage> {
        let padded = pages.len().div_ceil(4) * 4;
        let area = sheet.content_rect();
        let halves = grid_cells(&area, 1, 2, self.tile_spacing_pt);
        let frame = Rect::from_size(sheet.page_size());

        let side = |numbers: [usize; 2], reverse: bool, index: usize| {
            let placements = numbers
                .iter()
                .zip(&halves)
                .filter_map(|(&number, cell)| {
                    // Padding pages past the end stay blank.
                    let page = pages.get(number - 1)?;
                    let mut tile = whole_page_tile(page, number - 1, *cell, Rotation::None);
                    if reverse && !bind_long_edge {
                        tile.target = tile.target.rotated_half_within(&frame);
                        tile.rotation = Rotation::Half;
                    }
                    Some(tile)
                })
                .collect();
            sheet_page(placements, sheet, index)
        };

        let mut output = Vec::with_capacity(padded / 2);
        for i in 0..padded / 4 {
            let front = [padded - 2 * i, 2 * i + 1];
            let back = [2 * i + 2, padded - 1 - 2 * i];
            output.push(side(front, false, output.len()));
            output.push(side(back, true, output.len()));
        }
        output
    }
}

fn poster(
    pages: &[PrintPage],
    metadata: &LayoutMetadata,
    overlap: f32,
    sheet: &PageSettings,
) -> Vec<PrintPage> {
    let rows = metadata.poster_rows.max(1);
    let columns = metadata.poster_columns.max(1);
    let area = sheet.content_rect();
    let mut output = Vec::with_capacity(pages.len() * metadata.poster_tile_count() as usize);

    for (index, page) in pages.iter().enumerate() {
        let bounds = page.settings.content_rect();
        let tile_width = bounds.width / columns as f32;
        let tile_height = bounds.height / rows as f32;
        for row in 0..rows {
            for column in 0..columns {
                let slice = Rect::new(
                    bounds.x + column as f32 * tile_width,
                    bounds.y + row as f32 * tile_height,
                    tile_width,
                    tile_height,
                )
                .outset(overlap)
                .intersect(&bounds);
                let tile = TilePlacement {
                    content: page.content.clone(),
                    source_page: index as u32 + 1,
                    source: slice,
                    target: area.fit(slice.size()),
                    rotation: Rotation::None,
                };
                output.push(sheet_page(vec![tile], sheet, output.len()));
            }
        }
    }
    output
}

/// Cells of a `rows × columns` grid inside `area`, row-major.
fn grid_cells(area: &Rect, rows: u32, columns: u32, spacing: f32) -> Vec<Rect> {
    let rows = rows.max(1);
    let columns = columns.max(1);
    let width = ((area.width - spacing * (columns - 1) as f32) / columns as f32).max(0.0);
    let height = ((area.height - spacing * (rows - 1) as f32) / rows as f32).max(0.0);
    (0..rows)
        .flat_map(|row| {
            (0..columns).map(move |column| {
                Rect::new(
                    area.x + column as f32 * (width + spacing),
                    area.y + row as f32 * (height + spacing),
                    width,
                    height,
                )
            })
        })
        .collect()
}

fn cell_for(cells: &[Rect], order: NUpOrder, slot: u32, rows: u32, columns: u32) -> Rect {
    let (row, column) = order.cell(slot, rows, columns);
    cells
        .get((row * columns.max(1) + column) as usize)
        .copied()
        .unwrap_or_default()
}

fn whole_page_tile(page: &PrintPage, index: usize, cell: Rect, rotation: Rotation) -> TilePlacement {
    let size: Size = page.page_size();
    TilePlacement {
        content: page.content.clone(),
        source_page: index as u32 + 1,
        source: Rect::from_size(size),
        target: cell.fit(size),
        rotation,
    }
}

fn sheet_page(placements: Vec<TilePlacement>, sheet: &PageSettings, index: usize) -> PrintPage {
    let content = if placements.is_empty() {
        PageContent::Blank
    } else {
        PageContent::Composite(Arc::from(placements))
    };
    PrintPage::new(content, *sheet).with_page_number(index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Margin, Orientation, PaperSize};

    fn pages(count: usize) -> Vec<PrintPage> {
        (1..=count)
            .map(|n| PrintPage::blank(PageSettings::default()).with_page_number(n as u32))
            .collect()
    }

    fn options(kind: LayoutKind) -> PrintOptions {
        PrintOptions {
            layout_kind: kind,
            ..PrintOptions::default()
        }
    }

    #[test]
    fn empty_input_stays_empty() {
        for kind in [
            LayoutKind::Standard,
            LayoutKind::NUp,
            LayoutKind::Booklet,
            LayoutKind::Poster,
        ] {
            assert!(apply_layout(Vec::new(), &options(kind)).is_empty());
        }
    }

    #[test]
    fn nup_leaves_trailing_slots_blank() {
        let options = PrintOptions {
            nup_rows: 2,
            nup_columns: 2,
            ..options(LayoutKind::NUp)
        };
        let output = apply_layout(pages(5), &options);
        assert_eq!(output.len(), 2);
        assert_eq!(output[0].tile_sources(), vec![1, 2, 3, 4]);
        assert_eq!(output[1].tile_sources(), vec![5]);
    }

    #[test]
    fn nup_order_controls_cell_assignment() {
        let options = PrintOptions {
            nup_rows: 1,
            nup_columns: 2,
            nup_order: NUpOrder::RightToLeftTopToBottom,
            margins: Margin::zero(),
            orientation: Orientation::Landscape,
            ..options(LayoutKind::NUp)
        };
        let output = apply_layout(pages(2), &options);
        let tiles = output[0].content.placements();
        assert!(tiles[0].target.x > tiles[1].target.x);
    }

    #[test]
    fn booklet_six_pages_pads_with_blank_slots() {
        let output = apply_layout(pages(6), &options(LayoutKind::Booklet));
        assert_eq!(output.len(), 4);
        // padded to 8: sheet 0 front (8, 1) -> only 1 exists
        assert_eq!(output[0].tile_sources(), vec![1]);
        assert_eq!(output[1].tile_sources(), vec![2]);
        assert_eq!(output[2].tile_sources(), vec![6, 3]);
        assert_eq!(output[3].tile_sources(), vec![4, 5]);
    }

    #[test]
    fn short_edge_binding_turns_reverse_sides() {
        let options = PrintOptions {
            booklet_bind_long_edge: false,
            ..options(LayoutKind::Booklet)
        };
        let output = apply_layout(pages(4), &options);
        let front = output[0].content.placements();
        let back = output[1].content.placements();
        assert!(front.iter().all(|tile| tile.rotation == Rotation::None));
        assert!(back.iter().all(|tile| tile.rotation == Rotation::Half));
        // page 2 sits in the left half before the turn, so it ends up on the right
        assert!(back[0].target.x > back[1].target.x);
    }

    #[test]
    fn poster_overlap_widens_interior_slices() {
        let options = PrintOptions {
            poster_rows: 1,
            poster_columns: 2,
            poster_overlap_pt: 10.0,
            paper: PaperSize::from_points(200.0, 100.0),
            ..options(LayoutKind::Poster)
        };
        let mut source = pages(1);
        source[0].settings.paper = PaperSize::from_points(200.0, 100.0);
        source[0].settings.margins = Margin::zero();
        let output = apply_layout(source, &options);
        assert_eq!(output.len(), 2);
        let left = &output[0].content.placements()[0];
        let right = &output[1].content.placements()[0];
        assert!((left.source.width - 110.0).abs() < 0.01);
        assert!((right.source.x - 90.0).abs() < 0.01);
        assert!(left.target.width > 0.0);
    }

    #[test]
    fn poster_slices_cover_only_the_content_rect() {
        let options = PrintOptions {
            poster_rows: 2,
            poster_columns: 2,
            ..options(LayoutKind::Poster)
        };
        let source = pages(1);
        let content = source[0].settings.content_rect();
        assert!(content.x > 0.0 && content.y > 0.0);

        let output = apply_layout(source, &options);
        assert_eq!(output.len(), 4);
        let first = &output[0].content.placements()[0];
        assert!((first.source.x - content.x).abs() < 0.01);
        assert!((first.source.y - content.y).abs() < 0.01);
        assert!((first.source.width - content.width / 2.0).abs() < 0.01);

        let last = &output[3].content.placements()[0];
        let right = last.source.x + last.source.width;
        let bottom = last.source.y + last.source.height;
        assert!((right - (content.x + content.width)).abs() < 0.01);
        assert!((bottom - (content.y + content.height)).abs() < 0.01);
    }
}
