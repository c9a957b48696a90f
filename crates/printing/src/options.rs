use std::collections::BTreeMap;

use crate::job::{Margin, Orientation, PageRange, PaperSize};
use crate::metadata::{keys, LayoutKind, LayoutMetadata, NUpOrder};
use crate::page::PageSettings;

/// User-chosen print options owned by a session.
///
/// Sessions keep these behind an `Arc` and replace the whole value on every
/// edit, so a running preview keeps reading the snapshot it started with.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintOptions {
    pub paper: PaperSize,
    pub margins: Margin,
    pub orientation: Orientation,
    pub use_printable_area: bool,
    pub center_horizontally: bool,
    pub center_vertically: bool,
    pub layout_kind: LayoutKind,
    pub nup_rows: u32,
    pub nup_columns: u32,
    pub nup_order: NUpOrder,
    pub booklet_bind_long_edge: bool,
    pub poster_rows: u32,
    pub poster_columns: u32,
    /// Overlap shared by adjacent poster tiles, in points.
    pub poster_overlap_pt: f32,
    /// Pages kept before layout; `PageRange::All` prints everything.
    pub page_range: PageRange,
    pub selection_only: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            paper: PaperSize::A4,
            margins: Margin::uniform(36.0),
            orientation: Orientation::Portrait,
            use_printable_area: true,
            center_horizontally: false,
            center_vertically: false,
            layout_kind: LayoutKind::Standard,
            nup_rows: 1,
            nup_columns: 1,
            nup_order: NUpOrder::LeftToRightTopToBottom,
            booklet_bind_long_edge: true,
            poster_rows: 1,
            poster_columns: 1,
            poster_overlap_pt: 0.0,
            page_range: PageRange::All,
            selection_only: false,
        }
    }
}

impl PrintOptions {
    /// String-keyed view of the layout options.
    pub fn layout_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(keys::KIND.to_string(), self.layout_kind.to_string());
        map.insert(keys::NUP_ROWS.to_string(), self.nup_rows.to_string());
        map.insert(keys::NUP_COLUMNS.to_string(), self.nup_columns.to_string());
        map.insert(keys::NUP_ORDER.to_string(), self.nup_order.to_string());
        map.insert(
            keys::BOOKLET_BIND_LONG_EDGE.to_string(),
            self.booklet_bind_long_edge.to_string(),
        );
        map.insert(keys::POSTER_ROWS.to_string(), self.poster_rows.to_string());
        map.insert(
            keys::POSTER_COLUMNS.to_string(),
            self.poster_columns.to_string(),
        );
        map
    }

    /// Recomputed on every call; options change too often for caching.
    pub fn layout_metadata(&self) -> LayoutMetadata {
        LayoutMetadata::derive(&self.layout_map())
    }

    /// Merges string-keyed layout options; malformed values degrade to defaults.
    pub fn apply_layout_map(&mut self, map: &BTreeMap<String, String>) {
        let mut merged = self.layout_map();
        merged.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
        let metadata = LayoutMetadata::derive(&merged);
        self.layout_kind = metadata.kind;
        self.nup_rows = metadata.nup_rows;
        self.nup_columns = metadata.nup_columns;
        self.nup_order = metadata.nup_order;
        self.booklet_bind_long_edge = metadata.booklet_bind_long_edge;
        self.poster_rows = metadata.poster_rows;
        self.poster_columns = metadata.poster_columns;
    }

    /// Sheet setup output pages are laid out against.
    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            paper: self.paper,
            orientation: self.orientation,
            margins: self.margins,
            use_printable_area: self.use_printable_area,
            center_horizontally: self.center_horizontally,
            center_vertically: self.center_vertically,
        }
    }

    pub fn poster_overlap(&self) -> f32 {
        if self.poster_overlap_pt.is_finite() {
            self.poster_overlap_pt.max(0.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_counts_derive_to_single_tiles() {
        let options = PrintOptions {
            layout_kind: LayoutKind::NUp,
            nup_rows: 0,
            nup_columns: 4,
            ..PrintOptions::default()
        };
        let metadata = options.layout_metadata();
        assert_eq!(metadata.kind, LayoutKind::NUp);
        assert_eq!(metadata.nup_tile_count(), 4);
    }

    #[test]
    fn apply_layout_map_merges_with_current_fields() {
        let mut options = PrintOptions {
            poster_rows: 3,
            ..PrintOptions::default()
        };
        let mut map = BTreeMap::new();
        map.insert(keys::KIND.to_string(), "Poster".to_string());
        map.insert(keys::POSTER_COLUMNS.to_string(), "2".to_string());
        options.apply_layout_map(&map);
        assert_eq!(options.layout_kind, LayoutKind::Poster);
        assert_eq!(options.poster_rows, 3);
        assert_eq!(options.poster_columns, 2);
    }

    #[test]
    fn negative_overlap_is_ignored() {
        let options = PrintOptions {
            poster_overlap_pt: -12.0,
            ..PrintOptions::default()
        };
        assert_eq!(options.poster_overlap(), 0.0);
    }
}
