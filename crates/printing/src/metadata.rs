//! Tiling parameters derived from the string-keyed layout options.
//!
//! Derivation is total: anything unknown or malformed falls back to the
//! defaults, and every row/column count ends up in `1..=MAX_TILES_PER_AXIS`.

use std::collections::BTreeMap;
use std::fmt;

/// Option keys understood by [`LayoutMetadata::derive`].
pub mod keys {
    pub const KIND: &str = "layout.kind";
    pub const NUP_ROWS: &str = "layout.nup.rows";
    pub const NUP_COLUMNS: &str = "layout.nup.columns";
    pub const NUP_ORDER: &str = "layout.nup.order";
    pub const BOOKLET_BIND_LONG_EDGE: &str = "layout.booklet.bindLongEdge";
    pub const POSTER_ROWS: &str = "layout.poster.rows";
    pub const POSTER_COLUMNS: &str = "layout.poster.columns";
}

/// Upper bound for a single row or column count.
pub const MAX_TILES_PER_AXIS: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutKind {
    #[default]
    Standard,
    NUp,
    Booklet,
    Poster,
}

impl LayoutKind {
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_token(value).as_str() {
            "standard" | "normal" | "none" => Some(Self::Standard),
            "nup" | "multiple" | "multipage" => Some(Self::NUp),
            "booklet" => Some(Self::Booklet),
            "poster" | "tile" | "tiled" => Some(Self::Poster),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::NUp => "NUp",
            Self::Booklet => "Booklet",
            Self::Poster => "Poster",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which consecutive pages fill the N-Up grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NUpOrder {
    #[default]
    LeftToRightTopToBottom,
    RightToLeftTopToBottom,
    TopToBottomLeftToRight,
    TopToBottomRightToLeft,
}

impl NUpOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_token(value).as_str() {
            "lefttorighttoptobottom" | "lrtb" | "horizontal" => Some(Self::LeftToRightTopToBottom),
            "righttolefttoptobottom" | "rltb" | "horizontalreversed" => {
                Some(Self::RightToLeftTopToBottom)
            }
            "toptobottomlefttoright" | "tblr" | "vertical" => Some(Self::TopToBottomLeftToRight),
            "toptobottomrighttoleft" | "tbrl" | "verticalreversed" => {
                Some(Self::TopToBottomRightToLeft)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftToRightTopToBottom => "LeftToRightTopToBottom",
            Self::RightToLeftTopToBottom => "RightToLeftTopToBottom",
            Self::TopToBottomLeftToRight => "TopToBottomLeftToRight",
            Self::TopToBottomRightToLeft => "TopToBottomRightToLeft",
        }
    }

    /// Grid cell `(row, column)` of the `index`-th page in a group.
    pub fn cell(&self, index: u32, rows: u32, columns: u32) -> (u32, u32) {
        let rows = rows.max(1);
        let columns = columns.max(1);
        match self {
            Self::LeftToRightTopToBottom => (index / columns, index % columns),
            Self::RightToLeftTopToBottom => (index / columns, columns - 1 - index % columns),
            Self::TopToBottomLeftToRight => (index % rows, index / rows),
            Self::TopToBottomRightToLeft => (index % rows, columns - 1 - index / rows),
        }
    }
}

impl fmt::Display for NUpOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutMetadata {
    pub kind: LayoutKind,
    pub nup_rows: u32,
    pub nup_columns: u32,
    pub nup_order: NUpOrder,
    pub booklet_bind_long_edge: bool,
    pub poster_rows: u32,
    pub poster_columns: u32,
}

impl Default for LayoutMetadata {
    fn default() -> Self {
        Self {
            kind: LayoutKind::Standard,
            nup_rows: 1,
            nup_columns: 1,
            nup_order: NUpOrder::LeftToRightTopToBottom,
            booklet_bind_long_edge: true,
            poster_rows: 1,
            poster_columns: 1,
        }
    }
}

impl LayoutMetadata {
    pub fn derive(options: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| lookup(options, key);
        let defaults = Self::default();

        Self {
            kind: get(keys::KIND)
                .and_then(LayoutKind::parse)
                .unwrap_or(defaults.kind),
            nup_rows: parse_count(get(keys::NUP_ROWS)),
            nup_columns: parse_count(get(keys::NUP_COLUMNS)),
            nup_order: get(keys::NUP_ORDER)
                .and_then(NUpOrder::parse)
                .unwrap_or(defaults.nup_order),
            booklet_bind_long_edge: get(keys::BOOKLET_BIND_LONG_EDGE)
                .and_then(parse_bool)
                .unwrap_or(defaults.booklet_bind_long_edge),
            poster_rows: parse_count(get(keys::POSTER_ROWS)),
            poster_columns: parse_count(get(keys::POSTER_COLUMNS)),
        }
    }

    pub fn nup_tile_count(&self) -> u32 {
        (self.nup_rows.max(1) * self.nup_columns.max(1)).max(1)
    }

    pub fn poster_tile_count(&self) -> u32 {
        (self.poster_rows.max(1) * self.poster_columns.max(1)).max(1)
    }
}

fn lookup<'a>(options: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    options
        .get(key)
        .or_else(|| {
            options
                .iter()
                .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
                .map(|(_, value)| value)
        })
        .map(String::as_str)
}

fn parse_count(value: Option<&str>) -> u32 {
    let Some(value) = value else {
        return 1;
    };
    let trimmed = value.trim();
    let parsed = trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(|number| number.trunc() as i64)
    });
    match parsed {
        Some(count) => count.clamp(1, MAX_TILES_PER_AXIS as i64) as u32,
        None => 1,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match normalize_token(value).as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

fn normalize_token(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !matches!(ch, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}
