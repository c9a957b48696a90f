use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::display::Size;
use crate::options::PrintOptions;

/// Opaque identifier for a print session.
/// 列印工作階段的不透明識別碼。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrintSessionId(u64);

impl PrintSessionId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for PrintSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrintSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "print-session-{}", self.0)
    }
}

/// Orientation of a print page.
/// 列印頁面的方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Duplex (two-sided) printing mode.
/// 雙面列印模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplexMode {
    #[default]
    Off,
    LongEdge,
    ShortEdge,
}

/// Colour mode for the printer.
/// 印表機的色彩模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintColorMode {
    #[default]
    Color,
    Grayscale,
}

/// Inclusive, 1-based page range.
/// 包含首尾、從 1 起算的頁面範圍。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageRange {
    #[default]
    All,
    Range { start: u32, end: u32 },
    Selection(Vec<u32>),
}

impl PageRange {
    /// Whether the 1-based `page` falls inside the range.
    /// 判斷從 1 起算的 `page` 是否位於範圍內。
    pub fn contains(&self, page: u32) -> bool {
        match self {
            PageRange::All => true,
            PageRange::Range { start, end } => *start <= page && page <= *end,
            PageRange::Selection(set) => set.contains(&page),
        }
    }
}

/// Margin values expressed in points (1/72").
/// 以點（1/72 吋）表示的邊界值。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margin {
    pub const fn zero() -> Self {
        Self::uniform(0.0)
    }

    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::zero()
    }
}

/// Supported paper identifiers for quick selection.
/// 可快速選擇的紙張識別碼。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaperId {
    A4,
    Letter,
    Legal,
    A3,
    Custom,
}

/// Represents a paper size in millimetres.
/// 以公釐表示的紙張尺寸。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperSize {
    pub id: PaperId,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PaperSize {
    pub const A4: Self = Self::new(PaperId::A4, 210.0, 297.0);
    pub const A3: Self = Self::new(PaperId::A3, 297.0, 420.0);
    pub const LETTER: Self = Self::new(PaperId::Letter, 215.9, 279.4);
    pub const LEGAL: Self = Self::new(PaperId::Legal, 215.9, 355.6);

    pub const fn new(id: PaperId, width_mm: f32, height_mm: f32) -> Self {
        Self {
            id,
            width_mm,
            height_mm,
        }
    }

    /// Builds a custom paper size from a width and height in points.
    /// 以點為單位的寬高建立自訂紙張尺寸。
    pub fn from_points(width_pt: f32, height_pt: f32) -> Self {
        Self::new(
            PaperId::Custom,
            width_pt / 72.0 * MM_PER_INCH,
            height_pt / 72.0 * MM_PER_INCH,
        )
    }

    pub const fn to_points(&self, orientation: Orientation) -> (f32, f32) {
        let width_pt = self.width_mm / MM_PER_INCH * 72.0;
        let height_pt = self.height_mm / MM_PER_INCH * 72.0;
        match orientation {
            Orientation::Portrait => (width_pt, height_pt),
            Orientation::Landscape => (height_pt, width_pt),
        }
    }

    pub fn size(&self, orientation: Orientation) -> Size {
        let (width, height) = self.to_points(orientation);
        Size { width, height }
    }

    /// Media name as printers usually advertise it.
    /// 印表機常用的紙材名稱。
    pub fn media_name(&self) -> String {
        match self.id {
            PaperId::A4 => "iso_a4".to_string(),
            PaperId::A3 => "iso_a3".to_string(),
            PaperId::Letter => "na_letter".to_string(),
            PaperId::Legal => "na_legal".to_string(),
            PaperId::Custom => format!("custom_{:.1}x{:.1}mm", self.width_mm, self.height_mm),
        }
    }
}

impl Default for PaperSize {
    fn default() -> Self {
        Self::A4
    }
}

const MM_PER_INCH: f32 = 25.4;

/// Printer target metadata.
/// 目標印表機的描述資訊。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintTarget {
    pub name: String,
    pub capabilities: TargetCapabilities,
}

/// Feature capabilities exposed by a printer.
/// 印表機提供的功能能力。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCapabilities {
    pub supports_color: bool,
    pub supports_duplex: bool,
    pub supports_vector: bool,
}

impl TargetCapabilities {
    pub const fn new(supports_color: bool, supports_duplex: bool, supports_vector: bool) -> Self {
        Self {
            supports_color,
            supports_duplex,
            supports_vector,
        }
    }
}

impl Default for TargetCapabilities {
    fn default() -> Self {
        Self::new(true, true, true)
    }
}

/// Printer-facing job attributes.
/// 提供給印表機的列印工作屬性。
#[derive(Debug, Clone, PartialEq)]
pub struct PrintTicket {
    pub copies: u32,
    pub duplex: DuplexMode,
    pub color_mode: PrintColorMode,
    pub media: PaperSize,
    pub orientation: Orientation,
    pub extensions: BTreeMap<String, String>,
}

impl Default for PrintTicket {
    fn default() -> Self {
        Self {
            copies: 1,
            duplex: DuplexMode::Off,
            color_mode: PrintColorMode::Color,
            media: PaperSize::default(),
            orientation: Orientation::Portrait,
            extensions: BTreeMap::new(),
        }
    }
}

impl PrintTicket {
    /// Ticket whose media and orientation follow the given options.
    /// 紙材與方向跟隨指定選項的列印票據。
    pub fn from_options(options: &PrintOptions) -> Self {
        let mut ticket = Self::default();
        ticket.sync_page_setup(options);
        ticket
    }

    /// Copies paper and orientation from the options into the ticket.
    /// 將選項中的紙張與方向同步到票據。
    pub fn sync_page_setup(&mut self, options: &PrintOptions) {
        self.media = options.paper;
        self.orientation = options.orientation;
    }

    /// Drops the attributes the target cannot honour.
    /// 移除目標印表機無法支援的屬性。
    pub fn constrain_to(&mut self, capabilities: &TargetCapabilities) {
        if !capabilities.supports_color {
            self.color_mode = PrintColorMode::Grayscale;
        }
        if !capabilities.supports_duplex {
            self.duplex = DuplexMode::Off;
        }
        self.copies = self.copies.max(1);
    }

    pub fn extension(&self, key: &str) -> Option<&str> {
        self.extensions.get(key).map(String::as_str)
    }

    pub fn set_extension(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extensions.insert(key.into(), value.into());
    }
}
