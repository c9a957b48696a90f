use std::sync::Arc;

use crate::display::{Point, PrintDisplayList, Rect, Size};
use crate::job::{Margin, Orientation, PaperSize};

/// Physical page setup a page is laid out against.
/// 頁面排版所依據的實體頁面設定。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSettings {
    pub paper: PaperSize,
    pub orientation: Orientation,
    pub margins: Margin,
    /// Restrict content to the area inside the margins.
    /// 將內容限制在邊界內的範圍。
    pub use_printable_area: bool,
    pub center_horizontally: bool,
    pub center_vertically: bool,
}

impl PageSettings {
    /// Page size in points for the current orientation.
    /// 依目前方向換算的頁面尺寸（點）。
    pub fn page_size(&self) -> Size {
        self.paper.size(self.orientation)
    }

    /// Rectangle content may occupy: the margin-inset area, or the whole page.
    /// 內容可佔用的矩形：扣除邊界後的範圍，或整張頁面。
    pub fn content_rect(&self) -> Rect {
        let size = self.page_size();
        if !self.use_printable_area {
            return Rect::from_size(size);
        }
        let m = self.margins;
        Rect::new(
            m.left.max(0.0),
            m.top.max(0.0),
            (size.width - m.left.max(0.0) - m.right.max(0.0)).max(0.0),
            (size.height - m.top.max(0.0) - m.bottom.max(0.0)).max(0.0),
        )
    }
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            paper: PaperSize::A4,
            orientation: Orientation::Portrait,
            margins: Margin::uniform(36.0),
            use_printable_area: true,
            center_horizontally: false,
            center_vertically: false,
        }
    }
}

/// How a tile is turned when it is placed on a sheet.
/// 拼版時圖塊放上紙張的旋轉方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Half,
}

/// One source page (or a slice of it) placed onto an output sheet.
/// 放置到輸出紙張上的一個來源頁面（或其切片）。
#[derive(Debug, Clone)]
pub struct TilePlacement {
    pub content: PageContent,
    /// 1-based position of the source page in the sequence that was laid out.
    pub source_page: u32,
    /// Region of the source page shown, in source page points.
    pub source: Rect,
    /// Region of the sheet it occupies, in sheet points.
    pub target: Rect,
    pub rotation: Rotation,
}

/// Renderable content reference of a page.
/// 頁面可渲染內容的參照。
#[derive(Debug, Clone, Default)]
pub enum PageContent {
    #[default]
    Blank,
    Display(Arc<PrintDisplayList>),
    Composite(Arc<[TilePlacement]>),
}

impl PageContent {
    /// Extents the content draws into, `None` when it draws nothing.
    /// 內容繪製的範圍；不繪製任何東西時為 `None`。
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            PageContent::Blank => None,
            PageContent::Display(list) => list.bounds(),
            PageContent::Composite(tiles) => tiles
                .iter()
                .map(|tile| tile.target)
                .reduce(|acc, rect| acc.union(&rect)),
        }
    }

    /// Tiles of a composite page; empty for any other content.
    /// 合成頁面的圖塊；其他內容回傳空切片。
    pub fn placements(&self) -> &[TilePlacement] {
        match self {
            PageContent::Composite(tiles) => tiles,
            _ => &[],
        }
    }
}

/// Page geometry resolved for one output resolution.
/// 針對單一輸出解析度計算出的頁面幾何資訊。
#[derive(Debug, Clone, PartialEq)]
pub struct PrintPageMetrics {
    pub page_size: Size,
    pub content_rect: Rect,
    pub content_scale: f32,
    pub content_offset: Point,
    pub dpi_x: f32,
    pub dpi_y: f32,
}

impl PrintPageMetrics {
    pub fn pixel_width(&self) -> u32 {
        (self.page_size.width * self.dpi_x / 72.0).ceil().max(1.0) as u32
    }

    pub fn pixel_height(&self) -> u32 {
        (self.page_size.height * self.dpi_y / 72.0).ceil().max(1.0) as u32
    }
}

/// One logical page ready for layout, normalisation and rendering.
/// 可供拼版、正規化與渲染的單一邏輯頁面。
#[derive(Debug, Clone)]
pub struct PrintPage {
    pub content: PageContent,
    pub settings: PageSettings,
    pub page_break_after: bool,
    pub page_number: Option<u32>,
    pub metrics: Option<Arc<PrintPageMetrics>>,
}

impl PrintPage {
    /// Creates a page without a number or metrics.
    /// 建立尚無頁碼與度量資訊的頁面。
    pub fn new(content: PageContent, settings: PageSettings) -> Self {
        Self {
            content,
            settings,
            page_break_after: false,
            page_number: None,
            metrics: None,
        }
    }

    pub fn blank(settings: PageSettings) -> Self {
        Self::new(PageContent::Blank, settings)
    }

    pub fn from_display_list(list: PrintDisplayList, settings: PageSettings) -> Self {
        Self::new(PageContent::Display(Arc::new(list)), settings)
    }

    pub fn with_page_number(mut self, number: u32) -> Self {
        self.page_number = Some(number);
        self
    }

    pub fn with_page_break_after(mut self, page_break_after: bool) -> Self {
        self.page_break_after = page_break_after;
        self
    }

    /// Same page wrapping `metrics`; existing metrics are replaced, never edited.
    /// 附上 `metrics` 的同一頁面；既有度量資訊只會被取代，不會被修改。
    pub fn with_metrics(mut self, metrics: Arc<PrintPageMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn page_size(&self) -> Size {
        self.settings.page_size()
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.content, PageContent::Blank)
    }

    /// Source positions carried by a tiled page, in placement order.
    /// 拼版頁面所承載的來源頁位置，依放置順序排列。
    pub fn tile_sources(&self) -> Vec<u32> {
        self.content
            .placements()
            .iter()
            .map(|tile| tile.source_page)
            .collect()
    }
}
