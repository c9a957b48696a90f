use std::fmt;

/// Drawing commands for one page, in page points with a top-left origin.
/// 單一頁面的繪圖指令，以頁面點為單位、原點在左上角。
#[derive(Debug, Clone, Default)]
pub struct PrintDisplayList {
    pub commands: Vec<DisplayCommand>,
}

impl PrintDisplayList {
    /// Append a command to the display list.
    /// 將指令加入繪圖清單。
    pub fn push(&mut self, command: DisplayCommand) {
        self.commands.push(command);
    }

    /// Returns true if the display list is empty.
    /// 繪圖清單為空時回傳 true。
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Union of the extents of every command, `None` for an empty list.
    /// 所有指令範圍的聯集；清單為空時為 `None`。
    pub fn bounds(&self) -> Option<Rect> {
        self.commands
            .iter()
            .map(DisplayCommand::bounds)
            .reduce(|acc, rect| acc.union(&rect))
    }
}

/// Low-level drawing commands emitted by pagination.
/// 分頁階段產生的低階繪圖指令。
#[derive(Debug, Clone)]
pub enum DisplayCommand {
    GlyphRun(GlyphRun),
    BackgroundRect(Rectangle),
    HorizontalRule {
        start: Point,
        end: Point,
        stroke: Stroke,
    },
}

impl DisplayCommand {
    pub fn bounds(&self) -> Rect {
        match self {
            DisplayCommand::GlyphRun(run) => Rect::new(
                run.position.x,
                run.position.y,
                run.estimated_width(),
                run.line_height(),
            ),
            DisplayCommand::BackgroundRect(rect) => Rect::from_origin_size(rect.origin, rect.size),
            DisplayCommand::HorizontalRule { start, end, stroke } => Rect::new(
                start.x.min(end.x),
                start.y - stroke.width / 2.0,
                (end.x - start.x).abs(),
                stroke.width,
            ),
        }
    }
}

/// Describes an individual shaped glyph run.
/// 描述單一已排版的字形串。
#[derive(Debug, Clone)]
pub struct GlyphRun {
    pub text: String,
    pub font_family: String,
    pub font_size_pt: f32,
    pub position: Point,
    pub color: Color,
    pub background: Option<Color>,
}

impl GlyphRun {
    /// Width estimate used when no font metrics are available.
    /// 缺少字型度量時使用的寬度估計。
    pub fn estimated_width(&self) -> f32 {
        estimate_text_width(&self.text, self.font_size_pt.max(1.0))
    }

    pub fn line_height(&self) -> f32 {
        (self.font_size_pt * 1.1).max(1.0)
    }
}

/// Rough advance width of `text` at `font_size`, in points.
/// 以 `font_size` 粗估 `text` 的前進寬度（點）。
pub fn estimate_text_width(text: &str, font_size: f32) -> f32 {
    (text.chars().count() as f32) * font_size * 0.6
}

/// Represents a rectangular region (e.g. for line background).
/// 表示矩形區域（例如行背景）。
#[derive(Debug, Clone, Copy)]
pub struct Rectangle {
    pub origin: Point,
    pub size: Size,
    pub color: Color,
}

/// 2D size representation.
/// 二維尺寸。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// 2D coordinate.
/// 二維座標。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle with a top-left origin.
/// 原點在左上角的軸對齊矩形。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Overlapping region; empty (zero-sized) when the rectangles do not meet.
    /// 重疊區域；矩形不相交時為零尺寸的空矩形。
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect::new(x, y, (right - x).max(0.0), (bottom - y).max(0.0))
    }

    /// Grows the rectangle by `amount` on every side.
    /// 將矩形每一邊向外擴張 `amount`。
    pub fn outset(&self, amount: f32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Largest rectangle with `size`'s aspect ratio centred inside `self`.
    /// 在 `self` 內置中、符合 `size` 長寬比的最大矩形。
    pub fn fit(&self, size: Size) -> Rect {
        if size.is_empty() || self.is_empty() {
            return Rect::new(self.center().x, self.center().y, 0.0, 0.0);
        }
        let scale = (self.width / size.width).min(self.height / size.height);
        let width = size.width * scale;
        let height = size.height * scale;
        Rect::new(
            self.x + (self.width - width) / 2.0,
            self.y + (self.height - height) / 2.0,
            width,
            height,
        )
    }

    /// Point reflection through the centre of `frame` (a 180° turn).
    /// 以 `frame` 中心做點對稱（旋轉 180°）。
    pub fn rotated_half_within(&self, frame: &Rect) -> Rect {
        Rect::new(
            frame.x + frame.right() - self.right(),
            frame.y + frame.bottom() - self.bottom(),
            self.width,
            self.height,
        )
    }
}

/// Scale-and-translate transform: `x' = a·x + e`, `y' = d·y + f`.
///
/// Negative `a`/`d` express the 180° turn used on booklet reverse sides.
/// 負的 `a`/`d` 表示小冊子背面使用的 180° 旋轉。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub const fn new(a: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, d, e, f }
    }

    pub const fn scale(factor: f32) -> Self {
        Self::new(factor, factor, 0.0, 0.0)
    }

    /// Maps `source` onto `target`, optionally turned by 180°.
    /// 將 `source` 對應到 `target`，可選擇旋轉 180°。
    pub fn map_rect(source: &Rect, target: &Rect, half_turn: bool) -> Self {
        let sx = if source.width > 0.0 {
            target.width / source.width
        } else {
            1.0
        };
        let sy = if source.height > 0.0 {
            target.height / source.height
        } else {
            1.0
        };
        let mapped = Self::new(sx, sy, target.x - source.x * sx, target.y - source.y * sy);
        if half_turn {
            let c = target.center();
            mapped.then(&Self::new(-1.0, -1.0, 2.0 * c.x, 2.0 * c.y))
        } else {
            mapped
        }
    }

    /// Applies `self` first, then `next`.
    /// 先套用 `self`，再套用 `next`。
    pub fn then(&self, next: &Transform) -> Transform {
        Transform::new(
            next.a * self.a,
            next.d * self.d,
            next.a * self.e + next.e,
            next.d * self.f + next.f,
        )
    }

    pub fn apply(&self, point: Point) -> Point {
        Point::new(self.a * point.x + self.e, self.d * point.y + self.f)
    }

    /// Transformed rectangle, normalised to a positive width and height.
    /// 轉換後的矩形，寬高正規化為正值。
    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        let p0 = self.apply(Point::new(rect.x, rect.y));
        let p1 = self.apply(Point::new(rect.right(), rect.bottom()));
        let x = p0.x.min(p1.x);
        let y = p0.y.min(p1.y);
        Rect::new(x, y, (p1.x - p0.x).abs(), (p1.y - p0.y).abs())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// RGBA color stored in normalized floating-point form.
/// 以正規化浮點數儲存的 RGBA 色彩。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Stroke descriptor for simple line drawing.
/// 簡單線條繪製的筆畫描述。
#[derive(Debug, Clone, Copy)]
pub struct Stroke {
    pub width: f32,
    pub color: Color,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({:.3}, {:.3}, {:.3}, {:.3})",
            self.r, self.g, self.b, self.a
        )
    }
}
