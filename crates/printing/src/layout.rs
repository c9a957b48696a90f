use crate::cancel::CancelToken;
use crate::display::{Color, DisplayCommand, GlyphRun, Point, PrintDisplayList, Rectangle, Size};
use crate::error::PreviewError;
use crate::page::{PageSettings, PrintPage};

/// Wrap mode for line pagination.
/// 逐行分頁時採用的換行模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    NoWrap,
    /// Break lines at the last character that fits the content width.
    /// 在內容寬度可容納的最後一個字元處斷行。
    Character,
}

/// Typography used when paginating plain lines.
/// 分頁純文字行時使用的字型設定。
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size_pt: f32,
    pub line_height_pt: f32,
    pub average_char_width_pt: f32,
    pub wrap_mode: WrapMode,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_size_pt: 11.0,
            line_height_pt: 14.0,
            average_char_width_pt: 6.6,
            wrap_mode: WrapMode::NoWrap,
        }
    }
}

/// Line source consumed by the paginator.
/// 分頁器讀取的行來源。
pub trait LayoutInput {
    /// Number of lines available.
    /// 可用的行數。
    fn line_count(&self) -> usize;
    fn line_text(&self, index: usize) -> Option<&str>;
    fn highlight_spans(&self, index: usize) -> Vec<HighlightSpan> {
        let _ = index;
        Vec::new()
    }
}

/// Highlight span metadata used by renderers to colourise glyph runs.
/// 供渲染器為字形串上色的語法標示範圍。
#[derive(Debug, Clone)]
pub struct HighlightSpan {
    pub range: std::ops::Range<usize>,
    pub foreground: Color,
    pub background: Option<Color>,
}

impl HighlightSpan {
    /// Creates a span covering the byte range `start..end`.
    /// 建立涵蓋位元組範圍 `start..end` 的標示。
    pub fn new(start: usize, end: usize, foreground: Color, background: Option<Color>) -> Self {
        Self {
            range: start..end,
            foreground,
            background,
        }
    }
}

/// Constant line-height paginator producing one display list per page.
/// 以固定行高分頁、每頁產生一份繪圖清單的分頁器。
#[derive(Debug, Default)]
pub struct SimplePaginator;

impl SimplePaginator {
    /// Lays out every line of `input`; an empty input still yields one blank
    /// page. Cancellation is checked once per finished page.
    /// 排版 `input` 的每一行；空輸入仍產生一頁空白頁，每完成一頁檢查一次取消。
    pub fn paginate(
        &self,
        input: &dyn LayoutInput,
        settings: &PageSettings,
        style: &TextStyle,
        cancel: &dyn CancelToken,
    ) -> Result<Vec<PrintPage>, PreviewError> {
        let line_height = style.line_height_pt.max(1.0);
        let char_width = style.average_char_width_pt.max(1.0);
        let area = settings.content_rect();
        let lines_per_page = (area.height.max(line_height) / line_height)
            .floor()
            .max(1.0) as usize;
        let chars_per_line = ((area.width / char_width).floor() as usize).max(1);

        let mut pages = Vec::new();
        let mut current = PrintDisplayList::default();
        let mut rows_on_page = 0usize;

        for line_idx in 0..input.line_count() {
            let text = input.line_text(line_idx).unwrap_or_default();
            let char_len = text.chars().count();
            let mut spans = input.highlight_spans(line_idx);
            if spans.is_empty() {
                spans.push(HighlightSpan::new(0, char_len, Color::BLACK, None));
            }

            let segments = match style.wrap_mode {
                WrapMode::NoWrap => vec![0..char_len],
                WrapMode::Character => wrap_segments(char_len, chars_per_line),
            };

            for segment in segments {
                if rows_on_page == lines_per_page {
                    cancel.check()?;
                    pages.push(finish_page(std::mem::take(&mut current), settings, pages.len()));
                    rows_on_page = 0;
                }

                let y = area.y + rows_on_page as f32 * line_height;
                for span in &spans {
                    let start = span.range.start.max(segment.start).min(segment.end);
                    let end = span.range.end.max(segment.start).min(segment.end);
                    if start >= end {
                        continue;
                    }
                    let (start_byte, end_byte) = char_range_to_byte_range(text, start, end);
                    let slice = &text[start_byte..end_byte];
                    if slice.is_empty() {
                        continue;
                    }

                    let x = area.x + (start - segment.start) as f32 * char_width;
                    let width = (end - start) as f32 * char_width;
                    if let Some(bg) = span.background {
                        current.push(DisplayCommand::BackgroundRect(Rectangle {
                            origin: Point { x, y },
                            size: Size {
                                width,
                                height: line_height,
                            },
                            color: bg,
                        }));
                    }
                    current.push(DisplayCommand::GlyphRun(GlyphRun {
                        text: slice.to_string(),
                        font_family: style.font_family.clone(),
                        font_size_pt: style.font_size_pt,
                        position: Point { x, y },
                        color: span.foreground,
                        background: span.background,
                    }));
                }
                rows_on_page += 1;
            }
        }

        if rows_on_page > 0 || pages.is_empty() {
            cancel.check()?;
            pages.push(finish_page(current, settings, pages.len()));
        }
        Ok(pages)
    }
}

fn finish_page(list: PrintDisplayList, settings: &PageSettings, index: usize) -> PrintPage {
    PrintPage::from_display_list(list, *settings).with_page_number(index as u32 + 1)
}

fn wrap_segments(char_len: usize, chars_per_line: usize) -> Vec<std::ops::Range<usize>> {
    if char_len == 0 {
        return vec![0..0];
    }
    (0..char_len)
        .step_by(chars_per_line)
        .map(|start| start..(start + chars_per_line).min(char_len))
        .collect()
}

fn char_range_to_byte_range(text: &str, start: usize, end: usize) -> (usize, usize) {
    (
        char_pos_to_byte_index(text, start),
        char_pos_to_byte_index(text, end),
    )
}

fn char_pos_to_byte_index(text: &str, target: usize) -> usize {
    text.char_indices()
        .nth(target)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::{CancellationToken, NeverCancel};
    use crate::job::{Margin, PaperSize};
    use crate::page::PageContent;
    use ron::de::from_str as ron_from_str;
    use serde::Deserialize;
    use std::collections::HashMap;

    struct VecLayoutInput {
        lines: Vec<String>,
        spans: HashMap<usize, Vec<HighlightSpan>>,
    }

    impl VecLayoutInput {
        fn new(lines: Vec<String>) -> Self {
            Self {
                lines,
                spans: HashMap::new(),
            }
        }
    }

    impl LayoutInput for VecLayoutInput {
        fn line_count(&self) -> usize {
            self.lines.len()
        }

        fn line_text(&self, index: usize) -> Option<&str> {
            self.lines.get(index).map(|line| line.as_str())
        }

        fn highlight_spans(&self, index: usize) -> Vec<HighlightSpan> {
            self.spans.get(&index).cloned().unwrap_or_default()
        }
    }

    // 66pt tall page with 12pt lines holds five lines.
    fn settings() -> PageSettings {
        PageSettings {
            paper: PaperSize::from_points(141.73, 66.0),
            margins: Margin::zero(),
            ..PageSettings::default()
        }
    }

    fn style() -> TextStyle {
        TextStyle {
            font_family: "JetBrains Mono".to_string(),
            font_size_pt: 11.0,
            line_height_pt: 12.0,
            average_char_width_pt: 7.0,
            wrap_mode: WrapMode::NoWrap,
        }
    }

    fn command_count(page: &PrintPage) -> usize {
        match &page.content {
            PageContent::Display(list) => list.commands.len(),
            _ => 0,
        }
    }

    #[test]
    fn paginates_into_multiple_pages() {
        let lines: Vec<String> = (0..12).map(|idx| format!("Line {idx}")).collect();
        let pages = SimplePaginator
            .paginate(&VecLayoutInput::new(lines), &settings(), &style(), &NeverCancel)
            .unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(command_count(&pages[0]), 5);
        assert_eq!(command_count(&pages[2]), 2);
        assert_eq!(pages[2].page_number, Some(3));
    }

    #[test]
    fn empty_document_produces_single_blank_page() {
        let pages = SimplePaginator
            .paginate(&VecLayoutInput::new(Vec::new()), &settings(), &style(), &NeverCancel)
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(command_count(&pages[0]), 0);
    }

    #[test]
    fn character_wrap_splits_long_lines() {
        let mut style = style();
        style.wrap_mode = WrapMode::Character;
        // 141.73pt / 7pt => 20 characters per row
        let input = VecLayoutInput::new(vec!["x".repeat(45)]);
        let pages = SimplePaginator
            .paginate(&input, &settings(), &style, &NeverCancel)
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(command_count(&pages[0]), 3);
    }

    #[test]
    fn highlight_spans_produce_backgrounds() {
        let mut input = VecLayoutInput::new(vec!["rust".into()]);
        input.spans.insert(
            0,
            vec![
                HighlightSpan::new(0, 2, Color::new(1.0, 0.0, 0.0, 1.0), None),
                HighlightSpan::new(
                    2,
                    4,
                    Color::new(0.0, 0.0, 1.0, 1.0),
                    Some(Color::new(0.9, 0.9, 0.2, 1.0)),
                ),
            ],
        );
        let pages = SimplePaginator
            .paginate(&input, &settings(), &style(), &NeverCancel)
            .unwrap();
        let PageContent::Display(list) = &pages[0].content else {
            panic!("expected display content");
        };
        assert_eq!(list.commands.len(), 3);
        assert!(matches!(&list.commands[1], DisplayCommand::BackgroundRect(rect) if rect.color.r == 0.9));
        match &list.commands[2] {
            DisplayCommand::GlyphRun(run) => assert_eq!(run.text, "st"),
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn cancelled_token_stops_pagination() {
        let token = CancellationToken::new(1);
        token.cancel();
        let lines: Vec<String> = (0..12).map(|idx| format!("Line {idx}")).collect();
        let result =
            SimplePaginator.paginate(&VecLayoutInput::new(lines), &settings(), &style(), &token);
        assert!(matches!(result, Err(PreviewError::Cancelled)));
    }

    #[derive(Debug, Deserialize)]
    struct PaginationFixture {
        lines: usize,
        expected_commands: Vec<usize>,
    }

    #[test]
    fn pagination_matches_fixture_counts() {
        let fixture: PaginationFixture =
            ron_from_str(include_str!("../tests/fixtures/pagination.ron")).expect("fixture");
        let lines: Vec<String> = (0..fixture.lines).map(|idx| format!("row {idx}")).collect();
        let pages = SimplePaginator
            .paginate(&VecLayoutInput::new(lines), &settings(), &style(), &NeverCancel)
            .unwrap();
        let counts: Vec<usize> = pages.iter().map(command_count).collect();
        assert_eq!(counts, fixture.expected_commands);
    }
}
