//! Source documents a print session can paginate.

use std::ops::Range;

use crate::cancel::CancelToken;
use crate::error::{DocumentError, PreviewError};
use crate::layout::{HighlightSpan, LayoutInput, SimplePaginator, TextStyle};
use crate::page::{PageSettings, PrintPage};

/// Parameters handed to [`PrintDocument::paginate`].
pub struct PaginationRequest<'a> {
    pub settings: &'a PageSettings,
    pub selection_only: bool,
    pub cancel: &'a dyn CancelToken,
}

/// Something that can be split into printable pages.
///
/// Implementations must check `request.cancel` between pages.
pub trait PrintDocument: Send + Sync {
    fn paginate(&self, request: &PaginationRequest<'_>) -> Result<Vec<PrintPage>, PreviewError>;

    fn title(&self) -> &str {
        ""
    }
}

/// Prebuilt pages, e.g. produced by an external visual renderer.
#[derive(Debug, Clone, Default)]
pub struct PageListDocument {
    title: String,
    pages: Vec<PrintPage>,
    selection: Option<Vec<usize>>,
}

impl PageListDocument {
    pub fn new(title: impl Into<String>, pages: Vec<PrintPage>) -> Self {
        Self {
            title: title.into(),
            pages,
            selection: None,
        }
    }

    /// Marks the 0-based page indices that make up the current selection.
    pub fn with_selection(mut self, indices: Vec<usize>) -> Self {
        self.selection = Some(indices);
        self
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PrintDocument for PageListDocument {
    fn paginate(&self, request: &PaginationRequest<'_>) -> Result<Vec<PrintPage>, PreviewError> {
        let indices: Vec<usize> = if request.selection_only {
            self.selection
                .clone()
                .ok_or(DocumentError::NoSelection)?
        } else {
            (0..self.pages.len()).collect()
        };

        let mut pages = Vec::with_capacity(indices.len());
        for index in indices {
            request.cancel.check()?;
            if let Some(page) = self.pages.get(index) {
                pages.push(page.clone());
            }
        }
        Ok(pages)
    }

    fn title(&self) -> &str {
        &self.title
    }
}

/// Plain text laid out with [`SimplePaginator`] against the session's page setup.
#[derive(Debug, Clone, Default)]
pub struct TextDocument {
    title: String,
    lines: Vec<String>,
    spans: Vec<Vec<HighlightSpan>>,
    selection: Option<Range<usize>>,
    style: TextStyle,
}

impl TextDocument {
    pub fn new(title: impl Into<String>, text: &str) -> Self {
        Self::from_lines(title, text.lines().map(str::to_string).collect())
    }

    pub fn from_lines(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
            spans: Vec::new(),
            selection: None,
            style: TextStyle::default(),
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Colour spans per line, indexed like the lines.
    pub fn with_highlights(mut self, spans: Vec<Vec<HighlightSpan>>) -> Self {
        self.spans = spans;
        self
    }

    /// Selected line range (exclusive end).
    pub fn with_selection(mut self, lines: Range<usize>) -> Self {
        self.selection = Some(lines);
        self
    }
}

struct LineWindow<'a> {
    document: &'a TextDocument,
    range: Range<usize>,
}

impl LayoutInput for LineWindow<'_> {
    fn line_count(&self) -> usize {
        self.range.len()
    }

    fn line_text(&self, index: usize) -> Option<&str> {
        self.document
            .lines
            .get(self.range.start + index)
            .map(String::as_str)
    }

    fn highlight_spans(&self, index: usize) -> Vec<HighlightSpan> {
        self.document
            .spans
            .get(self.range.start + index)
            .cloned()
            .unwrap_or_default()
    }
}

impl PrintDocument for TextDocument {
    fn paginate(&self, request: &PaginationRequest<'_>) -> Result<Vec<PrintPage>, PreviewError> {
        let range = if request.selection_only {
            let selection = self.selection.clone().ok_or(DocumentError::NoSelection)?;
            selection.start.min(self.lines.len())..selection.end.min(self.lines.len())
        } else {
            0..self.lines.len()
        };
        let window = LineWindow {
            document: self,
            range,
        };
        SimplePaginator.paginate(&window, request.settings, &self.style, request.cancel)
    }

    fn title(&self) -> &str {
        &self.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::NeverCancel;

    fn request(settings: &PageSettings, selection_only: bool) -> PaginationRequest<'_> {
        PaginationRequest {
            settings,
            selection_only,
            cancel: &NeverCancel,
        }
    }

    #[test]
    fn page_list_selection_picks_marked_pages() {
        let settings = PageSettings::default();
        let pages = (1..=4)
            .map(|n| PrintPage::blank(settings).with_page_number(n))
            .collect();
        let document = PageListDocument::new("deck", pages).with_selection(vec![1, 3]);

        let selected = document.paginate(&request(&settings, true)).unwrap();
        let numbers: Vec<_> = selected.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![Some(2), Some(4)]);
        assert_eq!(document.paginate(&request(&settings, false)).unwrap().len(), 4);
    }

    #[test]
    fn selection_only_without_selection_is_an_error() {
        let settings = PageSettings::default();
        let document = TextDocument::new("notes", "a\nb");
        let err = document.paginate(&request(&settings, true)).unwrap_err();
        assert!(matches!(err, PreviewError::Document(DocumentError::NoSelection)));
    }

    #[test]
    fn text_selection_limits_lines() {
        let settings = PageSettings::default();
        let text: String = (0..200).map(|n| format!("line {n}\n")).collect();
        let full = TextDocument::new("log", &text);
        let partial = full.clone().with_selection(0..10);

        assert!(full.paginate(&request(&settings, false)).unwrap().len() > 1);
        assert_eq!(partial.paginate(&request(&settings, true)).unwrap().len(), 1);
    }
}
