use std::fmt::Write as _;

use crate::display::{Color, DisplayCommand, PrintDisplayList, Transform};
use crate::error::RenderError;
use crate::normalize::compute_metrics;
use crate::page::{PageContent, PrintPage, Rotation};
use crate::render::VectorRenderer;

/// Minimal PDF writer: one Helvetica font, pages drawn from display lists.
///
/// Every page stream flips the y axis first so drawing happens in the same
/// top-left page coordinates the layout uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfVectorRenderer;

impl VectorRenderer for PdfVectorRenderer {
    fn create_pdf_bytes(&self, pages: &[PrintPage]) -> Result<Vec<u8>, RenderError> {
        render_pdf_document(pages)
    }
}

fn render_pdf_document(pages: &[PrintPage]) -> Result<Vec<u8>, RenderError> {
    if pages.is_empty() {
        return Err(RenderError::Pdf("no pages to render".to_string()));
    }

    let mut builder = PdfBuilder::new();
    // Objects 1 and 2 are fixed so page dictionaries can reference the tree.
    let font_object = builder.add_object("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>");
    let pages_object = builder.reserve();
    let mut page_objects = Vec::with_capacity(pages.len());

    for page in pages {
        let size = page.page_size();
        let stream = render_page_stream(page)?;
        let content_object = builder.add_stream(&stream);
        let page_object = builder.add_object(format!(
            "<< /Type /Page /Parent {pages_object} 0 R /MediaBox [0 0 {width} {height}] \
             /Resources << /Font << /F1 {font_object} 0 R >> >> /Contents {content_object} 0 R >>",
            width = fmt_float(size.width),
            height = fmt_float(size.height),
        ));
        page_objects.push(page_object);
    }

    let kids = page_objects
        .iter()
        .map(|obj| format!("{obj} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    builder.fill(
        pages_object,
        format!(
            "<< /Type /Pages /Count {count} /Kids [{kids}] >>",
            count = pages.len()
        ),
    );
    let catalog = builder.add_object(format!("<< /Type /Catalog /Pages {pages_object} 0 R >>"));
    Ok(builder.finish(catalog))
}

fn render_page_stream(page: &PrintPage) -> Result<String, RenderError> {
    let height = page.page_size().height;
    let mut stream = String::new();
    emit(&mut stream, format_args!("1 0 0 -1 0 {} cm\n", fmt_float(height)))?;

    if let PageContent::Display(_) = &page.content {
        let metrics = match &page.metrics {
            Some(metrics) => metrics.as_ref().clone(),
            None => compute_metrics(page, 72.0),
        };
        let transform = Transform::new(
            metrics.content_scale,
            metrics.content_scale,
            metrics.content_offset.x,
            metrics.content_offset.y,
        );
        emit(&mut stream, format_args!("q\n{}", transform_op(&transform)))?;
        write_content(&mut stream, &page.content)?;
        emit(&mut stream, format_args!("Q\n"))?;
    } else {
        write_content(&mut stream, &page.content)?;
    }
    Ok(stream)
}

fn write_content(stream: &mut String, content: &PageContent) -> Result<(), RenderError> {
    match content {
        PageContent::Blank => Ok(()),
        PageContent::Display(list) => write_display_list(stream, list),
        PageContent::Composite(tiles) => {
            for tile in tiles.iter() {
                let target = tile.target;
                let transform =
                    Transform::map_rect(&tile.source, &target, tile.rotation == Rotation::Half);
                emit(
                    stream,
                    format_args!(
                        "q\n{} {} {} {} re W n\n{}",
                        fmt_float(target.x),
                        fmt_float(target.y),
                        fmt_float(target.width),
                        fmt_float(target.height),
                        transform_op(&transform)
                    ),
                )?;
                write_content(stream, &tile.content)?;
                emit(stream, format_args!("Q\n"))?;
            }
            Ok(())
        }
    }
}

fn write_display_list(stream: &mut String, list: &PrintDisplayList) -> Result<(), RenderError> {
    for command in &list.commands {
        match command {
            DisplayCommand::GlyphRun(run) => emit(
                stream,
                format_args!(
                    "{color} rg\nBT\n/F1 {size} Tf\n1 0 0 -1 {x} {y} Tm\n({text}) Tj\nET\n",
                    color = rgb_to_pdf(run.color),
                    size = fmt_float(run.font_size_pt),
                    x = fmt_float(run.position.x),
                    y = fmt_float(run.position.y + run.font_size_pt),
                    text = pdf_escape_text(&run.text),
                ),
            )?,
            DisplayCommand::BackgroundRect(rect) => emit(
                stream,
                format_args!(
                    "{color} rg\n{x} {y} {w} {h} re f\n",
                    color = rgb_to_pdf(rect.color),
                    x = fmt_float(rect.origin.x),
                    y = fmt_float(rect.origin.y),
                    w = fmt_float(rect.size.width),
                    h = fmt_float(rect.size.height),
                ),
            )?,
            DisplayCommand::HorizontalRule { start, end, stroke } => emit(
                stream,
                format_args!(
                    "{color} RG\n{width} w\n{x0} {y0} m {x1} {y1} l S\n",
                    color = rgb_to_pdf(stroke.color),
                    width = fmt_float(stroke.width),
                    x0 = fmt_float(start.x),
                    y0 = fmt_float(start.y),
                    x1 = fmt_float(end.x),
                    y1 = fmt_float(end.y),
                ),
            )?,
        }
    }
    Ok(())
}

fn emit(stream: &mut String, args: std::fmt::Arguments<'_>) -> Result<(), RenderError> {
    stream
        .write_fmt(args)
        .map_err(|err| RenderError::Pdf(err.to_string()))
}

fn transform_op(transform: &Transform) -> String {
    format!(
        "{} 0 0 {} {} {} cm\n",
        fmt_float(transform.a),
        fmt_float(transform.d),
        fmt_float(transform.e),
        fmt_float(transform.f)
    )
}

fn fmt_float(value: f32) -> String {
    if value.is_finite() {
        format!("{:.3}", value)
    } else {
        "0".to_string()
    }
}

fn rgb_to_pdf(color: Color) -> String {
    format!(
        "{:.3} {:.3} {:.3}",
        color.r.clamp(0.0, 1.0),
        color.g.clamp(0.0, 1.0),
        color.b.clamp(0.0, 1.0)
    )
}

fn pdf_escape_text(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '(' | ')' | '\\' => {
                output.push('\\');
                output.push(ch);
            }
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            ' '..='~' => output.push(ch),
            // Latin-1 maps onto WinAnsi closely enough for previews.
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(output, "\\{:03o}", ch as u32);
            }
            _ => output.push('?'),
        }
    }
    output
}

struct PdfBuilder {
    objects: Vec<Option<String>>,
}

impl PdfBuilder {
    fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    fn add_object(&mut self, body: impl Into<String>) -> usize {
        self.objects.push(Some(body.into()));
        self.objects.len()
    }

    /// Allocates an object number whose body is supplied later via `fill`.
    fn reserve(&mut self) -> usize {
        self.objects.push(None);
        self.objects.len()
    }

    fn fill(&mut self, number: usize, body: String) {
        if let Some(slot) = self.objects.get_mut(number - 1) {
            *slot = Some(body);
        }
    }

    fn add_stream(&mut self, stream: &str) -> usize {
        self.add_object(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ))
    }

    fn finish(self, root: usize) -> Vec<u8> {
        let mut output = Vec::new();
        output.extend_from_slice(b"%PDF-1.4\n%\xFF\xFF\xFF\xFF\n");
        let mut offsets = Vec::with_capacity(self.objects.len());

        for (index, body) in self.objects.iter().enumerate() {
            offsets.push(output.len());
            let body = body.as_deref().unwrap_or("null");
            output.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", index + 1, body).as_bytes());
        }

        let xref_start = output.len();
        let mut trailer = format!("xref\n0 {}\n0000000000 65535 f \n", self.objects.len() + 1);
        for offset in offsets {
            trailer.push_str(&format!("{:010} 00000 n \n", offset));
        }
        trailer.push_str(&format!(
            "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.objects.len() + 1,
            root,
            xref_start
        ));
        output.extend_from_slice(trailer.as_bytes());
        output
    }
}
