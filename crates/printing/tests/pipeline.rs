use std::fs;
use std::io::Cursor;
use std::sync::Arc;

use image::io::Reader as ImageReader;
use image::GenericImageView;
use printingtools_printing::{
    ensure_metrics, normalize_page, CancellationToken, DocumentError, LayoutKind, NeverCancel,
    PageListDocument, PageRange, PageSettings, PdfVectorRenderer, PreviewError, PreviewProvider,
    PreviewSettings, PreviewSettingsError, PrintOptions, PrintPage, PrintSession, PrintTarget,
    RenderPipeline, TargetCapabilities, TextDocument,
};
use tempfile::tempdir;

fn long_text(lines: usize) -> String {
    (1..=lines).map(|n| format!("line {n}: lorem ipsum\n")).collect()
}

fn text_session(lines: usize, options: PrintOptions) -> PrintSession {
    PrintSession::with_options(Arc::new(TextDocument::new("notes.txt", &long_text(lines))), options)
}

#[test]
fn collect_pages_normalizes_to_target_dpi() {
    let pipeline = RenderPipeline::default();
    let session = text_session(200, PrintOptions::default());
    let pages = pipeline
        .collect_pages(&session.snapshot(), 96.0, &NeverCancel)
        .unwrap();

    assert!(pages.len() > 1);
    for page in &pages {
        let metrics = page.metrics.as_ref().expect("normalized page carries metrics");
        assert_eq!(metrics.dpi_x, 96.0);
        assert!(Arc::ptr_eq(metrics, &ensure_metrics(page, 96.05)));
    }

    let rescaled = normalize_page(pages[0].clone(), 150.0);
    assert_eq!(rescaled.metrics.as_ref().map(|m| m.dpi_y), Some(150.0));
}

#[test]
fn page_range_filters_before_layout() {
    let pipeline = RenderPipeline::default();
    let all = pipeline
        .collect_pages(&text_session(200, PrintOptions::default()).snapshot(), 72.0, &NeverCancel)
        .unwrap();
    assert!(all.len() >= 3);

    let options = PrintOptions {
        page_range: PageRange::Range { start: 2, end: 3 },
        layout_kind: LayoutKind::NUp,
        nup_columns: 2,
        ..PrintOptions::default()
    };
    let sheets = pipeline
        .collect_pages(&text_session(200, options).snapshot(), 72.0, &NeverCancel)
        .unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].tile_sources(), vec![1, 2]);

    let everything = PrintOptions {
        page_range: PageRange::All,
        ..PrintOptions::default()
    };
    assert_eq!(PrintOptions::default().page_range, PageRange::All);
    let unfiltered = pipeline
        .collect_pages(&text_session(200, everything).snapshot(), 72.0, &NeverCancel)
        .unwrap();
    assert_eq!(unfiltered.len(), all.len());
}

#[test]
fn selection_only_uses_document_selection() {
    let settings = PageSettings::default();
    let pages: Vec<PrintPage> = (1..=5)
        .map(|n| PrintPage::blank(settings).with_page_number(n))
        .collect();
    let pipeline = RenderPipeline::default();
    let options = PrintOptions {
        selection_only: true,
        ..PrintOptions::default()
    };

    let selected = PageListDocument::new("slides", pages.clone()).with_selection(vec![0, 4]);
    let session = PrintSession::with_options(Arc::new(selected), options.clone());
    let collected = pipeline
        .collect_pages(&session.snapshot(), 72.0, &NeverCancel)
        .unwrap();
    let numbers: Vec<_> = collected.iter().map(|page| page.page_number).collect();
    assert_eq!(numbers, vec![Some(1), Some(5)]);

    let unselected = PrintSession::with_options(Arc::new(PageListDocument::new("slides", pages)), options);
    let err = pipeline
        .collect_pages(&unselected.snapshot(), 72.0, &NeverCancel)
        .unwrap_err();
    assert!(matches!(err, PreviewError::Document(DocumentError::NoSelection)));
}

#[test]
fn cancelled_token_stops_collection() {
    let token = CancellationToken::new(1);
    token.cancel();
    let result = RenderPipeline::default().collect_pages(
        &text_session(200, PrintOptions::default()).snapshot(),
        72.0,
        &token,
    );
    assert!(matches!(result, Err(PreviewError::Cancelled)));
}

#[test]
fn bitmaps_match_page_pixels() {
    let pipeline = RenderPipeline::default();
    let session = text_session(10, PrintOptions::default());
    let pages = pipeline
        .collect_pages(&session.snapshot(), 96.0, &NeverCancel)
        .unwrap();
    let images = pipeline.render_bitmaps(&pages, 96.0, &NeverCancel).unwrap();
    assert_eq!(images.len(), pages.len());

    let metrics = pages[0].metrics.as_ref().unwrap();
    let png = images[0].encode_png().unwrap();
    let decoded = ImageReader::new(Cursor::new(png))
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap();
    assert_eq!(
        decoded.dimensions(),
        (metrics.pixel_width(), metrics.pixel_height())
    );
}

#[test]
fn vector_document_and_export() {
    let pipeline = RenderPipeline::default();
    assert!(RenderPipeline::create_vector_document(&[], &PdfVectorRenderer)
        .unwrap()
        .is_none());

    let pages = pipeline
        .collect_pages(&text_session(80, PrintOptions::default()).snapshot(), 72.0, &NeverCancel)
        .unwrap();
    let bytes = RenderPipeline::create_vector_document(&pages, &PdfVectorRenderer)
        .unwrap()
        .expect("pages produce a document");
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains(&format!("/Count {}", pages.len())));
    assert!(text.contains("(line 1: lorem ipsum) Tj"));

    let dir = tempdir().unwrap();
    let path = dir.path().join("preview.pdf");
    pipeline.export_pdf(&path, &pages).unwrap();
    assert!(fs::read(&path).unwrap().starts_with(b"%PDF-1.4"));
}

#[test]
fn printer_without_vector_support_skips_pdf() {
    let pipeline = RenderPipeline::default();
    let mut session = text_session(5, PrintOptions::default());
    let model = pipeline.create_preview(&session.snapshot(), &NeverCancel).unwrap();
    assert!(model.vector_document().is_some());

    session
        .set_printer(Some(PrintTarget {
            name: "raster-only".to_string(),
            capabilities: TargetCapabilities::new(true, true, false),
        }))
        .unwrap();
    let model = pipeline.create_preview(&session.snapshot(), &NeverCancel).unwrap();
    assert!(model.vector_document().is_none());
    assert_eq!(model.page_count(), 1);
}

#[test]
fn preview_settings_persist_through_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config").join("preview.json");
    assert_eq!(PreviewSettings::load(&path).unwrap(), PreviewSettings::default());

    let settings = PreviewSettings {
        target_dpi: 150.0,
        include_vector_document: false,
        raster_background: [250, 248, 240],
        ..PreviewSettings::default()
    };
    settings.save(&path).unwrap();
    assert!(!path.with_extension("tmp").exists());
    assert_eq!(PreviewSettings::load(&path).unwrap(), settings);

    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        PreviewSettings::load(&path),
        Err(PreviewSettingsError::Parse { .. })
    ));
}
