//! Whole-pipeline tests: page source through report.

use overrun_core::utils::{PT_PER_MM, approx_eq};
use overrun_core::{
    CheckOptions, Checker, DetectorConfig, DiagnosticKind, DropReason, FilterId, Glyph,
    JsonPageSource, MemoryPageSource, PageData, check_document,
};

const WIDTH: f64 = 515.0;
const HEIGHT: f64 = 728.0;

fn code_line(text: &str, x0: f64, y0: f64, advance: f64) -> Vec<Glyph> {
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            let gx0 = x0 + advance * i as f64;
            Glyph::new(&c.to_string(), (gx0, y0, gx0 + advance, y0 + 9.0))
        })
        .collect()
}

fn listing_page(page_number: u32) -> PageData {
    // 32 glyphs of 5.75pt starting at 306 end exactly at x1 = 490.0.
    let mut glyphs = code_line("    return Err(ParseError::Eof);", 306.0, 400.0, 5.75);
    glyphs.extend(code_line("let x = 1;", 306.0, 388.0, 5.75));
    glyphs.push(Glyph::new("4", (482.0, 20.0, 485.0, 29.0)));
    glyphs.push(Glyph::new("2", (485.0, 20.0, 488.0, 29.0)));
    PageData::new(page_number, WIDTH, HEIGHT)
        .with_glyphs(glyphs)
        .with_regions(vec![(300.0, 380.0, 495.0, 415.0)])
}

#[test]
fn test_code_overflow_reported_and_page_number_dropped() {
    let source = MemoryPageSource::new("chapter-07", vec![listing_page(1)]);
    let report =
        check_document(&source, &DetectorConfig::default(), &CheckOptions::default()).unwrap();

    let edge = WIDTH - 10.0 * PT_PER_MM;
    assert!(approx_eq(edge, 486.65, 0.01));

    let entries = report.entries(1);
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.line_y, 400);
    assert_eq!(entry.rightmost_char, ";");
    assert_eq!(entry.line_text, "    return Err(ParseError::Eof);");
    assert!(approx_eq(entry.overflow_amount_pt, 490.0 - edge, 1e-6));
    assert!(approx_eq(entry.overflow_amount_pt, 3.35, 0.01));
    assert!(entry.in_code_block);

    assert_eq!(report.dropped().get(&DropReason::PageNumber), Some(&1));
    assert!(report.diagnostics().is_empty());
    assert!(report.is_complete());
}

#[test]
fn test_footer_candidate_exists_before_filtering() {
    let checker = Checker::new(&DetectorConfig::default()).unwrap();
    let outcome = checker.check_page(&listing_page(1));
    let footer = outcome
        .candidates
        .iter()
        .find(|(c, _)| c.line_y() == 20)
        .unwrap();
    assert!(approx_eq(footer.0.overflow_amount(), 1.35, 0.01));
    assert_eq!(footer.1.reason, Some(DropReason::PageNumber));
    assert_eq!(outcome.kept().count(), 1);
}

#[test]
fn test_even_page_uses_wider_right_margin() {
    let source = MemoryPageSource::new("chapter-07", vec![listing_page(2)]);
    let report =
        check_document(&source, &DetectorConfig::default(), &CheckOptions::default()).unwrap();
    // On the verso the column ends 20mm from the page edge.
    let lines: Vec<i64> = report.entries(2).iter().map(|e| e.line_y).collect();
    assert_eq!(lines, vec![400]);
    let entry = &report.entries(2)[0];
    assert!(approx_eq(
        entry.overflow_amount_pt,
        490.0 - (WIDTH - 20.0 * PT_PER_MM),
        1e-6
    ));
}

#[test]
fn test_bad_data_never_aborts_document() {
    let mut bad_glyphs = listing_page(3);
    bad_glyphs
        .glyphs
        .push(Glyph::new("z", (500.0, 300.0, 490.0, 309.0)));
    let pages = vec![
        listing_page(1),
        PageData::new(2, -5.0, HEIGHT),
        bad_glyphs,
    ];
    let source = MemoryPageSource::new("chapter-08", pages);
    let report =
        check_document(&source, &DetectorConfig::default(), &CheckOptions::default()).unwrap();

    assert_eq!(report.pages_with_overflows(), vec![1, 3]);
    let kinds: Vec<DiagnosticKind> = report.diagnostics().iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::InvalidPage, DiagnosticKind::InvalidGlyph]);
    assert!(!report.is_complete());
}

#[test]
fn test_page_selection_and_order() {
    let pages = (1..=6).rev().map(listing_page).collect();
    let source = MemoryPageSource::new("chapter-09", pages);
    let options = CheckOptions {
        page_numbers: Some(vec![2, 5]),
        threads: Some(3),
        ..CheckOptions::default()
    };
    let report = check_document(&source, &DetectorConfig::default(), &options).unwrap();
    assert_eq!(report.pages().keys().copied().collect::<Vec<_>>(), vec![2, 5]);
    assert!(!report.is_complete());
}

#[test]
fn test_json_page_dump_pipeline() {
    let dump = r#"{
        "document_id": "appendix-a",
        "pages": [
            {
                "page_number": 11, "width": 515.0, "height": 728.0,
                "glyphs": [
                    {"text": "P", "bbox": [300.0, 500.0, 306.0, 509.0]},
                    {"text": "S", "bbox": [306.0, 500.0, 312.0, 509.0]},
                    {"text": " ", "bbox": [312.0, 500.0, 318.0, 509.0]},
                    {"text": "/", "bbox": [318.0, 500.0, 324.0, 509.0]},
                    {"text": ">", "bbox": [324.0, 500.0, 495.0, 509.0]},
                    {"text": "数", "bbox": [476.0, 300.0, 486.0, 310.0]},
                    {"text": "。", "bbox": [486.0, 300.0, 496.0, 310.0]},
                    {"text": "x", "bbox": [480.0, 200.0, 496.0, 210.0]}
                ]
            }
        ]
    }"#;
    let source = JsonPageSource::from_json_str(dump).unwrap();
    let report =
        check_document(&source, &DetectorConfig::default(), &CheckOptions::default()).unwrap();

    assert_eq!(report.document_id(), "appendix-a");
    let lines: Vec<i64> = report.entries(11).iter().map(|e| e.line_y).collect();
    assert_eq!(lines, vec![200]);
    assert_eq!(report.dropped().get(&DropReason::ShellPrompt), Some(&1));
    assert_eq!(
        report.dropped().get(&DropReason::JapanesePunctuation),
        Some(&1)
    );
}

#[test]
fn test_malformed_page_in_dump_becomes_diagnostic() {
    let dump = r#"{
        "document_id": "appendix-b",
        "pages": [
            {
                "page_number": 1, "width": 515.0, "height": 728.0,
                "glyphs": [{"text": "x", "bbox": [480.0, 300.0, 495.0, 309.0]}]
            },
            {
                "page_number": 2, "width": 515.0, "height": 728.0,
                "glyphs": [{"text": "y", "bbox": [480.0, 300.0, 495.0]}]
            },
            {
                "page_number": 3, "width": 515.0, "height": 728.0,
                "glyphs": [{"text": "z", "bbox": [480.0, 300.0, 495.0, 309.0]}]
            }
        ]
    }"#;
    let source = JsonPageSource::from_json_str(dump).unwrap();
    let report =
        check_document(&source, &DetectorConfig::default(), &CheckOptions::default()).unwrap();

    assert_eq!(report.pages_with_overflows(), vec![1, 3]);
    assert_eq!(report.pages_checked(), 2);
    let kinds: Vec<DiagnosticKind> = report.diagnostics().iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::PageLoad]);
    assert!(!report.is_complete());
}

#[test]
fn test_filters_can_be_disabled_by_config() {
    let config = DetectorConfig::from_toml_str(
        r#"
        enabled_filters = ["measurement_error"]
        odd_margins = { left_mm = 20.0, right_mm = 10.0 }
        even_margins = { left_mm = 10.0, right_mm = 20.0 }
        "#,
    )
    .unwrap();
    assert_eq!(config.enabled_filters, vec![FilterId::MeasurementError]);
    let source = MemoryPageSource::new("chapter-07", vec![listing_page(1)]);
    let report = check_document(&source, &config, &CheckOptions::default()).unwrap();
    assert_eq!(report.total_overflows(), 2);
}
