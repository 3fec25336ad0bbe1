//! Candidate builders shared by unit tests.

use crate::config::DetectorConfig;
use crate::detect::{CandidateDetector, OverflowCandidate};
use crate::page::{Glyph, PageContext};

pub(crate) const PAGE_WIDTH: f64 = 515.0;
pub(crate) const PAGE_HEIGHT: f64 = 728.0;

/// Runs the default detector over one line and returns its only candidate.
pub(crate) fn candidate(
    page_number: u32,
    y0: f64,
    glyphs: &[(&str, f64, f64)],
) -> OverflowCandidate {
    let glyphs = glyphs
        .iter()
        .map(|(text, x0, x1)| Glyph::new(text, (*x0, y0, *x1, y0 + 10.0)))
        .collect();
    candidate_from_glyphs(page_number, glyphs)
}

pub(crate) fn candidate_from_glyphs(page_number: u32, glyphs: Vec<Glyph>) -> OverflowCandidate {
    let page = PageContext::new(page_number, PAGE_WIDTH, PAGE_HEIGHT).unwrap();
    let detector = CandidateDetector::from_config(&DetectorConfig::default());
    let mut candidates = detector.detect(&page, &glyphs, &[]);
    assert_eq!(candidates.len(), 1, "expected exactly one overflowing line");
    candidates.remove(0)
}

/// `count` copies of `text` laid edge to edge, ending at `end`.
pub(crate) fn row(text: &str, start: f64, end: f64, count: usize) -> Vec<(&str, f64, f64)> {
    let step = (end - start) / count as f64;
    (0..count)
        .map(|i| {
            let x0 = start + step * i as f64;
            let x1 = if i + 1 == count { end } else { x0 + step };
            (text, x0, x1)
        })
        .collect()
}

/// One glyph per character of `text`, each `advance` wide, starting at `start`.
pub(crate) fn text_row(text: &str, start: f64, advance: f64) -> Vec<(&str, f64, f64)> {
    text.char_indices()
        .enumerate()
        .map(|(i, (byte, c))| {
            let x0 = start + advance * i as f64;
            (&text[byte..byte + c.len_utf8()], x0, x0 + advance)
        })
        .collect()
}
