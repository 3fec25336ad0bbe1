//! Geometric overflow candidate detection.
//!
//! Glyphs whose right edge passes the text column by more than the configured
//! threshold are grouped into text lines by rounded baseline; each such line
//! becomes one [`OverflowCandidate`].

use std::collections::BTreeMap;

use itertools::Itertools;
use ordered_float::OrderedFloat;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::config::DetectorConfig;
use crate::margin::MarginModel;
use crate::page::{CodeBlockRegion, Glyph, PageContext};
use crate::report::{Diagnostic, DiagnosticKind};
use crate::utils::{HasBBox, rect_contains};

/// Line key: the glyph's `y0` rounded to the nearest point.
pub fn line_key(y0: f64) -> i64 {
    y0.round() as i64
}

/// A text line whose rightmost glyph crosses the text column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverflowCandidate {
    page: PageContext,
    line_y: i64,
    glyphs_in_line: Vec<Glyph>,
    rightmost_glyph: Glyph,
    overflow_amount: f64,
    text_right_edge: f64,
    overflowing_glyphs: usize,
    in_code_block: bool,
}

impl OverflowCandidate {
    pub const fn page(&self) -> &PageContext {
        &self.page
    }

    pub const fn line_y(&self) -> i64 {
        self.line_y
    }

    /// Every glyph of the line, ordered by `x0`.
    pub fn glyphs_in_line(&self) -> &[Glyph] {
        &self.glyphs_in_line
    }

    pub const fn rightmost_glyph(&self) -> &Glyph {
        &self.rightmost_glyph
    }

    /// How far (pt) the rightmost glyph passes the text right edge. Always > 0.
    pub const fn overflow_amount(&self) -> f64 {
        self.overflow_amount
    }

    pub const fn text_right_edge(&self) -> f64 {
        self.text_right_edge
    }

    /// Number of glyphs on the line past the detection threshold.
    pub const fn overflowing_glyphs(&self) -> usize {
        self.overflowing_glyphs
    }

    pub const fn in_code_block(&self) -> bool {
        self.in_code_block
    }

    pub fn line_text(&self) -> String {
        line_text(&self.glyphs_in_line)
    }
}

/// Joins glyph texts in x order, inserting a space at wide gaps.
///
/// A gap counts as a word break when it exceeds half the average width of
/// the line's glyphs.
pub fn line_text(glyphs: &[Glyph]) -> String {
    let Some(first) = glyphs.first() else {
        return String::new();
    };
    let avg_width = glyphs.iter().map(|g| g.width()).sum::<f64>() / glyphs.len() as f64;
    let min_gap = avg_width * 0.5;

    let mut text = String::from(first.text());
    for (prev, curr) in glyphs.iter().tuple_windows() {
        let gap = curr.x0() - prev.x1();
        if gap > min_gap && !prev.is_whitespace() && !curr.is_whitespace() {
            text.push(' ');
        }
        text.push_str(curr.text());
    }
    text
}

/// Scans a page's glyphs against the text column.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDetector {
    margins: MarginModel,
    overflow_threshold: f64,
}

impl CandidateDetector {
    pub const fn new(margins: MarginModel, overflow_threshold: f64) -> Self {
        Self {
            margins,
            overflow_threshold,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(
            MarginModel::from_config(config),
            config.overflow_threshold_pt,
        )
    }

    pub const fn margins(&self) -> &MarginModel {
        &self.margins
    }

    pub const fn overflow_threshold(&self) -> f64 {
        self.overflow_threshold
    }

    /// Detects overflow candidates, dropping glyph diagnostics.
    pub fn detect(
        &self,
        page: &PageContext,
        glyphs: &[Glyph],
        regions: &[CodeBlockRegion],
    ) -> Vec<OverflowCandidate> {
        let mut diagnostics = Vec::new();
        self.detect_into(page, glyphs, regions, &mut diagnostics)
    }

    /// Detects overflow candidates, recording a diagnostic for every skipped glyph.
    ///
    /// Candidates are ordered by `line_y` ascending.
    pub fn detect_into(
        &self,
        page: &PageContext,
        glyphs: &[Glyph],
        regions: &[CodeBlockRegion],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<OverflowCandidate> {
        let edge = self.margins.text_right_edge(page);
        // Strict comparison: x1 == edge + threshold is in bounds.
        let limit = edge + self.overflow_threshold;

        let mut valid: Vec<&Glyph> = Vec::with_capacity(glyphs.len());
        for glyph in glyphs {
            match glyph.check() {
                Ok(()) => valid.push(glyph),
                Err(msg) => {
                    tracing::warn!(page = page.page_number(), "skipping glyph: {msg}");
                    diagnostics.push(Diagnostic::new(
                        Some(page.page_number()),
                        DiagnosticKind::InvalidGlyph,
                        msg,
                    ));
                }
            }
        }

        let overflowing_lines: FxHashSet<i64> = valid
            .iter()
            .filter(|g| g.x1() > limit)
            .map(|g| line_key(g.y0()))
            .collect();
        if overflowing_lines.is_empty() {
            return Vec::new();
        }

        let mut lines: BTreeMap<i64, Vec<&Glyph>> = BTreeMap::new();
        for glyph in valid {
            let key = line_key(glyph.y0());
            if overflowing_lines.contains(&key) {
                lines.entry(key).or_default().push(glyph);
            }
        }

        lines
            .into_iter()
            .filter_map(|(line_y, mut line)| {
                line.sort_by_key(|g| OrderedFloat(g.x0()));
                let retained = line
                    .iter()
                    .filter(|g| g.x1() > limit)
                    .collect_vec();
                let rightmost = **retained.iter().max_by_key(|g| OrderedFloat(g.x1()))?;
                let in_code_block = regions
                    .iter()
                    .any(|r| rect_contains(r.bbox(), rightmost.bbox()));
                Some(OverflowCandidate {
                    page: *page,
                    line_y,
                    rightmost_glyph: rightmost.clone(),
                    overflow_amount: rightmost.x1() - edge,
                    text_right_edge: edge,
                    overflowing_glyphs: retained.len(),
                    in_code_block,
                    glyphs_in_line: line.into_iter().cloned().collect(),
                })
            })
            .collect()
    }
}
