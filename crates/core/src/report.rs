//! Report model and aggregation.
//!
//! `ResultAggregator` is the single writer that collects surviving
//! candidates; `finalize` seals them into an immutable `OverflowReport`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::detect::OverflowCandidate;
use crate::filter::{DropReason, FilterVerdict};

/// Category of a non-fatal problem met during processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A glyph with an inconsistent box was skipped.
    InvalidGlyph,
    /// A page with invalid geometry was skipped.
    InvalidPage,
    /// The page source failed to deliver a page.
    PageLoad,
    /// A filter could not evaluate a candidate; the candidate was kept.
    FilterFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub page: Option<u32>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(page: Option<u32>, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            page,
            kind,
            message: message.into(),
        }
    }
}

/// One reported overflow, as consumers see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub page: u32,
    pub line_y: i64,
    pub line_text: String,
    pub rightmost_char: String,
    pub overflow_amount_pt: f64,
    pub in_code_block: bool,
}

impl From<&OverflowCandidate> for ReportEntry {
    fn from(c: &OverflowCandidate) -> Self {
        Self {
            page: c.page().page_number(),
            line_y: c.line_y(),
            line_text: c.line_text(),
            rightmost_char: c.rightmost_glyph().text().to_string(),
            overflow_amount_pt: c.overflow_amount(),
            in_code_block: c.in_code_block(),
        }
    }
}

/// Overflow findings of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverflowReport {
    document_id: String,
    pages: BTreeMap<u32, Vec<OverflowCandidate>>,
    dropped: BTreeMap<DropReason, usize>,
    diagnostics: Vec<Diagnostic>,
    complete: bool,
}

impl OverflowReport {
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Checked pages mapped to their surviving candidates (possibly none).
    pub const fn pages(&self) -> &BTreeMap<u32, Vec<OverflowCandidate>> {
        &self.pages
    }

    pub fn page(&self, page_number: u32) -> Option<&[OverflowCandidate]> {
        self.pages.get(&page_number).map(Vec::as_slice)
    }

    pub fn entries(&self, page_number: u32) -> Vec<ReportEntry> {
        self.page(page_number)
            .unwrap_or_default()
            .iter()
            .map(ReportEntry::from)
            .collect()
    }

    pub fn all_entries(&self) -> Vec<ReportEntry> {
        self.pages
            .values()
            .flatten()
            .map(ReportEntry::from)
            .collect()
    }

    /// Number of candidates dropped per reason.
    pub const fn dropped(&self) -> &BTreeMap<DropReason, usize> {
        &self.dropped
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// False when the report reflects only part of the document.
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn pages_checked(&self) -> usize {
        self.pages.len()
    }

    pub fn total_overflows(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    pub fn pages_with_overflows(&self) -> Vec<u32> {
        self.pages
            .iter()
            .filter(|(_, c)| !c.is_empty())
            .map(|(p, _)| *p)
            .collect()
    }
}

/// Collects chain-approved candidates page by page.
#[derive(Debug)]
pub struct ResultAggregator {
    document_id: String,
    pages: BTreeMap<u32, Vec<OverflowCandidate>>,
    dropped: BTreeMap<DropReason, usize>,
    diagnostics: Vec<Diagnostic>,
    complete: bool,
}

impl ResultAggregator {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            pages: BTreeMap::new(),
            dropped: BTreeMap::new(),
            diagnostics: Vec::new(),
            complete: true,
        }
    }

    /// Records that a page was checked, even if it yields no overflow.
    pub fn begin_page(&mut self, page_number: u32) {
        self.pages.entry(page_number).or_default();
    }

    /// Appends the candidate to its page when the verdict kept it.
    ///
    /// Returns whether the candidate was added.
    pub fn add(&mut self, candidate: OverflowCandidate, verdict: &FilterVerdict) -> bool {
        if !verdict.kept {
            if let Some(reason) = verdict.reason {
                *self.dropped.entry(reason).or_default() += 1;
            }
            return false;
        }
        self.pages
            .entry(candidate.page().page_number())
            .or_default()
            .push(candidate);
        true
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Marks the report as covering only part of the document.
    pub fn mark_partial(&mut self) {
        self.complete = false;
    }

    pub fn finalize(self) -> OverflowReport {
        OverflowReport {
            document_id: self.document_id,
            pages: self.pages,
            dropped: self.dropped,
            diagnostics: self.diagnostics,
            complete: self.complete,
        }
    }

    /// Seals the report early; it is flagged incomplete.
    pub fn finalize_partial(mut self) -> OverflowReport {
        self.mark_partial();
        self.finalize()
    }
}
