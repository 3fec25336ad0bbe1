//! Document-level API.
//!
//! - `Checker` - compiled detector + filter chain, checks one page at a time
//! - `check_document()` - checks every selected page of a `PageSource` on a
//!   rayon pool and merges the results on the calling thread

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::config::DetectorConfig;
use crate::detect::{CandidateDetector, OverflowCandidate};
use crate::error::{OverrunError, Result};
use crate::filter::{FilterChain, FilterVerdict};
use crate::page::{CodeBlockRegion, PageData};
use crate::report::{Diagnostic, DiagnosticKind, OverflowReport, ResultAggregator};
use crate::source::PageSource;

pub(crate) fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Options for checking a document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CheckOptions {
    /// Page numbers (as reported by the source) to check. None means all pages.
    pub page_numbers: Option<Vec<u32>>,

    /// Maximum number of pages to check. 0 means no limit.
    pub maxpages: usize,

    /// Worker threads. None uses the available parallelism.
    pub threads: Option<usize>,
}

/// Result of checking one page, before aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOutcome {
    pub page_number: u32,
    /// False when the page was skipped as invalid.
    pub checked: bool,
    /// Every candidate with its chain verdict, ordered by line.
    pub candidates: Vec<(OverflowCandidate, FilterVerdict)>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PageOutcome {
    pub fn kept(&self) -> impl Iterator<Item = &OverflowCandidate> {
        self.candidates
            .iter()
            .filter(|(_, v)| v.kept)
            .map(|(c, _)| c)
    }
}

/// A validated configuration compiled into a detector and filter chain.
#[derive(Debug)]
pub struct Checker {
    detector: CandidateDetector,
    chain: FilterChain,
    code_block_min_width: f64,
    code_block_min_height: f64,
}

impl Checker {
    pub fn new(config: &DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            detector: CandidateDetector::from_config(config),
            chain: FilterChain::from_config(config)?,
            code_block_min_width: config.code_block_min_width_pt,
            code_block_min_height: config.code_block_min_height_pt,
        })
    }

    pub const fn detector(&self) -> &CandidateDetector {
        &self.detector
    }

    pub const fn chain(&self) -> &FilterChain {
        &self.chain
    }

    /// Detects and filters one page. Never fails; problems become diagnostics.
    pub fn check_page(&self, page: &PageData) -> PageOutcome {
        let mut diagnostics = Vec::new();
        let context = match page.context() {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(page = page.page_number, "skipping page: {e}");
                diagnostics.push(Diagnostic::new(
                    Some(page.page_number),
                    DiagnosticKind::InvalidPage,
                    e.to_string(),
                ));
                return PageOutcome {
                    page_number: page.page_number,
                    checked: false,
                    candidates: Vec::new(),
                    diagnostics,
                };
            }
        };

        let regions = CodeBlockRegion::from_filled_rects(
            &page.regions,
            self.code_block_min_width,
            self.code_block_min_height,
        );
        let detected = self
            .detector
            .detect_into(&context, &page.glyphs, &regions, &mut diagnostics);

        let mut candidates = Vec::with_capacity(detected.len());
        for candidate in detected {
            let outcome = self.chain.run(&candidate);
            diagnostics.extend(outcome.diagnostics);
            candidates.push((candidate, outcome.verdict));
        }

        tracing::debug!(
            page = page.page_number,
            glyphs = page.glyphs.len(),
            code_blocks = regions.len(),
            candidates = candidates.len(),
            kept = candidates.iter().filter(|(_, v)| v.kept).count(),
            "page checked"
        );

        PageOutcome {
            page_number: page.page_number,
            checked: true,
            candidates,
            diagnostics,
        }
    }

    /// Merges a page outcome into the aggregator.
    pub fn merge(aggregator: &mut ResultAggregator, outcome: PageOutcome) {
        if outcome.checked {
            aggregator.begin_page(outcome.page_number);
        } else {
            aggregator.mark_partial();
        }
        for (candidate, verdict) in outcome.candidates {
            aggregator.add(candidate, &verdict);
        }
        aggregator.extend_diagnostics(outcome.diagnostics);
    }
}

/// Checks a whole document.
///
/// Configuration errors are returned before any page is read. Pages are
/// loaded sequentially, checked in parallel, and merged in source order by
/// the calling thread. Pages that fail to load are recorded as diagnostics.
///
/// # Example
/// ```ignore
/// use overrun_core::api::{CheckOptions, check_document};
/// use overrun_core::config::DetectorConfig;
/// use overrun_core::source::JsonPageSource;
///
/// let source = JsonPageSource::from_path("chapter03.json")?;
/// let report = check_document(&source, &DetectorConfig::default(), &CheckOptions::default())?;
/// println!("{} overflow(s)", report.total_overflows());
/// ```
pub fn check_document<S: PageSource + ?Sized>(
    source: &S,
    config: &DetectorConfig,
    options: &CheckOptions,
) -> Result<OverflowReport> {
    let checker = Checker::new(config)?;

    let thread_count = options.threads.unwrap_or_else(default_thread_count).max(1);
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .map_err(|e| OverrunError::ThreadPool(e.to_string()))?;

    let mut aggregator = ResultAggregator::new(source.document_id());
    if options.page_numbers.is_some() {
        aggregator.mark_partial();
    }

    let mut selected_pages: Vec<(usize, PageData)> = Vec::new();
    for page_idx in 0..source.page_count() {
        if options.maxpages > 0 && selected_pages.len() >= options.maxpages {
            aggregator.mark_partial();
            break;
        }

        let page = match source.load_page(page_idx) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(index = page_idx, "failed to load page: {e}");
                aggregator.record(Diagnostic::new(
                    None,
                    DiagnosticKind::PageLoad,
                    format!("page index {page_idx}: {e}"),
                ));
                aggregator.mark_partial();
                continue;
            }
        };

        if let Some(nums) = &options.page_numbers
            && !nums.contains(&page.page_number)
        {
            continue;
        }

        selected_pages.push((page_idx, page));
    }

    let mut results: Vec<(usize, PageOutcome)> = pool.install(|| {
        selected_pages
            .into_par_iter()
            .map(|(page_idx, page)| (page_idx, checker.check_page(&page)))
            .collect()
    });

    results.sort_by_key(|(page_idx, _)| *page_idx);
    for (_, outcome) in results {
        Checker::merge(&mut aggregator, outcome);
    }

    let report = aggregator.finalize();
    tracing::debug!(
        document = report.document_id(),
        pages = report.pages_checked(),
        overflows = report.total_overflows(),
        complete = report.is_complete(),
        "document checked"
    );
    Ok(report)
}
