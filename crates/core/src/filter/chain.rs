use crate::config::{DetectorConfig, FilterId};
use crate::detect::OverflowCandidate;
use crate::error::Result;
use crate::report::{Diagnostic, DiagnosticKind};

use super::{
    Filter, FilterVerdict, JapaneseTextFilter, MeasurementErrorFilter, PageNumberFilter,
    PowerShellPromptFilter, SymbolOnlyFilter,
};

/// Terminal verdict of a chain run.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainVerdict {
    pub verdict: FilterVerdict,
    /// The filter that dropped the candidate, if any.
    pub dropped_by: Option<FilterId>,
    /// Filters that failed to evaluate; each one counted as a keep.
    pub diagnostics: Vec<Diagnostic>,
}

impl ChainVerdict {
    pub const fn kept(&self) -> bool {
        self.verdict.kept
    }
}

/// Ordered sequence of filters; the first drop wins.
#[derive(Debug, Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    pub fn new(filters: Vec<Box<dyn Filter>>) -> Self {
        Self { filters }
    }

    /// Builds the chain listed in `config.enabled_filters`, in that order.
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        let mut filters: Vec<Box<dyn Filter>> = Vec::with_capacity(config.enabled_filters.len());
        for id in &config.enabled_filters {
            let filter: Box<dyn Filter> = match id {
                FilterId::MeasurementError => Box::new(MeasurementErrorFilter::new(
                    config.measurement_error_threshold_pt,
                )),
                FilterId::PageNumber => Box::new(PageNumberFilter::new(config.page_number_band)),
                FilterId::JapaneseText => {
                    Box::new(JapaneseTextFilter::new(&config.japanese_punctuation))
                }
                FilterId::SymbolOnly => Box::new(SymbolOnlyFilter::new()),
                FilterId::PowershellPrompt => Box::new(PowerShellPromptFilter::new(
                    config.compile_prompt_patterns()?,
                )),
            };
            filters.push(filter);
        }
        Ok(Self::new(filters))
    }

    pub fn push(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    pub fn ids(&self) -> Vec<FilterId> {
        self.filters.iter().map(|f| f.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Runs the filters in order and stops at the first drop.
    ///
    /// A filter that cannot evaluate the candidate counts as a keep; the
    /// failure is returned as a diagnostic.
    pub fn run(&self, candidate: &OverflowCandidate) -> ChainVerdict {
        let mut diagnostics = Vec::new();
        for filter in &self.filters {
            match filter.evaluate(candidate) {
                Ok(verdict) if !verdict.kept => {
                    tracing::trace!(
                        page = candidate.page().page_number(),
                        line_y = candidate.line_y(),
                        filter = %filter.id(),
                        "candidate dropped"
                    );
                    return ChainVerdict {
                        verdict,
                        dropped_by: Some(filter.id()),
                        diagnostics,
                    };
                }
                Ok(_) => {}
                Err(e) => {
                    let msg = format!(
                        "{} filter failed on line {}: {e}",
                        filter.id(),
                        candidate.line_y()
                    );
                    tracing::warn!(page = candidate.page().page_number(), "{msg}");
                    diagnostics.push(Diagnostic::new(
                        Some(candidate.page().page_number()),
                        DiagnosticKind::FilterFailed,
                        msg,
                    ));
                }
            }
        }
        ChainVerdict {
            verdict: FilterVerdict::keep(),
            dropped_by: None,
            diagnostics,
        }
    }
}
