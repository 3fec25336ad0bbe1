//! overrun - finds glyphs printed past the text column of typeset book pages.
//!
//! Pages flow strictly forward: a [`source::PageSource`] supplies glyphs,
//! the [`margin::MarginModel`] places the column edge by page parity, the
//! [`detect::CandidateDetector`] groups overflowing glyphs into lines, the
//! [`filter::FilterChain`] prunes known false positives, and the
//! [`report::ResultAggregator`] collects what survives.

pub mod api;
pub mod config;
pub mod detect;
pub mod error;
pub mod filter;
pub mod margin;
pub mod page;
pub mod report;
pub mod source;
pub mod utils;

#[cfg(test)]
pub(crate) mod testutil;

pub use api::{CheckOptions, Checker, check_document};
pub use config::{DetectorConfig, FilterId, MarginSpec, PageNumberBand};
pub use detect::{CandidateDetector, OverflowCandidate};
pub use error::{OverrunError, Result};
pub use filter::{DropReason, Filter, FilterChain, FilterVerdict};
pub use margin::MarginModel;
pub use page::{CodeBlockRegion, Glyph, PageContext, PageData, Parity, ScriptClass};
pub use report::{Diagnostic, DiagnosticKind, OverflowReport, ReportEntry, ResultAggregator};
pub use source::{JsonPageSource, MemoryPageSource, PageSource};
