//! False-positive filters.
//!
//! Every filter is a stateless predicate over one [`OverflowCandidate`]. A
//! filter's verdict never depends on another filter having run, so filters
//! can be reordered, disabled or tested in isolation. [`FilterChain`] applies
//! them in configured order.

mod chain;
mod japanese;
mod measurement;
mod page_number;
mod prompt;
mod symbol;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config::FilterId;
use crate::detect::OverflowCandidate;

pub use chain::{ChainVerdict, FilterChain};
pub use japanese::JapaneseTextFilter;
pub use measurement::MeasurementErrorFilter;
pub use page_number::PageNumberFilter;
pub use prompt::PowerShellPromptFilter;
pub use symbol::SymbolOnlyFilter;

/// Why a candidate was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    MeasurementError,
    PageNumber,
    JapanesePunctuation,
    SymbolOnly,
    ShellPrompt,
}

impl DropReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DropReason::MeasurementError => "measurement_error",
            DropReason::PageNumber => "page_number",
            DropReason::JapanesePunctuation => "japanese_punctuation",
            DropReason::SymbolOnly => "symbol_only",
            DropReason::ShellPrompt => "shell_prompt",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keep/drop decision of one filter, or of a whole chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterVerdict {
    pub kept: bool,
    pub reason: Option<DropReason>,
}

impl FilterVerdict {
    pub const fn keep() -> Self {
        Self {
            kept: true,
            reason: None,
        }
    }

    pub const fn drop(reason: DropReason) -> Self {
        Self {
            kept: false,
            reason: Some(reason),
        }
    }

    /// Drops with `reason` when `cond` holds, keeps otherwise.
    pub const fn drop_if(cond: bool, reason: DropReason) -> Self {
        if cond {
            Self::drop(reason)
        } else {
            Self::keep()
        }
    }
}

/// A filter could not judge a candidate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("glyph text {0:?} is not a single character")]
    MalformedGlyph(String),

    #[error("glyph {text:?} is classified {class} but is not in that script")]
    ScriptMismatch { text: String, class: &'static str },
}

/// One false-positive rule.
pub trait Filter: fmt::Debug + Send + Sync {
    fn id(&self) -> FilterId;

    /// Judges a candidate. Must be deterministic and free of side effects.
    fn evaluate(&self, candidate: &OverflowCandidate) -> Result<FilterVerdict, FilterError>;
}
