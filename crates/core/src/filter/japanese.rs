use rustc_hash::FxHashSet;

use crate::config::{DEFAULT_JAPANESE_PUNCTUATION, FilterId};
use crate::detect::OverflowCandidate;
use crate::page::ScriptClass;

use super::{DropReason, Filter, FilterError, FilterVerdict};

/// Drops lines whose rightmost glyph is a permitted Japanese closing mark.
///
/// Japanese typesetting lets closing brackets, periods and commas hang into
/// the margin (burasage).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JapaneseTextFilter {
    permitted: FxHashSet<char>,
}

impl JapaneseTextFilter {
    pub fn new(permitted: &str) -> Self {
        Self {
            permitted: permitted.chars().filter(|c| !c.is_whitespace()).collect(),
        }
    }

    pub fn permits(&self, c: char) -> bool {
        self.permitted.contains(&c)
    }
}

impl Default for JapaneseTextFilter {
    fn default() -> Self {
        Self::new(DEFAULT_JAPANESE_PUNCTUATION)
    }
}

impl Filter for JapaneseTextFilter {
    fn id(&self) -> FilterId {
        FilterId::JapaneseText
    }

    fn evaluate(&self, candidate: &OverflowCandidate) -> Result<FilterVerdict, FilterError> {
        let glyph = candidate.rightmost_glyph();
        if glyph.script_class() != ScriptClass::Japanese {
            return Ok(FilterVerdict::keep());
        }
        let c = glyph
            .single_char()
            .ok_or_else(|| FilterError::MalformedGlyph(glyph.text().to_string()))?;
        if ScriptClass::classify(c) != ScriptClass::Japanese {
            return Err(FilterError::ScriptMismatch {
                text: glyph.text().to_string(),
                class: "japanese",
            });
        }
        Ok(FilterVerdict::drop_if(self.permits(c), DropReason::JapanesePunctuation))
    }
}
