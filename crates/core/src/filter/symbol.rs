use crate::config::FilterId;
use crate::detect::OverflowCandidate;

use super::{DropReason, Filter, FilterError, FilterVerdict};

/// Drops lines made only of rules, dashes and box-drawing characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SymbolOnlyFilter;

impl SymbolOnlyFilter {
    pub const fn new() -> Self {
        Self
    }
}

impl Filter for SymbolOnlyFilter {
    fn id(&self) -> FilterId {
        FilterId::SymbolOnly
    }

    fn evaluate(&self, candidate: &OverflowCandidate) -> Result<FilterVerdict, FilterError> {
        let mut glyphs = candidate
            .glyphs_in_line()
            .iter()
            .filter(|g| !g.is_whitespace())
            .peekable();
        let symbol_only = glyphs.peek().is_some() && glyphs.all(|g| g.is_symbol());
        Ok(FilterVerdict::drop_if(symbol_only, DropReason::SymbolOnly))
    }
}
