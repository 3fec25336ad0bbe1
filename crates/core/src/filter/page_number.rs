use crate::config::{FilterId, PageNumberBand};
use crate::detect::OverflowCandidate;

use super::{DropReason, Filter, FilterError, FilterVerdict};

/// Drops purely numeric lines sitting in the running header/footer bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageNumberFilter {
    band: PageNumberBand,
}

impl PageNumberFilter {
    pub const fn new(band: PageNumberBand) -> Self {
        Self { band }
    }

    fn in_band(&self, candidate: &OverflowCandidate) -> bool {
        let y = candidate.line_y() as f64;
        y <= self.band.bottom_pt || y >= candidate.page().height() - self.band.top_pt
    }
}

impl Filter for PageNumberFilter {
    fn id(&self) -> FilterId {
        FilterId::PageNumber
    }

    fn evaluate(&self, candidate: &OverflowCandidate) -> Result<FilterVerdict, FilterError> {
        if !self.in_band(candidate) {
            return Ok(FilterVerdict::keep());
        }
        let mut digits = candidate
            .glyphs_in_line()
            .iter()
            .flat_map(|g| g.text().chars())
            .filter(|c| !c.is_whitespace())
            .peekable();
        let numeric = digits.peek().is_some() && digits.all(char::is_numeric);
        Ok(FilterVerdict::drop_if(numeric, DropReason::PageNumber))
    }
}
