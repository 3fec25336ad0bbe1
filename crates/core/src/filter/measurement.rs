use crate::config::FilterId;
use crate::detect::OverflowCandidate;

use super::{DropReason, Filter, FilterError, FilterVerdict};

/// Drops sub-point overflow caused by glyph boxes wider than the ink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementErrorFilter {
    threshold: f64,
}

impl MeasurementErrorFilter {
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Filter for MeasurementErrorFilter {
    fn id(&self) -> FilterId {
        FilterId::MeasurementError
    }

    fn evaluate(&self, candidate: &OverflowCandidate) -> Result<FilterVerdict, FilterError> {
        Ok(FilterVerdict::drop_if(
            candidate.overflow_amount() < self.threshold,
            DropReason::MeasurementError,
        ))
    }
}
