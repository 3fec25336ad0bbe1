//! Parity-aware text column model.
//!
//! Duplex-printed books swap inner and outer margins between recto and verso
//! pages, so the right edge of the text column depends on the page parity.

use crate::config::{DetectorConfig, MarginSpec};
use crate::page::{PageContext, Parity};
use crate::utils::mm_to_pt;

/// Derives the text column boundaries of a page from its parity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginModel {
    odd: MarginSpec,
    even: MarginSpec,
}

impl MarginModel {
    pub const fn new(odd: MarginSpec, even: MarginSpec) -> Self {
        Self { odd, even }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.odd_margins, config.even_margins)
    }

    /// The margin table selected by parity.
    pub const fn margins(&self, parity: Parity) -> MarginSpec {
        match parity {
            Parity::Odd => self.odd,
            Parity::Even => self.even,
        }
    }

    /// X coordinate (pt) that body text must not cross on this page.
    pub fn text_right_edge(&self, page: &PageContext) -> f64 {
        page.width() - mm_to_pt(self.margins(page.parity()).right_mm)
    }

    /// X coordinate (pt) where the text column starts.
    pub fn text_left_edge(&self, page: &PageContext) -> f64 {
        mm_to_pt(self.margins(page.parity()).left_mm)
    }

    /// `(left, right)` column edges in points.
    pub fn text_column(&self, page: &PageContext) -> (f64, f64) {
        (self.text_left_edge(page), self.text_right_edge(page))
    }
}
