//! Page-scoped input types: page context, glyphs and code block regions.
//!
//! These are produced by a [`crate::source::PageSource`] and are read-only to
//! the detector and filters.

use serde::{Deserialize, Serialize};

use crate::error::{OverrunError, Result};
use crate::utils::{HasBBox, Rect, normalize_rect, rect_is_finite};

/// Which side of a duplex spread a page falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    Odd,
    Even,
}

impl Parity {
    pub const fn of(page_number: u32) -> Self {
        if page_number % 2 == 1 {
            Parity::Odd
        } else {
            Parity::Even
        }
    }
}

/// Immutable per-page context.
///
/// Parity is always derived from the page number; it is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageContext {
    page_number: u32,
    width: f64,
    height: f64,
}

impl PageContext {
    /// Creates a page context.
    ///
    /// `page_number` is 1-based; `width` and `height` are in points and must
    /// be strictly positive.
    pub fn new(page_number: u32, width: f64, height: f64) -> Result<Self> {
        if page_number == 0 {
            return Err(OverrunError::InvalidPage {
                page: page_number,
                msg: "page numbers are 1-based".to_string(),
            });
        }
        if !(width.is_finite() && width > 0.0) || !(height.is_finite() && height > 0.0) {
            return Err(OverrunError::InvalidPage {
                page: page_number,
                msg: format!("page size must be positive, got {width}x{height}"),
            });
        }
        Ok(Self {
            page_number,
            width,
            height,
        })
    }

    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    pub const fn width(&self) -> f64 {
        self.width
    }

    pub const fn height(&self) -> f64 {
        self.height
    }

    pub const fn parity(&self) -> Parity {
        Parity::of(self.page_number)
    }
}

/// Coarse script classification of a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptClass {
    Ascii,
    Japanese,
    Symbol,
}

impl ScriptClass {
    /// Classifies a character by Unicode block.
    pub fn classify(c: char) -> Self {
        if c.is_ascii() {
            return ScriptClass::Ascii;
        }
        match c as u32 {
            // CJK symbols and punctuation, Hiragana, Katakana
            0x3000..=0x30FF
            // Katakana phonetic extensions
            | 0x31F0..=0x31FF
            // CJK unified ideographs (incl. extension A)
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            // CJK compatibility ideographs
            | 0xF900..=0xFAFF
            // Full-width and half-width forms
            | 0xFF00..=0xFFEF => ScriptClass::Japanese,
            _ => ScriptClass::Symbol,
        }
    }
}

/// A positioned glyph with its bounding box in PDF user space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Glyph {
    text: String,
    bbox: Rect,
    script_class: ScriptClass,
}

impl Glyph {
    /// Creates a glyph, classifying its script from the first character.
    pub fn new(text: &str, bbox: Rect) -> Self {
        let script_class = text
            .chars()
            .next()
            .map_or(ScriptClass::Symbol, ScriptClass::classify);
        Self::with_script(text, bbox, script_class)
    }

    /// Creates a glyph with an explicit script class supplied by the page source.
    pub fn with_script(text: &str, bbox: Rect, script_class: ScriptClass) -> Self {
        Self {
            text: text.to_string(),
            bbox,
            script_class,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn script_class(&self) -> ScriptClass {
        self.script_class
    }

    /// The glyph's character when its text is exactly one character.
    pub fn single_char(&self) -> Option<char> {
        let mut chars = self.text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }

    /// True for glyphs that carry no letter or digit (rules, dashes, box drawing).
    pub fn is_symbol(&self) -> bool {
        !self.text.is_empty()
            && self
                .text
                .chars()
                .all(|c| !c.is_alphanumeric() && !c.is_whitespace())
    }

    /// Checks the box for the inconsistencies a page source can produce.
    ///
    /// Returns a description of the first problem found.
    pub fn check(&self) -> std::result::Result<(), String> {
        if self.text.is_empty() {
            return Err("glyph has no text".to_string());
        }
        if !rect_is_finite(self.bbox) {
            return Err(format!("glyph {:?} has a non-finite bbox", self.text));
        }
        let (x0, y0, x1, y1) = self.bbox;
        if x1 < x0 || y1 < y0 {
            return Err(format!(
                "glyph {:?} has an inverted bbox ({x0}, {y0}, {x1}, {y1})",
                self.text
            ));
        }
        Ok(())
    }
}

impl HasBBox for Glyph {
    fn x0(&self) -> f64 {
        self.bbox.0
    }
    fn y0(&self) -> f64 {
        self.bbox.1
    }
    fn x1(&self) -> f64 {
        self.bbox.2
    }
    fn y1(&self) -> f64 {
        self.bbox.3
    }
}

/// A filled rectangle large enough to be a source listing background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CodeBlockRegion {
    bbox: Rect,
}

impl CodeBlockRegion {
    pub fn new(bbox: Rect) -> Self {
        Self {
            bbox: normalize_rect(bbox),
        }
    }

    /// Keeps the filled rectangles whose width and height both exceed the minimums.
    pub fn from_filled_rects(rects: &[Rect], min_width: f64, min_height: f64) -> Vec<Self> {
        rects
            .iter()
            .copied()
            .filter(|r| rect_is_finite(*r))
            .map(Self::new)
            .filter(|r| r.width() > min_width && r.height() > min_height)
            .collect()
    }
}

impl HasBBox for CodeBlockRegion {
    fn x0(&self) -> f64 {
        self.bbox.0
    }
    fn y0(&self) -> f64 {
        self.bbox.1
    }
    fn x1(&self) -> f64 {
        self.bbox.2
    }
    fn y1(&self) -> f64 {
        self.bbox.3
    }
}

/// Everything a page source supplies for one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageData {
    /// 1-based page number; determines parity.
    pub page_number: u32,
    pub width: f64,
    pub height: f64,
    pub glyphs: Vec<Glyph>,
    /// Filled rectangles; candidate code block backgrounds.
    pub regions: Vec<Rect>,
}

impl PageData {
    pub fn new(page_number: u32, width: f64, height: f64) -> Self {
        Self {
            page_number,
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_glyphs(mut self, glyphs: Vec<Glyph>) -> Self {
        self.glyphs = glyphs;
        self
    }

    pub fn with_regions(mut self, regions: Vec<Rect>) -> Self {
        self.regions = regions;
        self
    }

    pub fn context(&self) -> Result<PageContext> {
        PageContext::new(self.page_number, self.width, self.height)
    }
}
