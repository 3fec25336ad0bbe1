//! Page sources.
//!
//! A `PageSource` hands the detector one page at a time. Vector text
//! extraction and OCR fallbacks both sit behind this trait and must produce
//! glyphs and filled rectangles in the same shape.
//!
//! `JsonPageSource` reads the page dump format:
//!
//! ```json
//! {
//!   "document_id": "chapter-03",
//!   "pages": [
//!     {
//!       "page_number": 1, "width": 515.0, "height": 728.0,
//!       "glyphs": [{"text": "a", "bbox": [72.0, 600.0, 78.0, 610.0]}],
//!       "regions": [[60.0, 500.0, 480.0, 620.0]]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{OverrunError, Result};
use crate::page::{Glyph, PageData, ScriptClass};
use crate::utils::Rect;

/// Supplies the pages of one document.
pub trait PageSource {
    fn document_id(&self) -> &str;

    fn page_count(&self) -> usize;

    /// Loads the page at zero-based `index`.
    fn load_page(&self, index: usize) -> Result<PageData>;
}

/// Pages already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPageSource {
    document_id: String,
    pages: Vec<PageData>,
}

impl MemoryPageSource {
    pub fn new(document_id: impl Into<String>, pages: Vec<PageData>) -> Self {
        Self {
            document_id: document_id.into(),
            pages,
        }
    }
}

impl PageSource for MemoryPageSource {
    fn document_id(&self) -> &str {
        &self.document_id
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn load_page(&self, index: usize) -> Result<PageData> {
        self.pages
            .get(index)
            .cloned()
            .ok_or(OverrunError::PageOutOfRange(index))
    }
}

#[derive(Debug, Deserialize)]
struct RawGlyph {
    text: String,
    bbox: Rect,
    #[serde(default)]
    script: Option<ScriptClass>,
}

impl From<RawGlyph> for Glyph {
    fn from(raw: RawGlyph) -> Self {
        match raw.script {
            Some(script) => Glyph::with_script(&raw.text, raw.bbox, script),
            None => Glyph::new(&raw.text, raw.bbox),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPage {
    page_number: u32,
    width: f64,
    height: f64,
    #[serde(default)]
    glyphs: Vec<RawGlyph>,
    #[serde(default)]
    regions: Vec<Rect>,
}

impl From<RawPage> for PageData {
    fn from(raw: RawPage) -> Self {
        PageData::new(raw.page_number, raw.width, raw.height)
            .with_glyphs(raw.glyphs.into_iter().map(Glyph::from).collect())
            .with_regions(raw.regions)
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    document_id: String,
    #[serde(default)]
    pages: Vec<serde_json::Value>,
}

/// Page dump produced by an external extractor.
///
/// Only the document envelope is parsed up front. Each page is decoded in
/// `load_page`, so a malformed page fails on its own.
#[derive(Debug, Clone)]
pub struct JsonPageSource {
    document_id: String,
    pages: Vec<serde_json::Value>,
}

impl JsonPageSource {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: RawDocument = serde_json::from_str(s)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        let raw: RawDocument = serde_json::from_reader(reader)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    fn from_raw(raw: RawDocument) -> Self {
        Self {
            document_id: raw.document_id,
            pages: raw.pages,
        }
    }
}

impl PageSource for JsonPageSource {
    fn document_id(&self) -> &str {
        &self.document_id
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn load_page(&self, index: usize) -> Result<PageData> {
        let value = self
            .pages
            .get(index)
            .ok_or(OverrunError::PageOutOfRange(index))?;
        let raw = RawPage::deserialize(value)?;
        Ok(PageData::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"{
        "document_id": "ch05",
        "pages": [
            {
                "page_number": 7, "width": 515.0, "height": 728.0,
                "glyphs": [
                    {"text": "a", "bbox": [72.0, 600.0, 78.0, 610.0]},
                    {"text": ")", "bbox": [480.0, 600.0, 490.0, 610.0], "script": "japanese"}
                ],
                "regions": [[60.0, 500.0, 480.0, 620.0]]
            },
            {"page_number": 8, "width": 515.0, "height": 728.0}
        ]
    }"#;

    #[test]
    fn parses_page_dump() {
        let source = JsonPageSource::from_json_str(DUMP).unwrap();
        assert_eq!(source.document_id(), "ch05");
        assert_eq!(source.page_count(), 2);

        let page = source.load_page(0).unwrap();
        assert_eq!(page.page_number, 7);
        assert_eq!(page.glyphs.len(), 2);
        assert_eq!(page.glyphs[0].script_class(), ScriptClass::Ascii);
        assert_eq!(page.glyphs[1].script_class(), ScriptClass::Japanese);
        assert_eq!(page.regions, vec![(60.0, 500.0, 480.0, 620.0)]);

        let empty = source.load_page(1).unwrap();
        assert!(empty.glyphs.is_empty());
    }

    #[test]
    fn out_of_range_page_is_an_error() {
        let source = JsonPageSource::from_json_str(DUMP).unwrap();
        assert!(matches!(
            source.load_page(2),
            Err(OverrunError::PageOutOfRange(2))
        ));
    }

    #[test]
    fn malformed_page_fails_alone() {
        let dump = r#"{
            "document_id": "ch06",
            "pages": [
                {"page_number": 1, "width": 515.0, "height": 728.0},
                {"page_number": 2, "width": 515.0, "height": 728.0,
                 "glyphs": [{"text": "a", "bbox": [72.0, 600.0, 78.0]}]},
                {"page_number": 3, "width": 515.0, "height": 728.0}
            ]
        }"#;
        let source = JsonPageSource::from_json_str(dump).unwrap();
        assert_eq!(source.page_count(), 3);
        assert_eq!(source.load_page(0).unwrap().page_number, 1);
        assert!(matches!(source.load_page(1), Err(OverrunError::PageDump(_))));
        assert_eq!(source.load_page(2).unwrap().page_number, 3);
    }

    #[test]
    fn malformed_dump_is_an_error() {
        let err = JsonPageSource::from_json_str(r#"{"pages": []}"#).unwrap_err();
        assert!(matches!(err, OverrunError::PageDump(_)));
    }
}
