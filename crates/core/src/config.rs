//! Detector configuration.
//!
//! Contains `DetectorConfig`, which holds the margin tables, thresholds and
//! the ordered filter list. A config is validated once, before any page is
//! processed; after that no per-page configuration failure is possible.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{OverrunError, Result};

/// Left and right margins of one page parity, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginSpec {
    pub left_mm: f64,
    pub right_mm: f64,
}

impl MarginSpec {
    pub const fn new(left_mm: f64, right_mm: f64) -> Self {
        Self { left_mm, right_mm }
    }
}

/// Identifier of a false-positive filter, as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterId {
    MeasurementError,
    PageNumber,
    JapaneseText,
    SymbolOnly,
    PowershellPrompt,
}

impl FilterId {
    pub const ALL: [FilterId; 5] = [
        FilterId::MeasurementError,
        FilterId::PageNumber,
        FilterId::JapaneseText,
        FilterId::SymbolOnly,
        FilterId::PowershellPrompt,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            FilterId::MeasurementError => "measurement_error",
            FilterId::PageNumber => "page_number",
            FilterId::JapaneseText => "japanese_text",
            FilterId::SymbolOnly => "symbol_only",
            FilterId::PowershellPrompt => "powershell_prompt",
        }
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterId {
    type Err = OverrunError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase().replace('-', "_");
        FilterId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| OverrunError::Config(format!("unknown filter identifier: {s}")))
    }
}

/// Running header/footer bands measured from the bottom and top page edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageNumberBand {
    pub bottom_pt: f64,
    pub top_pt: f64,
}

impl Default for PageNumberBand {
    fn default() -> Self {
        Self {
            bottom_pt: 50.0,
            top_pt: 50.0,
        }
    }
}

pub const DEFAULT_OVERFLOW_THRESHOLD_PT: f64 = 0.1;
pub const DEFAULT_MEASUREMENT_ERROR_THRESHOLD_PT: f64 = 1.0;
pub const DEFAULT_CODE_BLOCK_MIN_WIDTH_PT: f64 = 100.0;
pub const DEFAULT_CODE_BLOCK_MIN_HEIGHT_PT: f64 = 10.0;

/// Closing brackets, periods and commas allowed to hang past the column.
pub const DEFAULT_JAPANESE_PUNCTUATION: &str = "、。，．）」』】〕〉》］｝〙〗";

/// Console transcript prompts and continuation markers.
pub const DEFAULT_PROMPT_PATTERNS: [&str; 3] =
    [r"^PS [A-Za-z]:\\[^>]*>", r"^PS /[^>]*>", r"^>>( |$)"];

fn default_overflow_threshold() -> f64 {
    DEFAULT_OVERFLOW_THRESHOLD_PT
}

fn default_measurement_error_threshold() -> f64 {
    DEFAULT_MEASUREMENT_ERROR_THRESHOLD_PT
}

fn default_enabled_filters() -> Vec<FilterId> {
    FilterId::ALL.to_vec()
}

fn default_code_block_min_width() -> f64 {
    DEFAULT_CODE_BLOCK_MIN_WIDTH_PT
}

fn default_code_block_min_height() -> f64 {
    DEFAULT_CODE_BLOCK_MIN_HEIGHT_PT
}

fn default_japanese_punctuation() -> String {
    DEFAULT_JAPANESE_PUNCTUATION.to_string()
}

fn default_prompt_patterns() -> Vec<String> {
    DEFAULT_PROMPT_PATTERNS.iter().map(|p| p.to_string()).collect()
}

/// Configuration for the detector and its filter chain.
///
/// The margin tables are required in a configuration file; every other key
/// falls back to the default profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Margins applied to odd (recto) pages.
    pub odd_margins: MarginSpec,

    /// Margins applied to even (verso) pages.
    pub even_margins: MarginSpec,

    /// A glyph overflows when `x1 - text_right_edge` is strictly greater than this.
    #[serde(default = "default_overflow_threshold")]
    pub overflow_threshold_pt: f64,

    /// Overflow below this amount is treated as font-metric rounding noise.
    #[serde(default = "default_measurement_error_threshold")]
    pub measurement_error_threshold_pt: f64,

    /// Filters to run, in order.
    #[serde(default = "default_enabled_filters")]
    pub enabled_filters: Vec<FilterId>,

    /// A filled rectangle must be wider than this to count as a code block.
    #[serde(default = "default_code_block_min_width")]
    pub code_block_min_width_pt: f64,

    /// A filled rectangle must be taller than this to count as a code block.
    #[serde(default = "default_code_block_min_height")]
    pub code_block_min_height_pt: f64,

    #[serde(default)]
    pub page_number_band: PageNumberBand,

    /// Trailing marks the Japanese filter lets overhang.
    #[serde(default = "default_japanese_punctuation")]
    pub japanese_punctuation: String,

    /// Regular expressions matched against whole line text by the prompt filter.
    #[serde(default = "default_prompt_patterns")]
    pub prompt_patterns: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            odd_margins: MarginSpec::new(20.0, 10.0),
            even_margins: MarginSpec::new(10.0, 20.0),
            overflow_threshold_pt: default_overflow_threshold(),
            measurement_error_threshold_pt: default_measurement_error_threshold(),
            enabled_filters: default_enabled_filters(),
            code_block_min_width_pt: default_code_block_min_width(),
            code_block_min_height_pt: default_code_block_min_height(),
            page_number_band: PageNumberBand::default(),
            japanese_punctuation: default_japanese_punctuation(),
            prompt_patterns: default_prompt_patterns(),
        }
    }
}

impl DetectorConfig {
    /// Parses and validates a TOML configuration.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: DetectorConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Checks every value the detector relies on.
    pub fn validate(&self) -> Result<()> {
        for (name, margins) in [
            ("odd_margins", self.odd_margins),
            ("even_margins", self.even_margins),
        ] {
            check_positive(&format!("{name}.left_mm"), margins.left_mm)?;
            check_positive(&format!("{name}.right_mm"), margins.right_mm)?;
        }

        check_non_negative("overflow_threshold_pt", self.overflow_threshold_pt)?;
        check_non_negative(
            "measurement_error_threshold_pt",
            self.measurement_error_threshold_pt,
        )?;
        check_non_negative("code_block_min_width_pt", self.code_block_min_width_pt)?;
        check_non_negative("code_block_min_height_pt", self.code_block_min_height_pt)?;
        check_non_negative("page_number_band.bottom_pt", self.page_number_band.bottom_pt)?;
        check_non_negative("page_number_band.top_pt", self.page_number_band.top_pt)?;

        let mut seen = FxHashSet::default();
        for id in &self.enabled_filters {
            if !seen.insert(*id) {
                return Err(OverrunError::Config(format!(
                    "filter {id} is listed more than once"
                )));
            }
        }

        if self.enabled_filters.contains(&FilterId::JapaneseText)
            && self.japanese_punctuation.trim().is_empty()
        {
            return Err(OverrunError::Config(
                "japanese_punctuation is empty but japanese_text is enabled".to_string(),
            ));
        }

        self.compile_prompt_patterns()?;
        Ok(())
    }

    /// Compiles the prompt patterns, reporting the first invalid one.
    pub fn compile_prompt_patterns(&self) -> Result<Vec<Regex>> {
        self.prompt_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    OverrunError::Config(format!("invalid prompt pattern {p:?}: {e}"))
                })
            })
            .collect()
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(OverrunError::Config(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(OverrunError::Config(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}
