//! Error types for the overrun overflow detector.

use thiserror::Error;

/// Primary error type for configuration and document-level failures.
///
/// Per-glyph and per-filter problems never surface here; they are recorded
/// as [`crate::report::Diagnostic`]s and processing continues.
#[derive(Error, Debug)]
pub enum OverrunError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid TOML configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("page dump error: {0}")]
    PageDump(#[from] serde_json::Error),

    #[error("invalid page {page}: {msg}")]
    InvalidPage { page: u32, msg: String },

    #[error("page index {0} out of range")]
    PageOutOfRange(usize),

    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

/// Convenience Result type alias for OverrunError.
pub type Result<T> = std::result::Result<T, OverrunError>;
