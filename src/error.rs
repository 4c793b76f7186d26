use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Error type covering the failures that abort a conversion run.
///
/// Data-quality problems (unknown codes, malformed attribute lines, skipped
/// records) are never surfaced here; they are recorded in the
/// [`RunLog`](crate::runlog::RunLog) and the run continues.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the delimited-text reader.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the configuration file cannot be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Transport failures while talking to the specification service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Raised when the specification service answers with an unexpected status.
    #[error("specification service returned {status} for {url}")]
    RemoteStatus { url: String, status: u16 },

    /// Raised when a remote call is requested but no API key is configured.
    #[error("no API key configured for {0}")]
    MissingApiKey(&'static str),

    /// Raised when a sheet read back from disk is missing.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input directory not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
