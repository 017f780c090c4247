use std::path::PathBuf;

use thiserror::Error;

use crate::data_source::SourceError;

/// Validation and contract errors exposed by `niftylens-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptySymbol,
    #[error("ticker length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("ticker must start with an ASCII letter or digit: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("end date must fall after start date (start {start}, end {end})")]
    InvertedDateRange { start: String, end: String },

    #[error("moving average window must be a positive integer")]
    InvalidWindow,

    #[error("select at least one ticker to analyse")]
    EmptySelection,
    #[error("ticker '{symbol}' is not listed in the catalog")]
    UnknownTicker { symbol: String },
    #[error("window override given for '{symbol}', which is not selected")]
    WindowForUnselected { symbol: String },
    #[error("conflicting window overrides for '{symbol}': {first} and {second}")]
    ConflictingWindows {
        symbol: String,
        first: usize,
        second: usize,
    },
    #[error("company name cannot be empty")]
    EmptyCompanyName,
}

/// Failures while loading the reference ticker catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("catalog is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("catalog row {line} is invalid: {source}")]
    InvalidRow {
        line: u64,
        #[source]
        source: ValidationError,
    },

    #[error("catalog parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Hard failure retrieving one ticker's price history.
///
/// Carries the offending ticker so a batch report can attribute it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("fetch failed for {ticker}: {source}")]
pub struct FetchError {
    pub ticker: String,
    #[source]
    pub source: SourceError,
}

impl FetchError {
    pub fn new(ticker: impl Into<String>, source: SourceError) -> Self {
        Self {
            ticker: ticker.into(),
            source,
        }
    }
}

/// Top-level error type for pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
