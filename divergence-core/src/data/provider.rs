//! Series provider trait and structured error types.
//!
//! A run reads from exactly two providers: Yahoo Finance for the equity and
//! FRED for the macro series. The trait exists so the pipeline can be driven
//! by in-memory stubs in tests.

use super::series::TimeSeries;
use chrono::NaiveDate;
use thiserror::Error;

/// Structured error types for provider calls.
///
/// These are displayable directly in CLI output.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from {provider} for '{id}'")]
    HttpStatus {
        provider: &'static str,
        id: String,
        status: u16,
    },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("no data for '{id}' between {start} and {end}")]
    NoData {
        id: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// A source of one dated series over an inclusive date range.
pub trait SeriesProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the series identified by `id` over `[start, end]`.
    ///
    /// Implementations return `DataError::NoData` rather than an empty series.
    fn fetch(&self, id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, DataError>;
}

/// Map a transport failure from reqwest into a `DataError`.
pub(crate) fn transport_error(e: reqwest::Error) -> DataError {
    DataError::NetworkUnreachable(e.to_string())
}
