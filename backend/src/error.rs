//! Error types for the Pulseboard normalization pipeline.
//!
//! Errors are layered the same way the pipeline is:
//!
//! - [`CsvError`] - the document is not recognizable tabular text
//! - [`SourceError`] - the raw text could not be acquired at all
//! - [`PipelineError`] - top-level normalization failures
//! - [`LoadError`] - a dashboard load, keeping acquisition and format failures apart
//! - [`ServerError`] - HTTP surface errors
//!
//! Row-level skips and value-level fallbacks are never errors; they are
//! absorbed inside the pipeline and only show up in the load statistics.

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Format rejection raised by the row parser.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Document contains no text at all.
    #[error("CSV document is empty")]
    EmptyFile,

    /// First row is missing or has no usable header cell.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// Failed to decode the raw bytes.
    #[error("Failed to decode CSV content: {0}")]
    EncodingError(String),

    /// Delimited text could not be parsed.
    #[error("Invalid CSV format on line {line}: {message}")]
    ParseError { line: u64, message: String },
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        CsvError::ParseError {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Source Errors
// =============================================================================

/// Upstream acquisition failures. Surfaced separately from format rejection:
/// when one of these happens the pipeline never runs.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read a local file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("Fetching '{url}' returned status {status}")]
    Status { url: String, status: u16 },

    /// No source configured for a reload.
    #[error("No data source configured")]
    NotConfigured,
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level normalization errors.
///
/// This is the error type returned by [`crate::transform::pipeline::normalize_text`]
/// and friends. Any of these aborts the load with zero categories.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input is not recognizable tabular text.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// The parsed record sequence is empty.
    #[error("No records to normalize")]
    EmptyInput,
}

// =============================================================================
// Load Errors
// =============================================================================

/// Failure of one dashboard load. The held category set is left untouched.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Could not obtain the raw text.
    #[error("Could not load data: {0}")]
    Source(#[from] SourceError),

    /// Text was obtained but could not be normalized.
    #[error("Failed to process CSV: {0}")]
    Pipeline(#[from] PipelineError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Built-in data could not be prepared at startup.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Socket bind or serve failure.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for source acquisition.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for dashboard loads.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError -> LoadError
        let pipeline_err: PipelineError = CsvError::EmptyFile.into();
        assert!(pipeline_err.to_string().contains("empty"));

        let load_err: LoadError = pipeline_err.into();
        assert!(matches!(load_err, LoadError::Pipeline(_)));
        assert!(load_err.to_string().starts_with("Failed to process CSV"));
    }

    #[test]
    fn test_source_error_stays_distinct() {
        let load_err: LoadError = SourceError::Status {
            url: "http://example.test/data.csv".into(),
            status: 404,
        }
        .into();

        assert!(matches!(load_err, LoadError::Source(_)));
        let msg = load_err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("data.csv"));
    }

    #[test]
    fn test_parse_error_format() {
        let err = CsvError::ParseError {
            line: 7,
            message: "unequal lengths".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("unequal lengths"));
    }
}
