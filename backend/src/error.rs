//! Error types for the sales pivot backend.
//!
//! One error type per layer:
//!
//! - [`SourceError`] - Reading a raw source (CSV, spreadsheet, JSON batches)
//! - [`StoreError`] - Loading or reloading the record store
//! - [`QueryError`] - Rejected filter selections
//! - [`ServerError`] - Top-level HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while reading a raw record source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to open or read the source.
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV content.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet could not be opened or decoded.
    #[error("Invalid spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// Malformed JSON content.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Text could not be decoded.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// File extension not recognised.
    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    /// Workbook without any worksheet.
    #[error("Spreadsheet has no worksheet")]
    NoWorksheet,

    /// No header row found.
    #[error("No headers found in source")]
    NoHeaders,

    /// JSON source that is not a list of objects.
    #[error("Expected a JSON array of objects: {0}")]
    NotRecordArray(String),
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors from the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The whole source could not be read. Fatal at startup.
    #[error("Source unavailable ({origin}): {source}")]
    SourceUnavailable {
        origin: String,
        #[source]
        source: SourceError,
    },

    /// Reload requested on a store built from in-memory records.
    #[error("Store has no source to reload from")]
    NoOrigin,
}

impl StoreError {
    pub fn unavailable(origin: impl Into<String>, source: SourceError) -> Self {
        Self::SourceUnavailable {
            origin: origin.into(),
            source,
        }
    }
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors raised by the query boundary.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The selection references values of the wrong type or unknown fields.
    #[error("Invalid selection: {}", .errors.join("; "))]
    InvalidSelection { errors: Vec<String> },
}

impl QueryError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidSelection {
            errors: vec![message.into()],
        }
    }

    /// Individual validation messages.
    pub fn messages(&self) -> &[String] {
        match self {
            Self::InvalidSelection { errors } => errors,
        }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Query error.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Socket bind or serve failure.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source readers.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for queries.
pub type QueryResult<T> = Result<T, QueryError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // SourceError -> StoreError
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.xlsx");
        let store_err = StoreError::unavailable("missing.xlsx", io.into());
        assert!(store_err.to_string().contains("Source unavailable"));
        assert!(store_err.to_string().contains("missing.xlsx"));

        // StoreError -> ServerError
        let server_err: ServerError = store_err.into();
        assert!(server_err.to_string().contains("Store error"));
    }

    #[test]
    fn test_invalid_selection_format() {
        let err = QueryError::InvalidSelection {
            errors: vec!["years[0]: expected integer".into(), "unknown field 'brand'".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("years[0]"));
        assert!(msg.contains("brand"));
        assert_eq!(err.messages().len(), 2);
    }
}
