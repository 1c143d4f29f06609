use std::time::Duration;

/// Tabular query error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A condition, group key or statistic names a column the table lacks
    #[error("Column '{column}' not found in table")]
    UnknownColumn { column: String },

    /// Comparison operator outside eq|neq|gt|gte|lt|lte
    #[error("Operator '{operator}' not supported")]
    UnsupportedOperator { operator: String },

    /// Aggregation function outside sum|max|min|avg|mean
    #[error("Aggregation function not supported: {function}")]
    UnknownAggregationFunction { function: String },

    /// Statistics requested over a column that is not uniformly numeric
    #[error("Column '{column}' is not numeric")]
    NonNumericColumn { column: String },

    /// The page source kept reporting more pages past the configured ceiling
    #[error("Page source still had more records after {pages} pages")]
    SourceExhausted { pages: usize },

    /// Draining the page source took longer than the configured ceiling
    #[error("Page source timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// A property without a usable type tag
    #[error("Malformed property '{field}': {reason}")]
    MalformedRecord { field: String, reason: String },

    /// A reader option that cannot be used as given
    #[error("Invalid option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    /// Failure reported by an external record source
    #[error("Record source error: {0}")]
    Source(String),

    /// Arrow error (CSV decoding, table rendering)
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn unknown_column(column: impl Into<String>) -> Self {
        Error::UnknownColumn {
            column: column.into(),
        }
    }
}

/// Result type for tabular operations
pub type Result<T> = std::result::Result<T, Error>;
