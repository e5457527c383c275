//! Error handling for infection cluster analysis.

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Errors that can occur while loading datasets or running the analysis
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// A required dataset was not supplied or contained no rows
    #[error("Missing dataset: {0}")]
    MissingDataset(&'static str),

    /// A dataset lacks one or more required columns
    #[error("Table '{table}' is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        table: &'static str,
        columns: Vec<String>,
    },

    /// A date field could not be parsed
    #[error("Table '{table}', row {row}: cannot parse {column} value '{value}' as a date")]
    DateParse {
        table: &'static str,
        row: usize,
        column: &'static str,
        value: String,
    },

    /// A field held a value the analysis cannot use
    #[error("Table '{table}', row {row}: invalid {column}: {message}")]
    InvalidValue {
        table: &'static str,
        row: usize,
        column: &'static str,
        message: String,
    },

    /// Unsupported input file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Rows could not be decoded from a record batch
    #[error("Row decoding error: {0}")]
    Decode(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClusterError {
    /// Whether the error describes the shape of the input rather than its values
    #[must_use]
    pub const fn is_input_shape(&self) -> bool {
        matches!(
            self,
            Self::MissingDataset(_) | Self::MissingColumns { .. } | Self::UnsupportedFormat(_)
        )
    }
}

impl From<serde_arrow::Error> for ClusterError {
    fn from(error: serde_arrow::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// Result type for cluster analysis operations
pub type Result<T> = std::result::Result<T, ClusterError>;
