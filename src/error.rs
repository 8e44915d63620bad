//! Error types for the Kohonen SOM trainer.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for SOM operations.
#[derive(Error, Debug)]
pub enum SomError {
    /// The data source could not be opened.
    #[error("Data source unavailable: {path}: {source}")]
    SourceUnavailable {
        /// Path of the source that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A data row had the wrong shape, an unparsable or non-finite value, or undecodable bytes.
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow {
        /// 1-based line number within the source (0 when unknown).
        line: usize,
        /// What was wrong with the row.
        reason: String,
    },

    /// The data source contains no usable rows.
    #[error("Empty data source: {0}")]
    EmptySource(String),

    /// Input vector length differs from the grid's dimensionality.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality the grid was built with.
        expected: usize,
        /// Dimensionality that was supplied.
        actual: usize,
    },

    /// Index out of bounds.
    #[error("Index out of bounds: {index} >= {max}")]
    IndexOutOfBounds {
        /// The index that was out of bounds.
        index: usize,
        /// The maximum allowed index.
        max: usize,
    },

    /// The weight buffer could not be allocated.
    #[error("Cannot allocate grid of {rows}x{cols}x{dims} weights")]
    Allocation {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
        /// Requested input dimensionality.
        dims: usize,
    },

    /// Training could not run.
    #[error("Training error: {0}")]
    Training(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A saved grid file is not in the expected format.
    #[error("Invalid grid format: {0}")]
    InvalidFormat(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SOM operations.
pub type Result<T> = std::result::Result<T, SomError>;

impl SomError {
    /// Returns true for errors the training loop skips instead of aborting on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SomError::MalformedRow { .. })
    }
}
