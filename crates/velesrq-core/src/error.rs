//! Error types for velesrq-core.

use thiserror::Error;

/// RQ encoding error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Dimension is zero or too large to be represented in a packed record.
    #[error("Invalid dimension: {0} (must be in 1..=u32::MAX)")]
    InvalidDimension(usize),

    /// Input vector length does not match the configured dimension.
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Configured dimension.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// Caller-supplied output or scratch buffer has the wrong length.
    #[error("Buffer size mismatch: expected {expected} bytes/elements, got {actual}")]
    BufferSize {
        /// Required length.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed input data (truncated fvecs record, bad header...).
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for RQ operations.
pub type Result<T> = std::result::Result<T, Error>;
