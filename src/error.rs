//! Error types for monitor rule editing and parsing

use thiserror::Error;

/// Main error type for monitor rule operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Index {index} out of range for group with {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: Vec<usize>, reason: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unknown kind: {0}")]
    UnknownKind(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for RuleError {
    fn from(err: serde_json::Error) -> Self {
        RuleError::Deserialization(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<RuleError> for pyo3::PyErr {
    fn from(err: RuleError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyIndexError, PyValueError};

        match err {
            RuleError::IndexOutOfRange { .. } => PyIndexError::new_err(err.to_string()),
            RuleError::InvalidPath { .. }
            | RuleError::InvalidQuery(_)
            | RuleError::UnknownKind(_)
            | RuleError::InvalidValue(_)
            | RuleError::Deserialization(_) => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Result type alias for monitor rule operations
pub type Result<T> = std::result::Result<T, RuleError>;
