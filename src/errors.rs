//! Centralized error handling for grouped reductions
//!
//! Every fallible operation in the crate returns [`Result`], whose error type
//! separates caller configuration mistakes from invalid parameter values and
//! from failures raised inside a compute engine.

use std::fmt;

/// Main error type for grouped reduction operations
#[derive(Debug)]
pub enum GroupAggError {
    /// Unknown engine identifier, unknown statistic name, or a statistic
    /// requested from an engine that does not implement it
    ConfigurationError(String),

    /// Invalid parameter value (quantile fraction, axis, labels, fill/dtype mismatch)
    ValueError(String),

    /// Failure raised by a compute engine, surfaced unchanged
    EngineError { engine: &'static str, message: String },

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Malformed JSON payload
    JsonError(serde_json::Error),

    /// Payload was valid JSON but not a valid reduction input
    InputError(String),

    /// Thread pool configuration error
    ThreadPoolError(String),
}

impl fmt::Display for GroupAggError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupAggError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            GroupAggError::ValueError(msg) => write!(f, "Value error: {}", msg),
            GroupAggError::EngineError { engine, message } => {
                write!(f, "Engine '{}' failed: {}", engine, message)
            }
            GroupAggError::ArrayError(e) => write!(f, "Array error: {}", e),
            GroupAggError::IoError(e) => write!(f, "I/O error: {}", e),
            GroupAggError::JsonError(e) => write!(f, "JSON error: {}", e),
            GroupAggError::InputError(msg) => write!(f, "Invalid input payload: {}", msg),
            GroupAggError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
        }
    }
}

impl std::error::Error for GroupAggError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GroupAggError::ArrayError(e) => Some(e),
            GroupAggError::IoError(e) => Some(e),
            GroupAggError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ndarray::ShapeError> for GroupAggError {
    fn from(error: ndarray::ShapeError) -> Self {
        GroupAggError::ArrayError(error)
    }
}

impl From<std::io::Error> for GroupAggError {
    fn from(error: std::io::Error) -> Self {
        GroupAggError::IoError(error)
    }
}

impl From<serde_json::Error> for GroupAggError {
    fn from(error: serde_json::Error) -> Self {
        GroupAggError::JsonError(error)
    }
}

impl GroupAggError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        GroupAggError::ConfigurationError(msg.into())
    }

    pub(crate) fn value(msg: impl Into<String>) -> Self {
        GroupAggError::ValueError(msg.into())
    }
}

/// Result type alias for grouped reduction operations
pub type Result<T> = std::result::Result<T, GroupAggError>;
