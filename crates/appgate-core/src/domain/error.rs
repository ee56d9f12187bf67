//! Error taxonomy for the version gate.

use appgate_state::{ParseError, StorageError};

/// Errors produced while evaluating a request against the version gate.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("version parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid gate configuration: {0}")]
    Config(String),

    #[error("invalid header value: {0}")]
    Header(#[from] http::header::InvalidHeaderValue),

    #[error("invalid header name: {0}")]
    HeaderName(#[from] http::header::InvalidHeaderName),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;
