//! Error types for appgate-state

use thiserror::Error;

/// Errors raised while opening or preparing a version ledger backend
#[derive(Error, Debug)]
pub enum StateError {
    /// Backend could not be opened
    #[error("Ledger open failed: {0}")]
    Open(String),

    /// Backend directory or file could not be prepared
    #[error("Ledger setup failed: {0}")]
    Setup(String),
}

/// Errors returned by the storage traits and the configuration provider
#[derive(Error, Debug)]
pub enum StorageError {
    /// A record carried a version string that is not `major.minor.patch[.suffix]`
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Underlying I/O failure
    #[error("ledger I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A persisted line could not be decoded
    #[error("corrupt ledger entry at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    /// Backend connection-level failure
    #[error(transparent)]
    State(#[from] StateError),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_version_display_names_the_input() {
        let err = StorageError::InvalidVersion {
            version: "1.x.3".to_string(),
            reason: "minor component is not numeric".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("1.x.3"));
        assert!(msg.contains("minor"));
    }

    #[test]
    fn corrupt_entry_reports_line() {
        let err = StorageError::Corrupt {
            line: 7,
            reason: "EOF while parsing".to_string(),
        };
        assert!(err.to_string().contains("line 7"));
    }
}
