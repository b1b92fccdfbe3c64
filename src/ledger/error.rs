//! Error types for ledger persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reading, bootstrapping or rewriting the ledger file.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger file could not be read or written.
    #[error("IO error on ledger {path}: {source}")]
    Io {
        /// Ledger file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The ledger file is not valid ledger JSON.
    #[error("malformed ledger {path}: {source}")]
    Decode {
        /// Ledger file path.
        path: PathBuf,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory ledger could not be serialized.
    #[error("could not encode ledger {path}: {source}")]
    Encode {
        /// Ledger file path.
        path: PathBuf,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The downloads folder could not be obtained from the operator.
    #[error("could not read downloads folder for new ledger {path}: {source}")]
    Prompt {
        /// Ledger file path being created.
        path: PathBuf,
        /// The underlying input error.
        #[source]
        source: std::io::Error,
    },
}

impl LedgerError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a decode error.
    pub fn decode(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Decode {
            path: path.into(),
            source,
        }
    }

    /// Creates an encode error.
    pub fn encode(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Encode {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let msg = LedgerError::io("/tmp/ledger.json", io_error).to_string();
        assert!(msg.contains("/tmp/ledger.json"), "Expected path in: {msg}");
        assert!(msg.contains("denied"), "Expected source in: {msg}");
    }

    #[test]
    fn test_ledger_error_decode_display() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let msg = LedgerError::decode("/tmp/ledger.json", json_error).to_string();
        assert!(msg.starts_with("malformed ledger"), "Unexpected: {msg}");
    }
}
