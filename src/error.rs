//! # Error Types
//!
//! This module defines error types used throughout the slipline library.
//!
//! The first six variants form the connection failure taxonomy. Their
//! `Display` output starts with the variant name, so a
//! [`ConnectionStatus`](crate::connection::ConnectionStatus) error string
//! always identifies the failure kind.

use thiserror::Error;

/// Main error type for slipline operations
#[derive(Debug, Error)]
pub enum SliplineError {
    /// The user cancelled the port picker
    #[error("AuthorizationDenied")]
    AuthorizationDenied,

    /// The picker closed without a port being chosen
    #[error("NoDeviceSelected")]
    NoDeviceSelected,

    /// The port could not be opened (busy, rejected parameters, revoked)
    #[error("OpenFailed: {0}")]
    OpenFailed(String),

    /// The port opened but no writer could be acquired
    #[error("WriterUnavailable")]
    WriterUnavailable,

    /// No usable persisted connection, or none of its candidates opened
    #[error("NoPersistentConnection{}", detail(.last_error))]
    NoPersistentConnection { last_error: Option<String> },

    /// Every candidate port (or baud rate) was tried and failed
    #[error("AllCandidatesFailed: {0}")]
    AllCandidatesFailed(String),

    /// An operation needed an open session
    #[error("NotConnected")]
    NotConnected,

    /// Transport-level errors (enumeration, write, close)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Connection record could not be written or removed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Template fields could not be turned into a document
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Settings that cannot be used
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn detail(last_error: &Option<String>) -> String {
    match last_error {
        Some(e) => format!(": {}", e),
        None => String::new(),
    }
}

impl SliplineError {
    /// Shorthand for a [`SliplineError::NoPersistentConnection`] with a cause.
    pub fn no_persistent(last_error: impl Into<String>) -> Self {
        Self::NoPersistentConnection {
            last_error: Some(last_error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_display_starts_with_kind() {
        assert_eq!(
            SliplineError::AuthorizationDenied.to_string(),
            "AuthorizationDenied"
        );
        assert_eq!(
            SliplineError::OpenFailed("busy".into()).to_string(),
            "OpenFailed: busy"
        );
        assert_eq!(
            SliplineError::NoPersistentConnection { last_error: None }.to_string(),
            "NoPersistentConnection"
        );
        assert_eq!(
            SliplineError::no_persistent("WriterUnavailable").to_string(),
            "NoPersistentConnection: WriterUnavailable"
        );
    }
}
