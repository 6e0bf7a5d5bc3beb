//! Error types for the tether client.
//!
//! [`Error`] is what fallible library calls return. Terminal pipeline
//! failures are carried as [`Failure`] values inside [`Error::Request`], so
//! callers that only care about the HTTP status can reach it directly.

use std::fmt;
use thiserror::Error;

use crate::response::Failure;

/// The unified error type for tether operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A logical call reached a terminal failure.
    #[error("request failed: {0}")]
    Request(#[from] Failure),

    /// A successful response whose envelope could not be used.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (base URL, method, request body).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Credential persistence errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns the terminal failure, if this error carries one.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Error::Request(failure) => Some(failure),
            _ => None,
        }
    }

    /// Returns the HTTP status associated with this error, when known.
    pub fn status(&self) -> Option<u16> {
        self.failure().and_then(|failure| failure.status)
    }
}

/// Transport-level errors.
///
/// These are raised before any HTTP status is available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// DNS resolution failed.
    #[error("DNS resolution failed: {host}")]
    Dns { host: String },

    /// TLS/SSL error.
    #[error("TLS error: {message}")]
    Tls { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl TransportError {
    /// Shorthand for a generic transport error carrying only a message.
    pub fn http(message: impl Into<String>) -> Self {
        TransportError::Http {
            message: message.into(),
        }
    }
}

/// A 2xx response whose `{ success, data }` envelope was unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    /// Application error code (if present).
    pub code: Option<String>,
    /// Error message from the server, or a description of the decode failure.
    pub message: String,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref code) = self.code {
            write!(f, "[{}] ", code)?;
        }
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Unsupported HTTP method.
    #[error("invalid method '{value}'")]
    Method { value: String },

    /// Request body could not be serialized.
    #[error("invalid request body: {reason}")]
    Body { reason: String },
}

/// Credential persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored credential could not be encoded.
    #[error("could not encode credential: {0}")]
    Encode(#[from] serde_json::Error),

    /// Session cookies could not be encoded.
    #[error("could not encode cookies: {reason}")]
    Cookies { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::FailureKind;

    #[test]
    fn protocol_error_display_includes_code_and_message() {
        let err = ProtocolError::new(Some("E42".into()), "nope");
        assert_eq!(err.to_string(), "[E42] nope");
    }

    #[test]
    fn status_is_exposed_for_request_failures() {
        let err = Error::from(Failure::new(FailureKind::ClientError, Some(403), "forbidden"));
        assert_eq!(err.status(), Some(403));
        assert!(err.failure().is_some());

        let err = Error::from(TransportError::Timeout);
        assert_eq!(err.status(), None);
    }
}
