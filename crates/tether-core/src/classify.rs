//! Failure classification.
//!
//! Both functions are pure: the same input always yields the same kind.

use crate::error::TransportError;
use crate::response::FailureKind;

/// Message fragments that identify a network-level failure even when the
/// transport could not tell us so structurally. Matched case-insensitively.
const NETWORK_FAILURE_MARKERS: &[&str] = &[
    "failed to fetch",
    "networkerror",
    "network request failed",
    "load failed",
    "connection refused",
    "connection reset",
    "connection closed",
    "dns error",
];

/// Classify an HTTP status. Returns `None` for 2xx.
pub fn classify_status(status: u16) -> Option<FailureKind> {
    match status {
        200..=299 => None,
        401 => Some(FailureKind::AuthExpired),
        400..=499 => Some(FailureKind::ClientError),
        500..=u16::MAX => Some(FailureKind::ServerError),
        _ => Some(FailureKind::Unknown),
    }
}

/// Classify a transport error.
///
/// Connection, DNS and timeout errors are network failures. Otherwise the
/// message is matched against known network-failure markers; anything that
/// does not match is `Unknown` and will not be retried.
pub fn classify_transport(error: &TransportError) -> FailureKind {
    match error {
        TransportError::Connection { .. } | TransportError::Dns { .. } | TransportError::Timeout => {
            FailureKind::Network
        }
        TransportError::Tls { message } | TransportError::Http { message } => {
            if is_network_message(message) {
                FailureKind::Network
            } else {
                FailureKind::Unknown
            }
        }
    }
}

fn is_network_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    NETWORK_FAILURE_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}
