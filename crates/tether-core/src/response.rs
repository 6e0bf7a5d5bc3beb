//! Normalized call results and the failure taxonomy.

use std::fmt;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, ProtocolError, TransportError};

/// Outcome of one logical call.
pub type NormalizedResult = std::result::Result<ResponseBody, Failure>;

/// A response body, parsed as JSON when the content type says so.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    /// Returns the JSON value, if the body was parsed as JSON.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// Returns the text, if the body was kept as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(_) => None,
            ResponseBody::Text(text) => Some(text),
        }
    }

    /// Unwrap a `{ success, data }` envelope into the caller's type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the body is not JSON, the envelope
    /// reports `success: false`, or `data` does not decode as `T`.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, Error> {
        let value = match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(_) => {
                return Err(ProtocolError::new(None, "expected a JSON envelope").into());
            }
        };

        let envelope: Envelope<serde_json::Value> = serde_json::from_value(value)
            .map_err(|e| ProtocolError::new(None, e.to_string()))?;

        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "request was not successful".to_string());
            return Err(ProtocolError::new(envelope.code, message).into());
        }

        serde_json::from_value(envelope.data.unwrap_or(serde_json::Value::Null))
            .map_err(|e| ProtocolError::new(None, e.to_string()).into())
    }
}

/// The `{ success, data }` envelope API responses are wrapped in.
///
/// Failure bodies may carry `message` and `code` instead of `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "code_as_string")]
    pub code: Option<String>,
}

fn code_as_string<'de, D: serde::Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(de)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Caller-visible failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Connectivity was unavailable; no request was sent.
    Offline,
    /// Connection or DNS level failure.
    Network,
    /// Status 500 or above.
    ServerError,
    /// Status 401.
    AuthExpired,
    /// Any other 4xx.
    ClientError,
    /// Anything the classifier does not recognize.
    Unknown,
}

impl FailureKind {
    /// Whether the pipeline may back off and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::Network | FailureKind::ServerError)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Offline => "offline",
            FailureKind::Network => "network",
            FailureKind::ServerError => "server_error",
            FailureKind::AuthExpired => "auth_expired",
            FailureKind::ClientError => "client_error",
            FailureKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terminal failure of a logical call.
///
/// Callers that only need to branch on the status (for example 403 for
/// permission messaging) can ignore `kind`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub status: Option<u16>,
    pub message: String,
    /// Application error code from a structured error body.
    pub code: Option<String>,
    /// Best-effort parsed body of the failing response.
    pub raw_body: Option<ResponseBody>,
    session_expired: bool,
}

impl Failure {
    pub fn new(kind: FailureKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            code: None,
            raw_body: None,
            session_expired: false,
        }
    }

    /// The pipeline refused to send because connectivity was unavailable.
    pub fn offline() -> Self {
        Self::new(
            FailureKind::Offline,
            None,
            "No network connection. Check your connectivity and try again.",
        )
    }

    /// The access token expired and could not be refreshed.
    pub fn session_expired() -> Self {
        Self {
            session_expired: true,
            ..Self::new(
                FailureKind::AuthExpired,
                Some(401),
                "Session expired. Please log in again.",
            )
        }
    }

    /// Build a failure from a transport error the classifier has labelled.
    pub fn from_transport(error: &TransportError, kind: FailureKind) -> Self {
        let message = match kind {
            FailureKind::Network => format!("Network error: {}", error),
            _ => error.to_string(),
        };
        Self::new(kind, None, message)
    }

    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    pub fn with_raw_body(mut self, body: ResponseBody) -> Self {
        self.raw_body = Some(body);
        self
    }

    /// True when the session was cleared because refresh failed.
    ///
    /// This is distinct from a 401 returned to a call that never required
    /// authentication (for example a rejected login).
    pub fn is_session_expired(&self) -> bool {
        self.session_expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Board {
        id: u32,
        title: String,
    }

    #[test]
    fn into_data_unwraps_envelope() {
        let body = ResponseBody::Json(json!({
            "success": true,
            "data": [{ "id": 1, "title": "first" }]
        }));
        let boards: Vec<Board> = body.into_data().unwrap();
        assert_eq!(
            boards,
            vec![Board {
                id: 1,
                title: "first".into()
            }]
        );
    }

    #[test]
    fn into_data_allows_missing_data_for_unit() {
        let body = ResponseBody::Json(json!({ "success": true }));
        let () = body.into_data().unwrap();
    }

    #[test]
    fn into_data_reports_unsuccessful_envelope() {
        let body = ResponseBody::Json(json!({
            "success": false,
            "message": "already subscribed",
            "code": 1009
        }));
        let err = body.into_data::<serde_json::Value>().unwrap_err();
        match err {
            Error::Protocol(p) => {
                assert_eq!(p.code.as_deref(), Some("1009"));
                assert_eq!(p.message, "already subscribed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn into_data_rejects_text() {
        let body = ResponseBody::Text("ok".into());
        assert!(body.into_data::<serde_json::Value>().is_err());
    }

    #[test]
    fn only_network_and_server_errors_retry() {
        assert!(FailureKind::Network.is_retryable());
        assert!(FailureKind::ServerError.is_retryable());
        for kind in [
            FailureKind::Offline,
            FailureKind::AuthExpired,
            FailureKind::ClientError,
            FailureKind::Unknown,
        ] {
            assert!(!kind.is_retryable(), "{kind} should not retry");
        }
    }

    #[test]
    fn session_expired_is_distinct_from_plain_401() {
        assert!(Failure::session_expired().is_session_expired());
        let plain = Failure::new(FailureKind::AuthExpired, Some(401), "bad password");
        assert!(!plain.is_session_expired());
    }
}
