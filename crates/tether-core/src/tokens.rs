//! Access credential types.
//!
//! Only the short-lived access token is ever held in memory. The long-lived
//! refresh artifact lives in the transport's cookie jar and has no type here.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bearer token for authenticated requests.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP authorization headers or persisting
    /// the token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `Authorization` header value for this token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// Identifies the login session a credential was issued for.
///
/// A new id is minted at login; refreshes keep it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The stored access credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: AccessToken,
    pub issued_for: SessionId,
    pub issued_at: DateTime<Utc>,
}

impl Credential {
    /// Start a new session with the given token.
    pub fn new(access_token: AccessToken) -> Self {
        Self {
            access_token,
            issued_for: SessionId::generate(),
            issued_at: Utc::now(),
        }
    }

    /// Replace the token within the same session.
    pub fn renewed(self, access_token: AccessToken) -> Self {
        Self {
            access_token,
            issued_for: self.issued_for,
            issued_at: Utc::now(),
        }
    }
}
