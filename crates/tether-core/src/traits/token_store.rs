//! Token store trait.

use crate::tokens::{AccessToken, Credential};
use crate::Result;

/// Holds the access credential for the current session.
///
/// No expiry is tracked here; expiry is discovered when the API answers 401.
pub trait TokenStore: Send + Sync {
    /// Returns the stored credential, if any.
    fn get(&self) -> Option<Credential>;

    /// Store a new access token.
    ///
    /// Renews the current session if a credential exists, otherwise starts a
    /// new one.
    fn set(&self, token: AccessToken) -> Result<()>;

    /// Remove the stored credential.
    fn clear(&self) -> Result<()>;
}
