//! Transport trait.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{OutgoingRequest, RawResponse};

/// Sends one request and reads the full response.
///
/// The transport owns the ambient session artifact (the refresh cookie). It
/// attaches it to every request and keeps whatever the server sets; nothing
/// above this trait ever reads it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError>;

    /// Forget the ambient session artifact.
    ///
    /// Called on logout. Transports without one have nothing to do.
    fn clear_session(&self) {}
}
