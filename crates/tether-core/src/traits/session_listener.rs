//! Session expiry notification.

/// Presentation-layer collaborator told when a session cannot be recovered.
///
/// By the time this is called the token store has already been cleared.
/// Typical implementations route the user back to a login surface.
pub trait SessionListener: Send + Sync {
    fn on_session_expired(&self);
}

/// Ignores session expiry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSessionListener;

impl SessionListener for NoopSessionListener {
    fn on_session_expired(&self) {}
}
