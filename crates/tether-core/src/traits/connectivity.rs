//! Connectivity gate trait.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cheap pre-flight check of local network availability.
pub trait ConnectivityGate: Send + Sync {
    /// Returns true if the platform reports the network as available.
    fn check(&self) -> bool;
}

/// A shared online/offline flag the host flips as connectivity changes.
///
/// Clones share the same flag. Starts online.
#[derive(Debug, Clone)]
pub struct ConnectivityFlag(Arc<AtomicBool>);

impl ConnectivityFlag {
    pub fn new(online: bool) -> Self {
        Self(Arc::new(AtomicBool::new(online)))
    }

    pub fn set_online(&self, online: bool) {
        self.0.store(online, Ordering::Release);
    }
}

impl Default for ConnectivityFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityGate for ConnectivityFlag {
    fn check(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = ConnectivityFlag::default();
        let observer = flag.clone();
        assert!(observer.check());
        flag.set_online(false);
        assert!(!observer.check());
    }
}
