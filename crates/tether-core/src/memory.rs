//! In-memory token store.

use std::sync::{PoisonError, RwLock};

use crate::Result;
use crate::tokens::{AccessToken, Credential};
use crate::traits::TokenStore;

/// A token store that lives as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    credential: RwLock<Option<Credential>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a token.
    pub fn with_token(token: AccessToken) -> Self {
        Self {
            credential: RwLock::new(Some(Credential::new(token))),
        }
    }
}

impl TokenStore for InMemoryTokenStore {
    fn get(&self) -> Option<Credential> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: AccessToken) -> Result<()> {
        let mut slot = self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(match slot.take() {
            Some(existing) => existing.renewed(token),
            None => Credential::new(token),
        });
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear() {
        let store = InMemoryTokenStore::new();
        assert!(store.get().is_none());

        store.set(AccessToken::new("T1")).unwrap();
        let first = store.get().unwrap();
        assert_eq!(first.access_token.as_str(), "T1");

        store.set(AccessToken::new("T2")).unwrap();
        let second = store.get().unwrap();
        assert_eq!(second.access_token.as_str(), "T2");
        assert_eq!(second.issued_for, first.issued_for);

        store.clear().unwrap();
        assert!(store.get().is_none());
    }
}
