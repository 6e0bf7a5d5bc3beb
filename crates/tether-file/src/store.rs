//! File-backed token store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use tether_core::error::StorageError;
use tether_core::{AccessToken, Credential, Result, TokenStore};

use crate::file::{self, WriteLock};

/// A [`TokenStore`] backed by a JSON file.
///
/// Writers take an exclusive lock on a sibling `.lock` file, so two
/// processes sharing the same token file never interleave writes. Each
/// write replaces the file atomically, so readers never see a partial
/// credential. On Unix the token file is readable by the owner only.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store at the given path. Nothing is touched until the first
    /// write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn read(&self) -> Option<Credential> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot read token file");
                return None;
            }
        };

        match serde_json::from_slice(&content) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt token file");
                None
            }
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<Credential> {
        self.read()
    }

    #[instrument(skip(self, token), fields(path = %self.path.display()))]
    fn set(&self, token: AccessToken) -> Result<()> {
        let _lock = WriteLock::acquire(&self.path).map_err(|e| self.io_error(e))?;

        let credential = match self.read() {
            Some(existing) => existing.renewed(token),
            None => Credential::new(token),
        };
        let content = serde_json::to_vec_pretty(&credential).map_err(StorageError::from)?;
        file::replace(&self.path, &content).map_err(|e| self.io_error(e))?;

        debug!(session = %credential.issued_for, "Stored access token");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<()> {
        let _lock = WriteLock::acquire(&self.path).map_err(|e| self.io_error(e))?;
        file::remove(&self.path).map_err(|e| self.io_error(e))?;

        debug!("Removed token file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileTokenStore {
        FileTokenStore::new(dir.path().join("session").join("token.json"))
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        assert!(store_in(&dir).get().is_none());
    }

    #[test]
    fn set_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        store_in(&dir).set(AccessToken::new("T1")).unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.get().unwrap().access_token.as_str(), "T1");
    }

    #[test]
    fn set_renews_within_session() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set(AccessToken::new("T1")).unwrap();
        let first = store.get().unwrap();

        store.set(AccessToken::new("T2")).unwrap();
        let second = store.get().unwrap();

        assert_eq!(second.access_token.as_str(), "T2");
        assert_eq!(second.issued_for, first.issued_for);
    }

    #[test]
    fn shorter_token_overwrites_cleanly() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set(AccessToken::new("a-rather-long-first-token")).unwrap();
        store.set(AccessToken::new("T2")).unwrap();

        assert_eq!(store.get().unwrap().access_token.as_str(), "T2");
    }

    #[test]
    fn clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set(AccessToken::new("T1")).unwrap();
        assert!(store.path().exists());

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.get().is_none());

        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ definitely not a credential").unwrap();

        assert!(store.get().is_none());

        store.set(AccessToken::new("T1")).unwrap();
        assert_eq!(store.get().unwrap().access_token.as_str(), "T1");
    }

    #[test]
    fn token_is_not_in_debug_output() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set(AccessToken::new("secret-token")).unwrap();

        assert!(!format!("{:?}", store.get().unwrap()).contains("secret-token"));
    }

    #[test]
    fn concurrent_reads_never_miss_a_stored_token() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
        use std::thread;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set(AccessToken::new("T0")).unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let misses = Arc::new(AtomicUsize::new(0));

        let reader = {
            let store = store.clone();
            let done = Arc::clone(&done);
            let misses = Arc::clone(&misses);
            thread::spawn(move || {
                let mut reads = 0usize;
                while !done.load(Ordering::SeqCst) {
                    if store.get().is_none() {
                        misses.fetch_add(1, Ordering::SeqCst);
                    }
                    reads += 1;
                }
                reads
            })
        };

        for i in 1..=300 {
            store.set(AccessToken::new(format!("T{i}"))).unwrap();
        }
        done.store(true, Ordering::SeqCst);

        let reads = reader.join().unwrap();
        assert!(reads > 0);
        assert_eq!(misses.load(Ordering::SeqCst), 0);
        assert_eq!(store.get().unwrap().access_token.as_str(), "T300");
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set(AccessToken::new("T1")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
