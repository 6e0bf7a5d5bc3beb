//! File-backed cookie jar.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};

use reqwest_cookie_store::{CookieStore, CookieStoreMutex};
use tracing::{debug, instrument, warn};

use tether_core::Result;
use tether_core::error::StorageError;

use crate::file::{self, WriteLock};

/// Transport cookies persisted as JSON between processes.
///
/// The jar is loaded once by [`open`](Self::open) and handed to the
/// transport through [`store`](Self::store). Nothing is written until
/// [`save`](Self::save). Session cookies are kept too, since the refresh
/// cookie commonly has no expiry of its own.
#[derive(Clone)]
pub struct FileCookieJar {
    path: PathBuf,
    store: Arc<CookieStoreMutex>,
}

impl std::fmt::Debug for FileCookieJar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCookieJar")
            .field("path", &self.path)
            .field("store", &"[REDACTED]")
            .finish()
    }
}

impl FileCookieJar {
    /// Load the jar at `path`. A missing or unreadable file yields an empty
    /// jar.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let store = load(&path).unwrap_or_default();

        Self {
            path,
            store: Arc::new(CookieStoreMutex::new(store)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The shared cookie store to give to the transport.
    pub fn store(&self) -> Arc<CookieStoreMutex> {
        Arc::clone(&self.store)
    }

    /// Write the current cookies. An empty jar removes the file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn save(&self) -> Result<()> {
        let mut content = Vec::new();
        let count = {
            let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
            cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut content)
                .map_err(|e| StorageError::Cookies {
                    reason: e.to_string(),
                })?;
            store.iter_any().count()
        };

        let _lock = WriteLock::acquire(&self.path).map_err(|e| self.io_error(e))?;
        if count == 0 {
            file::remove(&self.path).map_err(|e| self.io_error(e))?;
        } else {
            file::replace(&self.path, &content).map_err(|e| self.io_error(e))?;
        }

        debug!(count, "Saved cookies");
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

fn load(path: &Path) -> Option<CookieStore> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cannot read cookie file");
            return None;
        }
    };

    match cookie_store::serde::json::load(BufReader::new(file)) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring corrupt cookie file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest_cookie_store::RawCookie;
    use tempfile::TempDir;

    fn login_url() -> url::Url {
        url::Url::parse("http://api.test/api/auth/login").unwrap()
    }

    fn refresh_url() -> url::Url {
        url::Url::parse("http://api.test/api/auth/refresh").unwrap()
    }

    fn set_cookie(jar: &FileCookieJar, raw: &str) {
        let cookie = RawCookie::parse(raw).unwrap();
        jar.store()
            .lock()
            .unwrap()
            .insert_raw(&cookie, &login_url())
            .unwrap();
    }

    fn cookie_value(jar: &FileCookieJar, name: &str) -> Option<String> {
        jar.store()
            .lock()
            .unwrap()
            .get_request_values(&refresh_url())
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.to_string())
    }

    #[test]
    fn session_cookie_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");

        let jar = FileCookieJar::open(&path);
        set_cookie(&jar, "refresh_token=abc; Path=/; HttpOnly");
        jar.save().unwrap();

        let reopened = FileCookieJar::open(&path);
        assert_eq!(cookie_value(&reopened, "refresh_token").as_deref(), Some("abc"));
    }

    #[test]
    fn empty_jar_removes_file() {
        let dir = TempDir::new().unwrap();
        let jar = FileCookieJar::open(dir.path().join("cookies.json"));

        set_cookie(&jar, "refresh_token=abc; Path=/");
        jar.save().unwrap();
        assert!(jar.path().exists());

        jar.store().lock().unwrap().clear();
        jar.save().unwrap();
        assert!(!jar.path().exists());
    }

    #[test]
    fn missing_or_corrupt_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");

        let count = |jar: FileCookieJar| jar.store().lock().unwrap().iter_any().count();

        assert_eq!(count(FileCookieJar::open(&path)), 0);

        std::fs::write(&path, "not json at all").unwrap();
        assert_eq!(count(FileCookieJar::open(&path)), 0);
    }
}
