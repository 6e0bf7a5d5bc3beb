//! tether-file - Session persistence on the local filesystem.
//!
//! [`FileTokenStore`] keeps the access credential in a small JSON file so a
//! session survives process restarts. [`FileCookieJar`] does the same for the
//! transport's cookies, which carry the refresh artifact.

mod cookies;
mod file;
mod store;

pub use cookies::FileCookieJar;
pub use store::FileTokenStore;
