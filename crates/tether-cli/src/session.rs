//! Client assembly and session persistence.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use tether_core::{ApiUrl, RetryPolicy, SessionListener};
use tether_file::{FileCookieJar, FileTokenStore};
use tether_http::{ApiClient, ClientConfig, HttpTransport};

use crate::cli::Cli;
use crate::output;

/// Tells the user to log in again once the session cannot be renewed.
#[derive(Debug)]
struct LoginHint;

impl SessionListener for LoginHint {
    fn on_session_expired(&self) {
        output::warning("Session expired. Run 'tether login' to log in again.");
    }
}

/// Resolve the token file path.
pub fn token_path(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.clone());
    }

    let dirs =
        ProjectDirs::from("", "", "tether").context("Could not determine data directory")?;

    Ok(dirs.data_dir().join("token.json"))
}

/// Cookie jar path kept next to the token file.
pub fn cookie_path(token_path: &Path) -> PathBuf {
    token_path.with_extension("cookies.json")
}

/// A connected client and the cookies it carries between runs.
pub struct Session {
    pub client: ApiClient,
    pub cookies: FileCookieJar,
}

impl Session {
    /// Persist cookies set or cleared during this run.
    pub fn save(&self) -> Result<()> {
        self.cookies
            .save()
            .with_context(|| format!("Failed to save {}", self.cookies.path().display()))
    }
}

/// Build a client from the global arguments.
pub fn connect(cli: &Cli) -> Result<Session> {
    let api = ApiUrl::new(&cli.base_url).context("Invalid base URL")?;
    let retry = RetryPolicy::new(cli.max_retries, Duration::from_millis(cli.retry_delay_ms));
    let token_path = token_path(cli.token_file.as_ref())?;
    let cookies = FileCookieJar::open(cookie_path(&token_path));
    let store = FileTokenStore::new(token_path);

    tracing::debug!(
        api = %api,
        token_file = %store.path().display(),
        cookie_file = %cookies.path().display(),
        "Building client"
    );

    let user_agent = format!("tether-cli/{}", env!("TETHER_VERSION"));
    let transport = HttpTransport::with_cookies(&user_agent, cookies.store())
        .context("Failed to build HTTP transport")?;
    let config = ClientConfig::new(api)
        .with_retry(retry)
        .with_user_agent(user_agent);

    let client = ApiClient::builder(config)
        .transport(Arc::new(transport))
        .token_store(Arc::new(store))
        .session_listener(Arc::new(LoginHint))
        .build()
        .context("Failed to build client")?;

    Ok(Session { client, cookies })
}
