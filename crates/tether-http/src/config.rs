//! Client configuration.

use tether_core::{ApiUrl, RetryPolicy};

/// Default path of the token refresh endpoint.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Default path of the login endpoint.
pub const LOGIN_PATH: &str = "/auth/login";

/// Default path of the logout endpoint.
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Configuration for an [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to.
    pub api: ApiUrl,
    /// Retry budget for transient failures.
    pub retry: RetryPolicy,
    pub refresh_path: String,
    pub login_path: String,
    pub logout_path: String,
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a configuration with default paths and retry policy.
    pub fn new(api: ApiUrl) -> Self {
        Self {
            api,
            retry: RetryPolicy::default(),
            refresh_path: REFRESH_PATH.to_string(),
            login_path: LOGIN_PATH.to_string(),
            logout_path: LOGOUT_PATH.to_string(),
            user_agent: concat!("tether/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_logout_path(mut self, path: impl Into<String>) -> Self {
        self.logout_path = path.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Full URL of the refresh endpoint.
    pub fn refresh_url(&self) -> String {
        self.api.endpoint(&self.refresh_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults() {
        let config = ClientConfig::new(ApiUrl::new("http://localhost:8080/api").unwrap());
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.refresh_url(), "http://localhost:8080/api/auth/refresh");
        assert!(config.user_agent.starts_with("tether/"));
    }

    #[test]
    fn overrides() {
        let config = ClientConfig::new(ApiUrl::new("http://localhost").unwrap())
            .with_retry(RetryPolicy::new(1, Duration::from_millis(5)))
            .with_refresh_path("/token/renew");
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.refresh_url(), "http://localhost/token/renew");
    }
}
