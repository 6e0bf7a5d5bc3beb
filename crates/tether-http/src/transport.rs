//! reqwest-backed transport.

use std::sync::{Arc, PoisonError};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_cookie_store::{CookieStore, CookieStoreMutex};
use tracing::{debug, instrument, trace};

use tether_core::{Method, OutgoingRequest, RawResponse, Transport, TransportError};

/// HTTP transport over reqwest.
///
/// Every request goes through one cookie store, so the refresh cookie set at
/// login travels with later calls without ever being read here. The store
/// can be supplied by the caller to persist it between processes.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    cookies: Arc<CookieStoreMutex>,
}

impl HttpTransport {
    /// Create a transport with a fresh, empty cookie store.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(user_agent: &str) -> Result<Self, TransportError> {
        Self::with_cookies(user_agent, Arc::new(CookieStoreMutex::new(CookieStore::default())))
    }

    /// Create a transport that keeps its session cookies in `cookies`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn with_cookies(
        user_agent: &str,
        cookies: Arc<CookieStoreMutex>,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .cookie_provider(Arc::clone(&cookies))
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self { client, cookies })
    }

    /// The cookie store shared by every request.
    pub fn cookies(&self) -> &Arc<CookieStoreMutex> {
        &self.cookies
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("cookies", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();

        trace!(status, bytes = body.len(), "HTTP response");

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }

    fn clear_session(&self) {
        self.cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("Session cookies cleared");
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Map a reqwest error onto the transport error family.
fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    let message = error_chain(&err);

    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        if message.contains("dns error") {
            TransportError::Dns {
                host: err
                    .url()
                    .and_then(|u| u.host_str())
                    .unwrap_or_default()
                    .to_string(),
            }
        } else {
            TransportError::Connection { message }
        }
    } else if message.contains("certificate") || message.contains("tls") {
        TransportError::Tls { message }
    } else {
        TransportError::Http { message }
    }
}

/// Render an error and its sources as one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_creation() {
        assert!(HttpTransport::new("tether/test").is_ok());
    }

    #[test]
    fn methods_map_one_to_one() {
        assert_eq!(to_reqwest_method(Method::Patch), reqwest::Method::PATCH);
        assert_eq!(to_reqwest_method(Method::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn clear_session_forgets_cookies() {
        let transport = HttpTransport::new("tether/test").unwrap();
        let url = reqwest::Url::parse("http://api.test/auth/login").unwrap();
        let cookie = reqwest_cookie_store::RawCookie::parse("refresh_token=abc").unwrap();
        transport
            .cookies()
            .lock()
            .unwrap()
            .insert_raw(&cookie, &url)
            .unwrap();
        assert_eq!(transport.cookies().lock().unwrap().iter_any().count(), 1);

        transport.clear_session();
        assert_eq!(transport.cookies().lock().unwrap().iter_any().count(), 0);
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_error() {
        let transport = HttpTransport::new("tether/test").unwrap();
        let request = OutgoingRequest {
            method: Method::Get,
            url: "http://127.0.0.1:1/unreachable".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.send(request).await.unwrap_err();
        assert!(
            matches!(err, TransportError::Connection { .. }),
            "unexpected error: {err:?}"
        );
    }
}
