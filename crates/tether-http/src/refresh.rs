//! Access-token refresh with single-flight coordination.

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use tether_core::normalize::normalize;
use tether_core::{
    AccessToken, Method, OutgoingRequest, TokenStore, Transport,
};

type Flight = Shared<BoxFuture<'static, bool>>;

/// Exchanges the ambient refresh artifact for a new access token.
///
/// Concurrent callers share one in-flight exchange: the first caller starts
/// it, later callers await the same outcome. Once it settles, the next
/// caller starts a fresh exchange.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<RefreshInner>,
}

struct RefreshInner {
    url: String,
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    in_flight: Mutex<Option<Flight>>,
}

impl RefreshCoordinator {
    pub fn new(url: String, transport: Arc<dyn Transport>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: Arc::new(RefreshInner {
                url,
                transport,
                store,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Refresh the access token.
    ///
    /// Returns true if a new token was obtained and stored. Never fails
    /// outward; any error is logged and reported as `false`.
    pub async fn refresh(&self) -> bool {
        self.join().await.refreshed
    }

    /// Start or join the in-flight exchange and wait for its outcome.
    pub(crate) async fn join(&self) -> FlightOutcome {
        let (flight, started) = {
            let mut slot = self.inner.in_flight.lock().await;
            match slot.as_ref() {
                Some(flight) => {
                    debug!("Joining in-flight token refresh");
                    (flight.clone(), false)
                }
                None => {
                    let flight = exchange(
                        self.inner.url.clone(),
                        Arc::clone(&self.inner.transport),
                        Arc::clone(&self.inner.store),
                    )
                    .boxed()
                    .shared();
                    *slot = Some(flight.clone());
                    (flight, true)
                }
            }
        };

        let refreshed = flight.clone().await;

        let mut slot = self.inner.in_flight.lock().await;
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&flight)) {
            *slot = None;
        }

        FlightOutcome { refreshed, started }
    }
}

/// What one caller saw of a refresh flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FlightOutcome {
    pub(crate) refreshed: bool,
    /// This caller started the flight rather than joining it.
    pub(crate) started: bool,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("url", &self.inner.url)
            .finish_non_exhaustive()
    }
}

/// The `data` of a token-issuing response: either the bare token or an
/// object carrying it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum IssuedToken {
    Bare(String),
    Wrapped {
        #[serde(rename = "accessToken", alias = "access_token", alias = "token")]
        access_token: String,
    },
}

impl IssuedToken {
    /// Returns the token, or `None` if it is empty.
    pub(crate) fn into_token(self) -> Option<AccessToken> {
        let raw = match self {
            IssuedToken::Bare(token) => token,
            IssuedToken::Wrapped { access_token } => access_token,
        };
        (!raw.is_empty()).then(|| AccessToken::new(raw))
    }
}

#[instrument(skip_all, fields(url = %url))]
async fn exchange(url: String, transport: Arc<dyn Transport>, store: Arc<dyn TokenStore>) -> bool {
    info!("Refreshing access token");

    let request = OutgoingRequest {
        method: Method::Post,
        url,
        headers: Vec::new(),
        body: None,
    };

    let raw = match transport.send(request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Token refresh request failed");
            return false;
        }
    };

    let body = match normalize(&raw) {
        Ok(body) => body,
        Err(failure) => {
            warn!(status = ?failure.status, message = %failure.message, "Token refresh rejected");
            return false;
        }
    };

    let token = match body.into_data::<IssuedToken>() {
        Ok(issued) => issued.into_token(),
        Err(e) => {
            warn!(error = %e, "Token refresh response unusable");
            return false;
        }
    };

    let Some(token) = token else {
        warn!("Token refresh returned an empty token");
        return false;
    };

    if let Err(e) = store.set(token) {
        warn!(error = %e, "Failed to store refreshed token");
        return false;
    }

    debug!("Access token refreshed");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn issued_token_accepts_bare_and_wrapped() {
        let bare: IssuedToken = serde_json::from_value(json!("T2")).unwrap();
        assert_eq!(bare.into_token().unwrap().as_str(), "T2");

        let wrapped: IssuedToken = serde_json::from_value(json!({ "accessToken": "T3" })).unwrap();
        assert_eq!(wrapped.into_token().unwrap().as_str(), "T3");

        let snake: IssuedToken = serde_json::from_value(json!({ "access_token": "T4" })).unwrap();
        assert_eq!(snake.into_token().unwrap().as_str(), "T4");
    }

    #[test]
    fn empty_token_is_rejected() {
        let empty: IssuedToken = serde_json::from_value(json!("")).unwrap();
        assert!(empty.into_token().is_none());
    }
}
