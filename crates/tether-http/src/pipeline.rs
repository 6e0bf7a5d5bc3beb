//! The resilient request pipeline.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

use tether_core::classify::{classify_status, classify_transport};
use tether_core::normalize::normalize;
use tether_core::{
    AccessToken, ApiUrl, ConnectivityGate, Failure, FailureKind,
    NormalizedResult, OutgoingRequest, RawResponse, RequestDescriptor, RetryPolicy,
    SessionListener, TokenStore, Transport, TransportError,
};

use crate::refresh::RefreshCoordinator;

/// Turns one [`RequestDescriptor`] into one terminal [`NormalizedResult`].
///
/// Per call:
///
/// 1. If the connectivity gate reports offline, fail with `Offline` without
///    sending anything.
/// 2. Send the request with the stored bearer token (when the call requires
///    auth) and the ambient session artifact.
/// 3. On 401 for an authenticated call, refresh once and re-send once. The
///    re-sent result is terminal. If the refresh fails, the call fails as
///    session-expired; the caller whose refresh failed clears the token
///    store and tells the session listener, once per failed refresh.
/// 4. On a server error or network failure, wait the fixed retry delay and
///    go back to step 1, until the retry budget is spent.
/// 5. Anything else is normalized and returned.
pub struct RequestPipeline {
    api: ApiUrl,
    retry: RetryPolicy,
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    connectivity: Arc<dyn ConnectivityGate>,
    listener: Arc<dyn SessionListener>,
    refresher: RefreshCoordinator,
}

impl RequestPipeline {
    pub fn new(
        api: ApiUrl,
        retry: RetryPolicy,
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        connectivity: Arc<dyn ConnectivityGate>,
        listener: Arc<dyn SessionListener>,
        refresher: RefreshCoordinator,
    ) -> Self {
        Self {
            api,
            retry,
            transport,
            store,
            connectivity,
            listener,
            refresher,
        }
    }

    /// Execute one logical call.
    #[instrument(skip(self, descriptor), fields(method = %descriptor.method(), path = descriptor.path()))]
    pub async fn execute(&self, mut descriptor: RequestDescriptor) -> NormalizedResult {
        loop {
            if !self.connectivity.check() {
                warn!("No connectivity, request not sent");
                return Err(Failure::offline());
            }

            debug!(attempt = descriptor.attempt(), "Sending request");
            let outcome = self.send(&descriptor).await;

            let kind = match &outcome {
                Ok(raw) => classify_status(raw.status),
                Err(e) => Some(classify_transport(e)),
            };

            match kind {
                Some(FailureKind::AuthExpired) if descriptor.requires_auth() => {
                    return self.recover_session(&descriptor).await;
                }
                Some(kind) if kind.is_retryable() && self.retry.allows_retry(descriptor.attempt()) => {
                    warn!(
                        %kind,
                        attempt = descriptor.attempt(),
                        delay_ms = self.retry.retry_delay.as_millis() as u64,
                        "Transient failure, retrying"
                    );
                    sleep(self.retry.retry_delay).await;
                    descriptor.record_retry();
                }
                _ => return conclude(outcome),
            }
        }
    }

    /// Refresh after a 401 and re-send once.
    async fn recover_session(&self, descriptor: &RequestDescriptor) -> NormalizedResult {
        let flight = self.refresher.join().await;
        if !flight.refreshed {
            // Callers that joined someone else's flight leave the cleanup to
            // the caller that started it.
            if flight.started {
                warn!("Session expired, clearing stored credential");
                if let Err(e) = self.store.clear() {
                    error!(error = %e, "Failed to clear token store");
                }
                self.listener.on_session_expired();
            }
            return Err(Failure::session_expired());
        }

        debug!("Re-sending with refreshed token");
        conclude(self.send(descriptor).await)
    }

    async fn send(&self, descriptor: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        let token = if descriptor.requires_auth() {
            self.store.get().map(|c| c.access_token)
        } else {
            None
        };

        let request = OutgoingRequest {
            method: descriptor.method(),
            url: self.api.endpoint(descriptor.path()),
            headers: build_headers(descriptor, token.as_ref()),
            body: descriptor.body_value().map(|v| v.to_string().into_bytes()),
        };

        self.transport.send(request).await
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("api", &self.api)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// Merge the JSON content type, caller headers and the bearer token.
///
/// Caller headers override the default content type; the bearer token is
/// applied last.
fn build_headers(
    descriptor: &RequestDescriptor,
    token: Option<&AccessToken>,
) -> Vec<(String, String)> {
    let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];

    for (name, value) in descriptor.headers() {
        headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        headers.push((name.clone(), value.clone()));
    }

    if let Some(token) = token {
        headers.retain(|(n, _)| !n.eq_ignore_ascii_case("authorization"));
        headers.push(("Authorization".to_string(), token.bearer()));
    }

    headers
}

/// Turn a final transport outcome into the call's result.
fn conclude(outcome: Result<RawResponse, TransportError>) -> NormalizedResult {
    match outcome {
        Ok(raw) => normalize(&raw),
        Err(e) => Err(Failure::from_transport(&e, classify_transport(&e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_content_type_and_bearer() {
        let req = RequestDescriptor::get("/boards");
        let headers = build_headers(&req, Some(&AccessToken::new("T1")));
        assert_eq!(
            headers,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), "Bearer T1".to_string()),
            ]
        );
    }

    #[test]
    fn caller_headers_override_content_type() {
        let req = RequestDescriptor::post("/boards/1/image").header("content-type", "image/png");
        let headers = build_headers(&req, None);
        assert_eq!(
            headers,
            vec![("content-type".to_string(), "image/png".to_string())]
        );
    }

    #[test]
    fn no_token_no_authorization() {
        let req = RequestDescriptor::get("/notices").header("X-Page", "2");
        let headers = build_headers(&req, None);
        assert!(!headers.iter().any(|(n, _)| n == "Authorization"));
        assert!(headers.contains(&("X-Page".to_string(), "2".to_string())));
    }

    #[test]
    fn transport_failures_conclude_with_their_kind() {
        let result = conclude(Err(TransportError::http("Failed to fetch")));
        let failure = result.unwrap_err();
        assert_eq!(failure.kind, FailureKind::Network);
        assert_eq!(failure.status, None);

        let result = conclude(Err(TransportError::http("Unexpected token")));
        assert_eq!(result.unwrap_err().kind, FailureKind::Unknown);
    }
}
