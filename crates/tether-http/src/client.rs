//! API client façade.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use tether_core::{
    ConnectivityFlag, ConnectivityGate, Credential, Error, InMemoryTokenStore,
    NoopSessionListener, NormalizedResult, ProtocolError, RequestDescriptor, Result,
    SessionListener, TokenStore, Transport,
};

use crate::config::ClientConfig;
use crate::pipeline::RequestPipeline;
use crate::refresh::{IssuedToken, RefreshCoordinator};
use crate::transport::HttpTransport;

/// An authenticated, resilient client for one API.
///
/// Clients are cheap to clone (they use internal `Arc`) and safe to share
/// across tasks. Concurrent calls are independent of each other, except that
/// concurrent token refreshes are coalesced into one.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    pipeline: RequestPipeline,
    refresher: RefreshCoordinator,
    store: Arc<dyn TokenStore>,
    transport: Arc<dyn Transport>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Create a client with an in-memory token store and the reqwest
    /// transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Start building a client with custom collaborators.
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            transport: None,
            store: None,
            connectivity: None,
            listener: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Execute one logical call through the pipeline.
    pub async fn execute(&self, descriptor: RequestDescriptor) -> NormalizedResult {
        self.inner.pipeline.execute(descriptor).await
    }

    /// Execute a call and unwrap the `{ success, data }` envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Request`] for terminal failures and
    /// [`Error::Protocol`] if the envelope is unusable.
    pub async fn call<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T> {
        let body = self.execute(descriptor).await?;
        body.into_data()
    }

    /// Authenticate and start a new session.
    ///
    /// The access token from the response is stored; the refresh artifact is
    /// kept by the transport.
    #[instrument(skip(self, password), fields(api = %self.inner.config.api))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Credential> {
        info!("Logging in");

        let descriptor = RequestDescriptor::post(self.inner.config.login_path.as_str())
            .without_auth()
            .json(&LoginRequest { email, password })?;

        let issued: IssuedToken = self.call(descriptor).await?;
        let token = issued
            .into_token()
            .ok_or_else(|| ProtocolError::new(None, "login response carried no access token"))?;

        self.inner.store.clear()?;
        self.inner.store.set(token)?;

        let credential = self.inner.store.get().ok_or_else(|| {
            Error::from(ProtocolError::new(None, "token store did not keep the credential"))
        })?;

        debug!(session = %credential.issued_for, "Session started");
        Ok(credential)
    }

    /// End the session.
    ///
    /// The logout call is best-effort and never triggers a refresh; the
    /// stored credential and the transport's session cookie are cleared
    /// whatever the server answers.
    #[instrument(skip(self), fields(api = %self.inner.config.api))]
    pub async fn logout(&self) -> Result<()> {
        info!("Logging out");

        if let Some(credential) = self.inner.store.get() {
            let descriptor = RequestDescriptor::post(self.inner.config.logout_path.as_str())
                .without_auth()
                .header("Authorization", credential.access_token.bearer());

            if let Err(failure) = self.execute(descriptor).await {
                warn!(status = ?failure.status, message = %failure.message, "Logout call failed");
            }
        }

        self.inner.transport.clear_session();
        self.inner.store.clear()
    }

    /// Refresh the access token outside of a failing call.
    pub async fn refresh(&self) -> bool {
        self.inner.refresher.refresh().await
    }

    /// Returns the stored credential, if any.
    pub fn credential(&self) -> Option<Credential> {
        self.inner.store.get()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.inner.config)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    store: Option<Arc<dyn TokenStore>>,
    connectivity: Option<Arc<dyn ConnectivityGate>>,
    listener: Option<Arc<dyn SessionListener>>,
}

impl ApiClientBuilder {
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn connectivity(mut self, connectivity: Arc<dyn ConnectivityGate>) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    pub fn session_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if no transport was supplied and the HTTP transport
    /// cannot be built.
    pub fn build(self) -> Result<ApiClient> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.config.user_agent)?),
        };
        let store: Arc<dyn TokenStore> = match self.store {
            Some(store) => store,
            None => Arc::new(InMemoryTokenStore::new()),
        };
        let connectivity: Arc<dyn ConnectivityGate> = match self.connectivity {
            Some(connectivity) => connectivity,
            None => Arc::new(ConnectivityFlag::default()),
        };
        let listener: Arc<dyn SessionListener> = match self.listener {
            Some(listener) => listener,
            None => Arc::new(NoopSessionListener),
        };

        let refresher = RefreshCoordinator::new(
            self.config.refresh_url(),
            Arc::clone(&transport),
            Arc::clone(&store),
        );

        let pipeline = RequestPipeline::new(
            self.config.api.clone(),
            self.config.retry,
            Arc::clone(&transport),
            Arc::clone(&store),
            connectivity,
            listener,
            refresher.clone(),
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                config: self.config,
                pipeline,
                refresher,
                store,
                transport,
            }),
        })
    }
}
