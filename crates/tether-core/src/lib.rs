//! tether-core - Core types for the tether resilient API client.
//!
//! This crate is free of I/O. It holds the request/response data model, the
//! failure taxonomy, the pure classification and normalization steps, and the
//! seams (token storage, connectivity, transport, session listener) that the
//! HTTP pipeline in `tether-http` is assembled from.
//!
//! # Example
//!
//! ```
//! use tether_core::{FailureKind, RawResponse, classify, normalize};
//!
//! let raw = RawResponse::new(503, Some("text/plain"), "Service Unavailable");
//! assert_eq!(classify::classify_status(raw.status), Some(FailureKind::ServerError));
//!
//! let failure = normalize::normalize(&raw).unwrap_err();
//! assert_eq!(failure.status, Some(503));
//! assert_eq!(failure.message, "Service Unavailable");
//! ```

pub mod classify;
pub mod error;
pub mod memory;
pub mod normalize;
pub mod response;
pub mod retry;
pub mod tokens;
pub mod traits;
pub mod types;

pub use error::{Error, InvalidInputError, ProtocolError, StorageError, TransportError};
pub use memory::InMemoryTokenStore;
pub use response::{Envelope, Failure, FailureKind, NormalizedResult, ResponseBody};
pub use retry::RetryPolicy;
pub use tokens::{AccessToken, Credential, SessionId};
pub use traits::{
    ConnectivityFlag, ConnectivityGate, NoopSessionListener, SessionListener, TokenStore,
    Transport,
};
pub use types::{ApiUrl, Method, OutgoingRequest, RawResponse, RequestDescriptor};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
