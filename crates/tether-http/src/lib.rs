//! tether-http - Resilient HTTP request pipeline.
//!
//! Every API call flows through [`ApiClient::execute`]: a connectivity
//! pre-flight, the request itself, transparent access-token refresh on 401,
//! and fixed-delay retries for transient failures.
//!
//! # Example
//!
//! ```no_run
//! use tether_core::{ApiUrl, RequestDescriptor};
//! use tether_http::{ApiClient, ClientConfig};
//!
//! # async fn example() -> Result<(), tether_core::Error> {
//! let api = ApiUrl::new("https://example.com/api")?;
//! let client = ApiClient::new(ClientConfig::new(api))?;
//! client.login("alice@example.com", "hunter2").await?;
//!
//! let boards: Vec<serde_json::Value> = client.call(RequestDescriptor::get("/boards")).await?;
//! println!("{} boards", boards.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod pipeline;
mod refresh;
mod transport;

pub use client::{ApiClient, ApiClientBuilder};
pub use config::ClientConfig;
pub use pipeline::RequestPipeline;
pub use refresh::RefreshCoordinator;
pub use transport::HttpTransport;
