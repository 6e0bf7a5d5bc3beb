//! Request command implementation.

use anyhow::{Context, Result};
use clap::Args;

use tether_core::{Method, RequestDescriptor};
use tether_http::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: Method,

    /// Endpoint path, relative to the base URL
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,

    /// Send without the access token and skip refresh on 401
    #[arg(long)]
    pub no_auth: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: RequestArgs, client: &ApiClient) -> Result<()> {
    let mut descriptor = RequestDescriptor::new(args.method, args.path);

    if let Some(body) = &args.body {
        let value: serde_json::Value =
            serde_json::from_str(body).context("Request body is not valid JSON")?;
        descriptor = descriptor.body(value);
    }

    if args.no_auth {
        descriptor = descriptor.without_auth();
    }

    let body = client
        .execute(descriptor)
        .await
        .map_err(|failure| super::failed(&failure))?;

    output::body(&body, args.pretty)
}
