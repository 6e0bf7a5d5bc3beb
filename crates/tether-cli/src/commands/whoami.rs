//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use tether_http::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(_args: WhoamiArgs, client: &ApiClient) -> Result<()> {
    let credential = client
        .credential()
        .context("No active session. Run 'tether login' first.")?;

    output::field("API", &client.config().api.to_string());
    output::field("Session", &credential.issued_for.to_string());
    output::field("Issued", &credential.issued_at.to_rfc3339());

    Ok(())
}
