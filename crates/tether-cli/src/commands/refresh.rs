//! Refresh command implementation.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use tether_http::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, client: &ApiClient) -> Result<()> {
    eprintln!("{}", "Refreshing access token...".dimmed());

    if !client.refresh().await {
        bail!("Token refresh failed. Run 'tether login' to start a new session.");
    }

    output::success("Access token refreshed");
    if let Some(credential) = client.credential() {
        output::field("Session", &credential.issued_for.to_string());
    }

    Ok(())
}
