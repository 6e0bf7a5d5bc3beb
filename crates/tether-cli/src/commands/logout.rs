//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use tether_http::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, client: &ApiClient) -> Result<()> {
    if client.credential().is_none() {
        output::success("No active session");
        return Ok(());
    }

    client.logout().await.context("Failed to clear session")?;

    output::success("Logged out");
    Ok(())
}
