//! Command implementations.

pub mod login;
pub mod logout;
pub mod refresh;
pub mod request;
pub mod whoami;

use anyhow::{Result, anyhow};

use tether_core::Failure;
use tether_http::ApiClient;

use crate::cli::Commands;

pub async fn handle(command: Commands, client: &ApiClient) -> Result<()> {
    match command {
        Commands::Login(args) => login::run(args, client).await,
        Commands::Logout(args) => logout::run(args, client).await,
        Commands::Refresh(args) => refresh::run(args, client).await,
        Commands::Whoami(args) => whoami::run(args, client).await,
        Commands::Request(args) => request::run(args, client).await,
    }
}

/// Render a terminal failure with its status (or kind when there is none).
pub(crate) fn failed(failure: &Failure) -> anyhow::Error {
    match failure.status {
        Some(status) => anyhow!("{} (status {})", failure.message, status),
        None => anyhow!("{} ({})", failure.message, failure.kind),
    }
}
