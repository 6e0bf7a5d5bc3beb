//! Login command implementation.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use tether_http::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: LoginArgs, client: &ApiClient) -> Result<()> {
    eprintln!("{}", "Logging in...".dimmed());

    let credential = match client.login(&args.email, &args.password).await {
        Ok(credential) => credential,
        Err(e) => match e.failure() {
            Some(failure) => bail!("Failed to login: {}", super::failed(failure)),
            None => return Err(anyhow::Error::new(e).context("Failed to login")),
        },
    };

    output::success("Logged in successfully");
    println!();
    output::field("API", &client.config().api.to_string());
    output::field("Session", &credential.issued_for.to_string());

    Ok(())
}
