//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{login, logout, refresh, request, whoami};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Resilient API client CLI.
#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(author, version = env!("TETHER_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL
    #[arg(long, env = "TETHER_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Retries after a server or network failure
    #[arg(long, env = "TETHER_MAX_RETRIES", default_value_t = 3, global = true)]
    pub max_retries: u32,

    /// Delay between retries, in milliseconds
    #[arg(long, env = "TETHER_RETRY_DELAY_MS", default_value_t = 1000, global = true)]
    pub retry_delay_ms: u64,

    /// Where the access token is kept (defaults to the user data directory)
    #[arg(long, env = "TETHER_TOKEN_FILE", global = true)]
    pub token_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the access token
    Login(login::LoginArgs),

    /// End the session and forget the access token
    Logout(logout::LogoutArgs),

    /// Exchange the refresh cookie for a new access token
    Refresh(refresh::RefreshArgs),

    /// Display the stored session
    Whoami(whoami::WhoamiArgs),

    /// Send one API request through the pipeline
    Request(request::RequestArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn request_parses_method_and_flags() {
        let cli = Cli::try_parse_from([
            "tether",
            "--base-url",
            "https://api.example.com",
            "request",
            "post",
            "/boards",
            "--body",
            r#"{"title":"x"}"#,
            "--no-auth",
        ])
        .unwrap();

        assert_eq!(cli.base_url, "https://api.example.com");
        let Commands::Request(args) = cli.command else {
            panic!("expected request command");
        };
        assert_eq!(args.method, tether_core::Method::Post);
        assert_eq!(args.path, "/boards");
        assert!(args.no_auth);
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(Cli::try_parse_from(["tether", "request", "TRACE", "/boards"]).is_err());
    }
}
