//! Connection and local state arguments shared by every subcommand.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use url::Url;

pub const ARG_API_URL: &str = "api-url";
pub const ARG_TIMEOUT: &str = "timeout";
pub const ARG_STATE_DIR: &str = "state-dir";

pub const DEFAULT_API_URL: &str = "https://usermanagemet-server.vercel.app";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Base URL of the account-management service")
                .env("ROSTERCTL_API_URL")
                .default_value(DEFAULT_API_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Request timeout in seconds")
                .env("ROSTERCTL_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..))
                .global(true),
        )
        .arg(
            Arg::new(ARG_STATE_DIR)
                .long(ARG_STATE_DIR)
                .help("Directory holding the session token (default: <config dir>/rosterctl)")
                .env("ROSTERCTL_STATE_DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
}

#[derive(Debug)]
pub struct Options {
    pub url: Url,
    pub timeout_seconds: u64,
    pub state_dir: PathBuf,
}

impl Options {
    /// # Errors
    /// Returns an error if the API URL is not an absolute http(s) URL or no
    /// state directory can be determined.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let raw = matches
            .get_one::<String>(ARG_API_URL)
            .map_or(DEFAULT_API_URL, String::as_str);
        let url = Url::parse(raw.trim()).with_context(|| format!("invalid --{ARG_API_URL}: {raw}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("--{ARG_API_URL} must use http or https: {url}");
        }

        let timeout_seconds = matches.get_one::<u64>(ARG_TIMEOUT).copied().unwrap_or(10);

        let state_dir = match matches.get_one::<PathBuf>(ARG_STATE_DIR) {
            Some(dir) => dir.clone(),
            None => dirs::config_dir()
                .context("cannot determine config directory, pass --state-dir")?
                .join(env!("CARGO_PKG_NAME")),
        };

        Ok(Self {
            url,
            timeout_seconds,
            state_dir,
        })
    }
}
