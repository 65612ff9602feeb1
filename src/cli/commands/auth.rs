use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

pub const ARG_BASE_URL: &str = "base-url";
pub const ARG_LANDING_PATH: &str = "landing-path";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BASE_URL)
                .long(ARG_BASE_URL)
                .help("Public base URL, used for redirects and the cookie Secure flag")
                .env("QUIZGATE_BASE_URL")
                .default_value("http://localhost:8080"),
        )
        .arg(
            Arg::new(ARG_LANDING_PATH)
                .long(ARG_LANDING_PATH)
                .help("Where to land after signing in from the site root")
                .env("QUIZGATE_LANDING_PATH")
                .default_value("/quiz"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("QUIZGATE_SESSION_TTL_SECONDS")
                .default_value("43200")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub base_url: String,
    pub landing_path: String,
    pub session_ttl_seconds: i64,
}

impl Options {
    /// Read auth options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is somehow missing or the
    /// landing path is not site-relative.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let base_url = matches
            .get_one::<String>(ARG_BASE_URL)
            .cloned()
            .context("missing required argument: --base-url")?;
        let landing_path = matches
            .get_one::<String>(ARG_LANDING_PATH)
            .cloned()
            .context("missing required argument: --landing-path")?;
        let session_ttl_seconds = matches
            .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .context("missing required argument: --session-ttl-seconds")?;

        anyhow::ensure!(
            landing_path.starts_with('/'),
            "--landing-path must start with '/': {landing_path}"
        );

        Ok(Self {
            base_url,
            landing_path,
            session_ttl_seconds,
        })
    }
}
