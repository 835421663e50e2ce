//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::auth;
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let token_secret = matches
        .get_one::<String>(auth::ARG_TOKEN_SECRET)
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --token-secret")?;
    let token_ttl_seconds = matches
        .get_one::<u64>(auth::ARG_TOKEN_TTL_SECONDS)
        .copied()
        .unwrap_or(crate::api::handlers::auth::otp::DEFAULT_TOKEN_TTL_SECONDS);
    let otp_ttl_seconds = matches
        .get_one::<u64>(auth::ARG_OTP_TTL_SECONDS)
        .copied()
        .unwrap_or(crate::api::handlers::auth::otp::DEFAULT_OTP_TTL_SECONDS);
    let cors_origin = matches.get_one::<String>(auth::ARG_CORS_ORIGIN).cloned();

    Ok(Action::Server(Args {
        port,
        dsn,
        token_secret,
        token_ttl_seconds,
        otp_ttl_seconds,
        cors_origin,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn handler_builds_server_action() {
        let matches = commands::new().get_matches_from(vec![
            "palco",
            "--dsn",
            "postgres://localhost:5432/palco",
            "--token-secret",
            "sekret",
            "--otp-ttl-seconds",
            "120",
        ]);

        let Action::Server(args) = handler(&matches).expect("action");
        assert_eq!(args.port, 8080);
        assert_eq!(args.dsn, "postgres://localhost:5432/palco");
        assert_eq!(args.token_secret.expose_secret(), "sekret");
        assert_eq!(args.token_ttl_seconds, 604_800);
        assert_eq!(args.otp_ttl_seconds, 120);
        assert!(args.cors_origin.is_none());
    }
}
