use crate::api;
use crate::api::email::LogOtpMailer;
use crate::api::handlers::auth::AuthConfig;
use crate::cli::globals::GlobalArgs;
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub token_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub otp_ttl_seconds: u64,
    pub cors_origin: Option<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to
/// start.
pub async fn execute(args: Args) -> Result<()> {
    let globals = GlobalArgs::new(args.cors_origin);

    let auth_config = AuthConfig::new(args.token_secret)
        .with_token_ttl_seconds(args.token_ttl_seconds)
        .with_otp_ttl_seconds(args.otp_ttl_seconds);

    // TODO: swap in an SMTP-backed mailer once the provider account exists.
    api::new(
        args.port,
        args.dsn,
        &globals,
        auth_config,
        Arc::new(LogOtpMailer),
    )
    .await
}
