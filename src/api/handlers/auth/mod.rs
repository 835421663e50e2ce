//! Passwordless login flow and auth plumbing.
//!
//! Users log in with an emailed one-time code or a federated (Google)
//! profile; admins log in with a password. All three paths end in the same
//! place: a signed bearer token whose claims say which collection the
//! subject lives in.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{Duration, Utc};
use secrecy::SecretString;
use tracing::{debug, info};

use crate::api::email::OtpMailer;
use crate::api::error::ApiError;
use crate::storage::Store;

pub mod admin;
pub mod oauth;
pub mod otp;
pub mod password;
pub mod principal;
pub mod token;
pub mod types;


pub use principal::{require_admin, require_auth, require_user, Principal};

use types::{AuthResponse, SendOtpRequest, SendOtpResponse, VerifyOtpRequest};

/// Auth configuration assembled by the CLI layer.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    token_secret: SecretString,
    token_ttl_seconds: u64,
    otp_ttl_seconds: u64,
}

impl AuthConfig {
    /// The signing secret has no default; the CLI refuses to start without
    /// one.
    #[must_use]
    pub fn new(token_secret: SecretString) -> Self {
        Self {
            token_secret,
            token_ttl_seconds: otp::DEFAULT_TOKEN_TTL_SECONDS,
            otp_ttl_seconds: otp::DEFAULT_OTP_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: u64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_otp_ttl_seconds(mut self, seconds: u64) -> Self {
        self.otp_ttl_seconds = seconds;
        self
    }
}

/// Shared auth state injected as an `Extension`.
pub struct AuthState {
    config: AuthConfig,
    mailer: Arc<dyn OtpMailer>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, mailer: Arc<dyn OtpMailer>) -> Self {
        Self { config, mailer }
    }

    #[must_use]
    pub fn token_secret(&self) -> &SecretString {
        &self.config.token_secret
    }

    #[must_use]
    pub const fn token_ttl_seconds(&self) -> u64 {
        self.config.token_ttl_seconds
    }

    #[must_use]
    pub const fn otp_ttl_seconds(&self) -> u64 {
        self.config.otp_ttl_seconds
    }
}

/// Issue a user bearer token with the configured TTL.
fn issue_user_token(
    user: &crate::storage::models::User,
    state: &AuthState,
) -> Result<String, ApiError> {
    let claims = token::Claims::for_user(user, state.token_ttl_seconds());
    token::issue(&claims, state.token_secret())
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("token issuance: {err}")))
}

#[utoipa::path(
    post,
    path = "/api/auth/send-otp",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "One-time code generated and sent", body = SendOtpResponse),
        (status = 400, description = "Invalid email", body = crate::api::error::ErrorBody),
        (status = 502, description = "Code could not be delivered", body = crate::api::error::ErrorBody)
    ),
    tag = "auth"
)]
pub async fn send_otp(
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
    Json(request): Json<SendOtpRequest>,
) -> Result<(StatusCode, Json<SendOtpResponse>), ApiError> {
    let email = request.email.trim().to_lowercase();
    if !super::valid_email(&email) {
        return Err(ApiError::BadRequest("invalid email".to_string()));
    }

    // A fresh request supersedes any code still pending for this email.
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(|| default_name(&email), str::to_string);
    let code = otp::generate_code();
    let ttl = i64::try_from(state.otp_ttl_seconds()).unwrap_or(i64::MAX);
    let expires_at = Utc::now() + Duration::seconds(ttl);

    let user = store.upsert_otp(&email, &name, &code, expires_at).await?;
    debug!(user_id = %user.id, "one-time code stored");

    // The stored code stays valid even when delivery fails, so a retry with
    // a working mailer can still consume it before the TTL runs out.
    state.mailer.send_otp(&email, &code).await.map_err(|err| {
        info!(email = %email, "otp delivery failed: {err}");
        ApiError::Delivery
    })?;

    Ok((
        StatusCode::OK,
        Json(SendOtpResponse {
            message: "OTP sent".to_string(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Code accepted, bearer token issued", body = AuthResponse),
        (status = 400, description = "Invalid or expired code", body = crate::api::error::ErrorBody)
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let email = request.email.trim().to_lowercase();
    let code = request.otp.trim();

    // Single atomic consume: wrong code, expired code, and unknown email all
    // look identical to the caller.
    let user = store
        .take_otp(&email, code, Utc::now())
        .await?
        .ok_or(ApiError::InvalidOrExpiredCode)?;

    let token = issue_user_token(&user, &state)?;
    info!(user_id = %user.id, "user logged in via otp");

    Ok((StatusCode::OK, Json(AuthResponse { token, user })))
}

/// Fallback display name for accounts created from a bare email.
fn default_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
