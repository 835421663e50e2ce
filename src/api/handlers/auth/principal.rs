//! Authenticated principal resolution and the admin gate.
//!
//! Flow overview: read the `Authorization: Bearer` header, verify the JWT,
//! then resolve the subject against the collection the `admin` claim points
//! at. A token whose account has since disappeared is treated exactly like a
//! bad token. Blocked users still resolve; blocking gates the product
//! (streams, withdrawals), not authentication.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use tracing::debug;

use super::token;
use super::AuthState;
use crate::api::error::ApiError;
use crate::storage::models::{Admin, User};
use crate::storage::Store;

/// Authenticated caller, resolved to a live account document.
#[derive(Clone, Debug)]
pub enum Principal {
    User(User),
    Admin(Admin),
}

/// Resolve the bearer token into a principal, or 401.
///
/// Every failure mode (missing header, bad signature, expired token,
/// deleted account) collapses into `Unauthenticated` so callers cannot
/// probe which accounts exist.
pub async fn require_auth(
    headers: &HeaderMap,
    store: &dyn Store,
    state: &AuthState,
) -> Result<Principal, ApiError> {
    let token = extract_bearer_token(headers).ok_or(ApiError::Unauthenticated)?;

    let claims = token::verify(&token, state.token_secret()).map_err(|err| {
        debug!("token rejected: {err}");
        ApiError::Unauthenticated
    })?;
    let subject = claims.subject().map_err(|err| {
        debug!("token subject rejected: {err}");
        ApiError::Unauthenticated
    })?;

    if claims.admin {
        let admin = store
            .find_admin(subject)
            .await?
            .ok_or(ApiError::Unauthenticated)?;
        Ok(Principal::Admin(admin))
    } else {
        let user = store
            .find_user(subject)
            .await?
            .ok_or(ApiError::Unauthenticated)?;
        Ok(Principal::User(user))
    }
}

/// User gate for the self-service routes: admin tokens are valid but do not
/// map to a user document, so they get 403.
pub async fn require_user(
    headers: &HeaderMap,
    store: &dyn Store,
    state: &AuthState,
) -> Result<User, ApiError> {
    match require_auth(headers, store, state).await? {
        Principal::User(user) => Ok(user),
        Principal::Admin(_) => Err(ApiError::Forbidden),
    }
}

/// Admin gate for moderation and analytics routes: a valid user token is
/// authenticated but not authorized, so it gets 403, not 401.
pub async fn require_admin(
    headers: &HeaderMap,
    store: &dyn Store,
    state: &AuthState,
) -> Result<Admin, ApiError> {
    match require_auth(headers, store, state).await? {
        Principal::Admin(admin) => Ok(admin),
        Principal::User(_) => Err(ApiError::Forbidden),
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
