//! Federated login callback.
//!
//! The frontend completes the Google flow itself and posts the verified
//! profile here; this handler only does get-or-create by email and token
//! issuance.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Json;
use tracing::info;

use super::types::{AuthResponse, OauthCallbackRequest};
use super::{issue_user_token, AuthState};
use crate::api::error::ApiError;
use crate::storage::{NewOauthUser, Store};

#[utoipa::path(
    post,
    path = "/api/auth/oauth/callback",
    request_body = OauthCallbackRequest,
    responses(
        (status = 200, description = "Profile accepted, bearer token issued", body = AuthResponse),
        (status = 400, description = "Invalid profile", body = crate::api::error::ErrorBody)
    ),
    tag = "auth"
)]
pub async fn oauth_callback(
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
    Json(request): Json<OauthCallbackRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let email = request.email.trim().to_lowercase();
    if !crate::api::handlers::valid_email(&email) {
        return Err(ApiError::BadRequest("invalid email".to_string()));
    }
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }

    let user = store
        .upsert_oauth_user(&NewOauthUser {
            email,
            name: name.to_string(),
            photo: request.photo,
        })
        .await?;

    let token = issue_user_token(&user, &state)?;
    info!(user_id = %user.id, "user logged in via oauth");

    Ok((StatusCode::OK, Json(AuthResponse { token, user })))
}
