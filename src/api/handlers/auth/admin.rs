//! Admin password login.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Json;
use tracing::{info, warn};

use super::types::{AdminLoginRequest, AdminLoginResponse};
use super::{password, token, AuthState};
use crate::api::audit::{actions, AuditRecorder};
use crate::api::error::ApiError;
use crate::storage::Store;

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Admin bearer token issued", body = AdminLoginResponse),
        (status = 401, description = "Unknown admin or wrong password", body = crate::api::error::ErrorBody)
    ),
    tag = "admin"
)]
pub async fn admin_login(
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
    audit: Extension<AuditRecorder>,
    Json(request): Json<AdminLoginRequest>,
) -> Result<(StatusCode, Json<AdminLoginResponse>), ApiError> {
    let email = request.email.trim().to_lowercase();

    // Unknown email and wrong password share one response; only successful
    // logins are audited.
    let admin = store
        .find_admin_by_email(&email)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    if !password::verify_password(&request.password, &admin.password_hash)? {
        warn!(email = %email, "admin login rejected");
        return Err(ApiError::Unauthenticated);
    }

    let claims = token::Claims::for_admin(&admin, state.token_ttl_seconds());
    let token = token::issue(&claims, state.token_secret())
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("token issuance: {err}")))?;

    audit.record(admin.id, &admin.email, actions::ADMIN_LOGIN, None, None);
    info!(admin_id = %admin.id, role = admin.role.as_str(), "admin logged in");

    Ok((StatusCode::OK, Json(AdminLoginResponse { token, admin })))
}
