//! Self-service routes for logged-in users: profile, wallets, rewards, and
//! withdrawal requests.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::auth::{require_user, AuthState};
use crate::api::error::ApiError;
use crate::storage::models::{User, Wallet, WalletRequest};
use crate::storage::{wallet_by_type, Store};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RewardsResponse {
    pub reward_points: i64,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct WithdrawRequest {
    #[serde(rename = "wallet_type")]
    pub wallet_type: String,
    /// Amount in minor units.
    pub amount: i64,
}

#[utoipa::path(
    get,
    path = "/api/user/me",
    responses(
        (status = 200, description = "Caller's own profile", body = User),
        (status = 401, description = "Missing or invalid token", body = crate::api::error::ErrorBody)
    ),
    tag = "user"
)]
pub async fn me(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
) -> Result<Json<User>, ApiError> {
    let user = require_user(&headers, store.as_ref(), &state).await?;
    Ok(Json(user))
}

#[utoipa::path(
    patch,
    path = "/api/user/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = User),
        (status = 400, description = "Empty patch", body = crate::api::error::ErrorBody),
        (status = 401, description = "Missing or invalid token", body = crate::api::error::ErrorBody)
    ),
    tag = "user"
)]
pub async fn update_me(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let user = require_user(&headers, store.as_ref(), &state).await?;

    let name = request
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    let photo = request
        .photo
        .map(|photo| photo.trim().to_string())
        .filter(|photo| !photo.is_empty());
    if name.is_none() && photo.is_none() {
        return Err(ApiError::BadRequest("nothing to update".to_string()));
    }

    let updated = store
        .update_user_profile(user.id, name, photo)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(updated))
}

#[utoipa::path(
    get,
    path = "/api/user/wallets",
    responses(
        (status = 200, description = "Caller's wallets", body = [Wallet]),
        (status = 401, description = "Missing or invalid token", body = crate::api::error::ErrorBody)
    ),
    tag = "user"
)]
pub async fn wallets(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
) -> Result<Json<Vec<Wallet>>, ApiError> {
    let user = require_user(&headers, store.as_ref(), &state).await?;
    Ok(Json(user.wallets))
}

#[utoipa::path(
    get,
    path = "/api/user/rewards",
    responses(
        (status = 200, description = "Caller's reward balance", body = RewardsResponse),
        (status = 401, description = "Missing or invalid token", body = crate::api::error::ErrorBody)
    ),
    tag = "user"
)]
pub async fn rewards(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
) -> Result<Json<RewardsResponse>, ApiError> {
    let user = require_user(&headers, store.as_ref(), &state).await?;
    Ok(Json(RewardsResponse {
        reward_points: user.reward_points,
    }))
}

#[utoipa::path(
    post,
    path = "/api/user/withdrawals",
    request_body = WithdrawRequest,
    responses(
        (status = 201, description = "Withdrawal request created", body = WalletRequest),
        (status = 400, description = "Bad amount or unknown wallet", body = crate::api::error::ErrorBody),
        (status = 403, description = "Blocked user", body = crate::api::error::ErrorBody)
    ),
    tag = "user"
)]
pub async fn request_withdrawal(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
    Json(request): Json<WithdrawRequest>,
) -> Result<(StatusCode, Json<WalletRequest>), ApiError> {
    let user = require_user(&headers, store.as_ref(), &state).await?;
    if user.status == crate::storage::models::UserStatus::Blocked {
        return Err(ApiError::Forbidden);
    }

    if request.amount <= 0 {
        return Err(ApiError::BadRequest("amount must be positive".to_string()));
    }
    let wallet = wallet_by_type(&user, &request.wallet_type)
        .ok_or_else(|| ApiError::BadRequest("unknown wallet type".to_string()))?;
    if wallet.balance < request.amount {
        return Err(ApiError::BadRequest("insufficient balance".to_string()));
    }

    // Balance is checked, not debited: funds move when an admin approves.
    let created = store
        .insert_wallet_request(user.id, request.wallet_type, request.amount)
        .await?;
    info!(user_id = %user.id, request_id = %created.id, "withdrawal requested");

    Ok((StatusCode::CREATED, Json(created)))
}
