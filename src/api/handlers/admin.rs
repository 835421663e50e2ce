//! Admin-gated moderation, analytics, and audit routes.
//!
//! Every mutating handler here records an audit entry after the store
//! confirms the change. Resolution endpoints distinguish "no such document"
//! (404) from "lost the race, already resolved" (409) by checking existence
//! before attempting the conditional update.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::auth::{require_admin, AuthState};
use crate::api::audit::{actions, AuditRecorder};
use crate::api::error::ApiError;
use crate::storage::models::{
    AuditLogEntry, LiveStatus, LiveStream, RequestStatus, User, WalletRequest,
};
use crate::storage::Store;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Analytics {
    pub total_users: u64,
    pub live_streams: u64,
    pub pending_live_requests: u64,
    pub pending_wallet_requests: u64,
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 403, description = "Caller is not an admin", body = crate::api::error::ErrorBody)
    ),
    tag = "admin"
)]
pub async fn list_users(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
) -> Result<Json<Vec<User>>, ApiError> {
    require_admin(&headers, store.as_ref(), &state).await?;
    let users = store.list_users().await?;
    Ok(Json(users))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/block",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User with toggled status", body = User),
        (status = 404, description = "No such user", body = crate::api::error::ErrorBody)
    ),
    tag = "admin"
)]
pub async fn toggle_block(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
    audit: Extension<AuditRecorder>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let admin = require_admin(&headers, store.as_ref(), &state).await?;

    let user = store
        .toggle_user_status(id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    audit.record(
        admin.id,
        &admin.email,
        actions::BLOCK_USER,
        Some(id.to_string()),
        Some(json!({ "status": user.status.as_str() })),
    );
    info!(admin_id = %admin.id, user_id = %id, status = user.status.as_str(), "user status toggled");

    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/api/admin/live-requests",
    responses(
        (status = 200, description = "Pending live-stream requests", body = [LiveStream]),
        (status = 403, description = "Caller is not an admin", body = crate::api::error::ErrorBody)
    ),
    tag = "admin"
)]
pub async fn list_live_requests(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
) -> Result<Json<Vec<LiveStream>>, ApiError> {
    require_admin(&headers, store.as_ref(), &state).await?;
    let pending = store.list_lives_by_status(LiveStatus::Pending).await?;
    Ok(Json(pending))
}

#[utoipa::path(
    post,
    path = "/api/admin/live-requests/{id}/approve",
    params(("id" = Uuid, Path, description = "Live request ID")),
    responses(
        (status = 200, description = "Approved request", body = LiveStream),
        (status = 404, description = "No such request", body = crate::api::error::ErrorBody),
        (status = 409, description = "Request already resolved", body = crate::api::error::ErrorBody)
    ),
    tag = "admin"
)]
pub async fn approve_live(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
    audit: Extension<AuditRecorder>,
    Path(id): Path<Uuid>,
) -> Result<Json<LiveStream>, ApiError> {
    resolve_live(
        &headers,
        store.as_ref(),
        &state,
        &audit,
        id,
        LiveStatus::Approved,
        actions::APPROVE_LIVE,
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/admin/live-requests/{id}/reject",
    params(("id" = Uuid, Path, description = "Live request ID")),
    responses(
        (status = 200, description = "Rejected request", body = LiveStream),
        (status = 404, description = "No such request", body = crate::api::error::ErrorBody),
        (status = 409, description = "Request already resolved", body = crate::api::error::ErrorBody)
    ),
    tag = "admin"
)]
pub async fn reject_live(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
    audit: Extension<AuditRecorder>,
    Path(id): Path<Uuid>,
) -> Result<Json<LiveStream>, ApiError> {
    resolve_live(
        &headers,
        store.as_ref(),
        &state,
        &audit,
        id,
        LiveStatus::Rejected,
        actions::REJECT_LIVE,
    )
    .await
}

async fn resolve_live(
    headers: &HeaderMap,
    store: &dyn Store,
    state: &AuthState,
    audit: &AuditRecorder,
    id: Uuid,
    status: LiveStatus,
    action: &str,
) -> Result<Json<LiveStream>, ApiError> {
    let admin = require_admin(headers, store, state).await?;

    store
        .find_live(id)
        .await?
        .ok_or(ApiError::NotFound("live request"))?;
    let resolved = store
        .resolve_live_request(id, status)
        .await?
        .ok_or_else(|| ApiError::Conflict("request already resolved".to_string()))?;

    audit.record(
        admin.id,
        &admin.email,
        action,
        Some(id.to_string()),
        None,
    );
    info!(admin_id = %admin.id, live_id = %id, status = status.as_str(), "live request resolved");

    Ok(Json(resolved))
}

#[utoipa::path(
    get,
    path = "/api/admin/wallet-requests",
    responses(
        (status = 200, description = "Pending withdrawal requests", body = [WalletRequest]),
        (status = 403, description = "Caller is not an admin", body = crate::api::error::ErrorBody)
    ),
    tag = "admin"
)]
pub async fn list_wallet_requests(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
) -> Result<Json<Vec<WalletRequest>>, ApiError> {
    require_admin(&headers, store.as_ref(), &state).await?;
    let pending = store
        .list_wallet_requests_by_status(RequestStatus::Pending)
        .await?;
    Ok(Json(pending))
}

#[utoipa::path(
    post,
    path = "/api/admin/wallet-requests/{id}/approve",
    params(("id" = Uuid, Path, description = "Withdrawal request ID")),
    responses(
        (status = 200, description = "Approved request", body = WalletRequest),
        (status = 404, description = "No such request", body = crate::api::error::ErrorBody),
        (status = 409, description = "Request already resolved", body = crate::api::error::ErrorBody)
    ),
    tag = "admin"
)]
pub async fn approve_wallet(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
    audit: Extension<AuditRecorder>,
    Path(id): Path<Uuid>,
) -> Result<Json<WalletRequest>, ApiError> {
    resolve_wallet(
        &headers,
        store.as_ref(),
        &state,
        &audit,
        id,
        RequestStatus::Approved,
        actions::APPROVE_WALLET,
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/admin/wallet-requests/{id}/reject",
    params(("id" = Uuid, Path, description = "Withdrawal request ID")),
    responses(
        (status = 200, description = "Rejected request", body = WalletRequest),
        (status = 404, description = "No such request", body = crate::api::error::ErrorBody),
        (status = 409, description = "Request already resolved", body = crate::api::error::ErrorBody)
    ),
    tag = "admin"
)]
pub async fn reject_wallet(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
    audit: Extension<AuditRecorder>,
    Path(id): Path<Uuid>,
) -> Result<Json<WalletRequest>, ApiError> {
    resolve_wallet(
        &headers,
        store.as_ref(),
        &state,
        &audit,
        id,
        RequestStatus::Rejected,
        actions::REJECT_WALLET,
    )
    .await
}

async fn resolve_wallet(
    headers: &HeaderMap,
    store: &dyn Store,
    state: &AuthState,
    audit: &AuditRecorder,
    id: Uuid,
    status: RequestStatus,
    action: &str,
) -> Result<Json<WalletRequest>, ApiError> {
    let admin = require_admin(headers, store, state).await?;

    store
        .find_wallet_request(id)
        .await?
        .ok_or(ApiError::NotFound("wallet request"))?;
    let resolved = store
        .resolve_wallet_request(id, status)
        .await?
        .ok_or_else(|| ApiError::Conflict("request already resolved".to_string()))?;

    audit.record(
        admin.id,
        &admin.email,
        action,
        Some(id.to_string()),
        Some(json!({ "amount": resolved.amount, "wallet_type": resolved.wallet_type })),
    );
    info!(admin_id = %admin.id, request_id = %id, status = status.as_str(), "wallet request resolved");

    Ok(Json(resolved))
}

#[utoipa::path(
    get,
    path = "/api/admin/analytics",
    responses(
        (status = 200, description = "Dashboard counters", body = Analytics),
        (status = 403, description = "Caller is not an admin", body = crate::api::error::ErrorBody)
    ),
    tag = "admin"
)]
pub async fn analytics(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
) -> Result<Json<Analytics>, ApiError> {
    require_admin(&headers, store.as_ref(), &state).await?;

    let total_users = store.count_users().await?;
    let live_streams = store.count_lives_by_status(LiveStatus::Live).await?;
    let pending_live_requests = store.count_lives_by_status(LiveStatus::Pending).await?;
    let pending_wallet_requests = store
        .count_wallet_requests_by_status(RequestStatus::Pending)
        .await?;

    Ok(Json(Analytics {
        total_users,
        live_streams,
        pending_live_requests,
        pending_wallet_requests,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/audit-logs",
    responses(
        (status = 200, description = "Audit entries, newest first", body = [AuditLogEntry]),
        (status = 403, description = "Caller is not an admin", body = crate::api::error::ErrorBody)
    ),
    tag = "admin"
)]
pub async fn audit_logs(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
) -> Result<Json<Vec<AuditLogEntry>>, ApiError> {
    require_admin(&headers, store.as_ref(), &state).await?;
    let entries = store.list_audit_entries().await?;
    Ok(Json(entries))
}
