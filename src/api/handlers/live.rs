//! Live-stream routes: requesting a stream, browsing running streams, and
//! commenting on them.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::auth::{require_auth, require_user, AuthState};
use crate::api::error::ApiError;
use crate::storage::models::{LiveComment, LiveStatus, LiveStream, UserStatus};
use crate::storage::Store;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CommentRequest {
    pub text: String,
}

#[utoipa::path(
    post,
    path = "/api/user/live-requests",
    responses(
        (status = 201, description = "Live-stream request created", body = LiveStream),
        (status = 403, description = "Blocked user", body = crate::api::error::ErrorBody),
        (status = 409, description = "Caller already has an active request", body = crate::api::error::ErrorBody)
    ),
    tag = "live"
)]
pub async fn request_live(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
) -> Result<(StatusCode, Json<LiveStream>), ApiError> {
    let user = require_user(&headers, store.as_ref(), &state).await?;
    if user.status == UserStatus::Blocked {
        return Err(ApiError::Forbidden);
    }

    let created = store.insert_live_request(user.id).await?.ok_or_else(|| {
        ApiError::Conflict("a live request is already pending or running".to_string())
    })?;
    info!(user_id = %user.id, live_id = %created.id, "live stream requested");

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/live",
    responses(
        (status = 200, description = "Streams currently live", body = [LiveStream]),
        (status = 401, description = "Missing or invalid token", body = crate::api::error::ErrorBody)
    ),
    tag = "live"
)]
pub async fn list_live(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
) -> Result<Json<Vec<LiveStream>>, ApiError> {
    // Read-only; admins browse streams too, so any principal may call this.
    require_auth(&headers, store.as_ref(), &state).await?;
    let lives = store.list_lives_by_status(LiveStatus::Live).await?;
    Ok(Json(lives))
}

#[utoipa::path(
    get,
    path = "/api/live/{id}/comments",
    params(("id" = Uuid, Path, description = "Live stream ID")),
    responses(
        (status = 200, description = "Comments in posting order", body = [LiveComment]),
        (status = 404, description = "No such stream", body = crate::api::error::ErrorBody)
    ),
    tag = "live"
)]
pub async fn comments(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LiveComment>>, ApiError> {
    // Read-only like `list_live`; posting still requires a user document.
    require_auth(&headers, store.as_ref(), &state).await?;
    let live = store.find_live(id).await?.ok_or(ApiError::NotFound("live stream"))?;
    Ok(Json(live.comments))
}

#[utoipa::path(
    post,
    path = "/api/live/{id}/comments",
    params(("id" = Uuid, Path, description = "Live stream ID")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment appended", body = [LiveComment]),
        (status = 404, description = "No such stream", body = crate::api::error::ErrorBody),
        (status = 409, description = "Stream is not live", body = crate::api::error::ErrorBody)
    ),
    tag = "live"
)]
pub async fn post_comment(
    headers: HeaderMap,
    store: Extension<Arc<dyn Store>>,
    state: Extension<Arc<AuthState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Vec<LiveComment>>), ApiError> {
    let user = require_user(&headers, store.as_ref(), &state).await?;
    if user.status == UserStatus::Blocked {
        return Err(ApiError::Forbidden);
    }

    let text = request.text.trim().to_string();
    if text.is_empty() {
        return Err(ApiError::BadRequest("comment text is required".to_string()));
    }

    // Existence first, then the status-gated append, so a finished stream is
    // a conflict rather than a 404.
    store.find_live(id).await?.ok_or(ApiError::NotFound("live stream"))?;
    let comments = store
        .add_live_comment(id, user.id, text)
        .await?
        .ok_or_else(|| ApiError::Conflict("stream is not live".to_string()))?;

    Ok((StatusCode::CREATED, Json(comments)))
}
