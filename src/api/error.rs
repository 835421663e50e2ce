//! API error type shared by every handler.
//!
//! Handlers return `Result<_, ApiError>` and the `IntoResponse` impl turns
//! each variant into its status code plus a `{"message": ...}` body, so the
//! wire shape is uniform across the surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, expired, or otherwise unverifiable credentials.
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated, but not allowed to perform this operation.
    #[error("forbidden")]
    Forbidden,

    /// OTP that does not match, has expired, or was already consumed.
    #[error("invalid or expired code")]
    InvalidOrExpiredCode,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Lost a first-committer-wins race (request already resolved, user
    /// already has an active live request, ...).
    #[error("{0}")]
    Conflict(String),

    /// Upstream delivery (OTP mail) failed.
    #[error("failed to deliver one-time code")]
    Delivery,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.into())
    }
}

/// Error body returned for every non-2xx response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidOrExpiredCode | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Delivery => StatusCode::BAD_GATEWAY,
            Self::Internal(err) => {
                // Log the cause here; the client only sees a generic message.
                error!("internal error: {err:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
