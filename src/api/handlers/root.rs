use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::json;

// Undocumented on purpose; load balancers and humans poke it.
pub async fn root() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
