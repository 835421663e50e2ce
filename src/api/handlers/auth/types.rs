//! Request/response bodies for the auth surface.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::models::{Admin, User};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SendOtpRequest {
    pub email: String,
    /// Display name used when the request creates the account; ignored for
    /// existing accounts.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendOtpResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Successful user login: bearer token plus the account it belongs to.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Profile asserted by the frontend after a federated (Google) login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct OauthCallbackRequest {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminLoginResponse {
    pub token: String,
    pub admin: Admin,
}
