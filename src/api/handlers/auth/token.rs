//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with a single service-wide secret. The
//! `admin` claim (plus `role` for admins) is the kind discriminator: user
//! and admin accounts live in separate collections and may share an email,
//! so identity resolution keys off the claim, never the email.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::storage::models::{Admin, AdminRole, User};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Claims carried by every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject account ID (UUID string).
    pub sub: String,
    pub email: String,
    /// Kind discriminator: `true` for admin accounts.
    pub admin: bool,
    /// Present on admin tokens only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<AdminRole>,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    fn new(sub: Uuid, email: &str, admin: bool, role: Option<AdminRole>, ttl_seconds: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: sub.to_string(),
            email: email.to_string(),
            admin,
            role,
            iat: now,
            exp: now.saturating_add(i64::try_from(ttl_seconds).unwrap_or(i64::MAX)),
        }
    }

    pub fn for_user(user: &User, ttl_seconds: u64) -> Self {
        Self::new(user.id, &user.email, false, None, ttl_seconds)
    }

    pub fn for_admin(admin: &Admin, ttl_seconds: u64) -> Self {
        Self::new(
            admin.id,
            &admin.email,
            true,
            Some(admin.role),
            ttl_seconds,
        )
    }

    /// Subject as a UUID; tokens we issued always carry one.
    pub fn subject(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|err| TokenError::Invalid(err.to_string()))
    }
}

/// Sign claims into a compact JWT.
pub fn issue(claims: &Claims, secret: &SecretString) -> Result<String, TokenError> {
    let key = EncodingKey::from_secret(secret.expose_secret().as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|err| TokenError::Invalid(err.to_string()))
}

/// Verify signature and expiry and return the claims.
pub fn verify(token: &str, secret: &SecretString) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "iat"]);

    jsonwebtoken::decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(err.to_string()),
        })
}
