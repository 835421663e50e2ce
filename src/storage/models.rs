//! Domain records persisted by the document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Whether a user may use the product or has been blocked by an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Blocked,
}

impl UserStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
        }
    }

    /// Idempotent toggle: blocking a blocked user unblocks them.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Blocked,
            Self::Blocked => Self::Active,
        }
    }
}

/// A named balance bucket on a user ("main", "bonus", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Wallet {
    #[serde(rename = "type")]
    pub wallet_type: String,
    /// Balance in minor units, never negative.
    pub balance: i64,
}

/// Ordinary end user. Created lazily on first OTP request or first
/// federated login (get-or-create by email).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub photo: Option<String>,
    /// Login factors this account has used, e.g. `["otp", "google"]`.
    pub login_methods: Vec<String>,
    pub wallets: Vec<Wallet>,
    pub reward_points: i64,
    pub status: UserStatus,
    /// Pending one-time code. Never serialized into responses.
    #[serde(skip_serializing, default)]
    pub otp_code: Option<String>,
    #[serde(skip_serializing, default)]
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Superadmin,
    Moderator,
}

impl AdminRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::Moderator => "moderator",
        }
    }
}

/// Dashboard operator. Provisioned out-of-band; logs in with a password.
///
/// Admin and user emails are unique within their own collection only; an
/// admin may share an email with a user. The token's kind discriminator is
/// what tells them apart.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    /// Argon2id PHC-format hash. Never serialized into responses.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: AdminRole,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LiveStatus {
    Pending,
    Approved,
    Rejected,
    Live,
    Ended,
}

impl LiveStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Live => "live",
            Self::Ended => "ended",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LiveComment {
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A live-stream request and, once approved and started, the stream itself.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LiveStream {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: LiveStatus,
    pub comments: Vec<LiveComment>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// A withdrawal request against one of the user's wallets.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WalletRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub wallet_type: String,
    /// Amount in minor units.
    pub amount: i64,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Append-only record of a privileged admin action.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub actor_email: String,
    pub action: String,
    pub target: Option<String>,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Input for the audit writer; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actor_id: Uuid,
    pub actor_email: String,
    pub action: String,
    pub target: Option<String>,
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_toggle_round_trips() {
        assert_eq!(UserStatus::Active.toggled(), UserStatus::Blocked);
        assert_eq!(UserStatus::Active.toggled().toggled(), UserStatus::Active);
    }

    #[test]
    fn user_serialization_hides_otp_fields() {
        let user = User {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            name: "alice".to_string(),
            photo: None,
            login_methods: vec!["otp".to_string()],
            wallets: Vec::new(),
            reward_points: 0,
            status: UserStatus::Active,
            otp_code: Some("123456".to_string()),
            otp_expires_at: Some(Utc::now()),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).expect("user serializes");
        assert!(value.get("otp_code").is_none());
        assert!(value.get("otp_expires_at").is_none());
        assert_eq!(
            value.get("email").and_then(serde_json::Value::as_str),
            Some("alice@example.com")
        );
    }

    #[test]
    fn admin_serialization_hides_password_hash() {
        let admin = Admin {
            id: Uuid::new_v4(),
            email: "ops@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: AdminRole::Moderator,
            permissions: Vec::new(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&admin).expect("admin serializes");
        assert!(value.get("password_hash").is_none());
        assert_eq!(
            value.get("role").and_then(serde_json::Value::as_str),
            Some("moderator")
        );
    }
}
