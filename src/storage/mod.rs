//! Persistence interface and its implementations.
//!
//! The dashboard treats the document store as an external collaborator: every
//! handler talks to it through the [`Store`] trait, which exposes
//! find/list/insert plus a handful of single-document atomic updates
//! (OTP consume, status toggle, pending-request resolution). Concurrency
//! control lives entirely inside those atomic operations; handlers never hold
//! cross-request state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use models::{
    Admin, AuditLogEntry, LiveComment, LiveStatus, LiveStream, NewAuditEntry, RequestStatus, User,
    Wallet, WalletRequest,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt document: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields for a user created on first federated login.
#[derive(Debug, Clone)]
pub struct NewOauthUser {
    pub email: String,
    pub name: String,
    pub photo: Option<String>,
}

/// Document-store operations required by the dashboard.
///
/// Each method maps to at most one atomic read-modify-write on a single
/// document, so implementations need no external locking.
#[async_trait]
pub trait Store: Send + Sync {
    /// Liveness probe for `/health`.
    async fn ping(&self) -> StoreResult<()>;

    // users
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn count_users(&self) -> StoreResult<u64>;

    /// Get-or-create the user for `email` and overwrite any pending OTP.
    /// A created user gets `name` and `login_methods = ["otp"]`.
    async fn upsert_otp(
        &self,
        email: &str,
        name: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<User>;

    /// Atomically consume a pending OTP: compare code and expiry, clear both
    /// fields, and return the user. `None` means no user, wrong code, or an
    /// expired/absent code — the caller cannot tell which, on purpose.
    /// First committer wins under concurrent verification.
    async fn take_otp(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<User>>;

    /// Get-or-create by email for the federated login path. A created user
    /// gets `login_methods = ["google"]`; an existing one is returned as-is.
    async fn upsert_oauth_user(&self, profile: &NewOauthUser) -> StoreResult<User>;

    /// Patch name/photo; `None` leaves the field untouched.
    async fn update_user_profile(
        &self,
        id: Uuid,
        name: Option<String>,
        photo: Option<String>,
    ) -> StoreResult<Option<User>>;

    /// Idempotent block toggle: active -> blocked -> active.
    async fn toggle_user_status(&self, id: Uuid) -> StoreResult<Option<User>>;

    // admins
    async fn find_admin(&self, id: Uuid) -> StoreResult<Option<Admin>>;
    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>>;
    async fn insert_admin(&self, admin: Admin) -> StoreResult<()>;

    // live streams
    async fn find_live(&self, id: Uuid) -> StoreResult<Option<LiveStream>>;
    async fn list_lives_by_status(&self, status: LiveStatus) -> StoreResult<Vec<LiveStream>>;
    async fn count_lives_by_status(&self, status: LiveStatus) -> StoreResult<u64>;

    /// Create a pending live-stream request unless the user already has one
    /// that is pending, approved, or live. `None` signals that conflict.
    async fn insert_live_request(&self, user_id: Uuid) -> StoreResult<Option<LiveStream>>;

    /// Move a pending request to `status`. `None` when the document exists
    /// but is no longer pending (the caller maps that to a conflict).
    async fn resolve_live_request(
        &self,
        id: Uuid,
        status: LiveStatus,
    ) -> StoreResult<Option<LiveStream>>;

    /// Append a comment to a stream that is currently live; `None` otherwise.
    async fn add_live_comment(
        &self,
        live_id: Uuid,
        user_id: Uuid,
        text: String,
    ) -> StoreResult<Option<Vec<LiveComment>>>;

    // wallet requests
    async fn find_wallet_request(&self, id: Uuid) -> StoreResult<Option<WalletRequest>>;
    async fn insert_wallet_request(
        &self,
        user_id: Uuid,
        wallet_type: String,
        amount: i64,
    ) -> StoreResult<WalletRequest>;
    async fn list_wallet_requests_by_status(
        &self,
        status: RequestStatus,
    ) -> StoreResult<Vec<WalletRequest>>;
    async fn count_wallet_requests_by_status(&self, status: RequestStatus) -> StoreResult<u64>;

    /// Move a pending withdrawal to `status`; `None` when it exists but was
    /// already resolved (first-committer-wins).
    async fn resolve_wallet_request(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> StoreResult<Option<WalletRequest>>;

    // audit log
    async fn append_audit_entry(&self, entry: NewAuditEntry) -> StoreResult<()>;

    /// Newest first.
    async fn list_audit_entries(&self) -> StoreResult<Vec<AuditLogEntry>>;
}

/// Find a wallet by type on an already-loaded user.
#[must_use]
pub fn wallet_by_type<'a>(user: &'a User, wallet_type: &str) -> Option<&'a Wallet> {
    user.wallets
        .iter()
        .find(|wallet| wallet.wallet_type == wallet_type)
}
