//! Postgres-backed document store.
//!
//! Queries are runtime-checked and wrapped in `db.query` spans. Every
//! atomicity requirement (OTP consume, block toggle, pending-request
//! resolution, one-active-live-request) is a single conditional statement
//! with `RETURNING`, so concurrent callers race on the database row and the
//! loser simply sees no document.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Connection, PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::models::{
    Admin, AdminRole, AuditLogEntry, LiveComment, LiveStatus, LiveStream, NewAuditEntry,
    RequestStatus, User, UserStatus, Wallet, WalletRequest,
};
use super::{NewOauthUser, Store, StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const USER_COLUMNS: &str = "id, email, name, photo, login_methods, wallets, reward_points, \
     status, otp_code, otp_expires_at, created_at";

const LIVE_COLUMNS: &str = "id, user_id, status, comments, created_at";

const WALLET_REQUEST_COLUMNS: &str = "id, user_id, wallet_type, amount, status, created_at";

fn user_status_from_str(value: &str) -> StoreResult<UserStatus> {
    match value {
        "active" => Ok(UserStatus::Active),
        "blocked" => Ok(UserStatus::Blocked),
        other => Err(StoreError::Corrupt(format!("unknown user status {other}"))),
    }
}

fn admin_role_from_str(value: &str) -> StoreResult<AdminRole> {
    match value {
        "superadmin" => Ok(AdminRole::Superadmin),
        "moderator" => Ok(AdminRole::Moderator),
        other => Err(StoreError::Corrupt(format!("unknown admin role {other}"))),
    }
}

fn live_status_from_str(value: &str) -> StoreResult<LiveStatus> {
    match value {
        "pending" => Ok(LiveStatus::Pending),
        "approved" => Ok(LiveStatus::Approved),
        "rejected" => Ok(LiveStatus::Rejected),
        "live" => Ok(LiveStatus::Live),
        "ended" => Ok(LiveStatus::Ended),
        other => Err(StoreError::Corrupt(format!("unknown live status {other}"))),
    }
}

fn request_status_from_str(value: &str) -> StoreResult<RequestStatus> {
    match value {
        "pending" => Ok(RequestStatus::Pending),
        "approved" => Ok(RequestStatus::Approved),
        "rejected" => Ok(RequestStatus::Rejected),
        other => Err(StoreError::Corrupt(format!(
            "unknown request status {other}"
        ))),
    }
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let status: String = row.get("status");
    let wallets: serde_json::Value = row.get("wallets");
    let wallets: Vec<Wallet> = serde_json::from_value(wallets)
        .map_err(|err| StoreError::Corrupt(format!("user wallets: {err}")))?;
    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        photo: row.get("photo"),
        login_methods: row.get("login_methods"),
        wallets,
        reward_points: row.get("reward_points"),
        status: user_status_from_str(&status)?,
        otp_code: row.get("otp_code"),
        otp_expires_at: row.get("otp_expires_at"),
        created_at: row.get("created_at"),
    })
}

fn admin_from_row(row: &PgRow) -> StoreResult<Admin> {
    let role: String = row.get("role");
    Ok(Admin {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: admin_role_from_str(&role)?,
        permissions: row.get("permissions"),
        created_at: row.get("created_at"),
    })
}

fn live_from_row(row: &PgRow) -> StoreResult<LiveStream> {
    let status: String = row.get("status");
    let comments: serde_json::Value = row.get("comments");
    let comments: Vec<LiveComment> = serde_json::from_value(comments)
        .map_err(|err| StoreError::Corrupt(format!("live comments: {err}")))?;
    Ok(LiveStream {
        id: row.get("id"),
        user_id: row.get("user_id"),
        status: live_status_from_str(&status)?,
        comments,
        created_at: row.get("created_at"),
    })
}

fn wallet_request_from_row(row: &PgRow) -> StoreResult<WalletRequest> {
    let status: String = row.get("status");
    Ok(WalletRequest {
        id: row.get("id"),
        user_id: row.get("user_id"),
        wallet_type: row.get("wallet_type"),
        amount: row.get("amount"),
        status: request_status_from_str(&status)?,
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        let span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        async {
            let mut conn = self.pool.acquire().await?;
            conn.ping().await?;
            Ok(())
        }
        .instrument(span)
        .await
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn count_users(&self) -> StoreResult<u64> {
        let query = "SELECT COUNT(*) AS total FROM users";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .fetch_one(&self.pool)
            .instrument(span)
            .await?;
        let total: i64 = row.get("total");
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn upsert_otp(
        &self,
        email: &str,
        name: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<User> {
        // Existing users keep their name and login methods; only the OTP
        // fields are overwritten.
        let query = format!(
            r"
            INSERT INTO users (id, email, name, login_methods, otp_code, otp_expires_at)
            VALUES ($1, $2, $3, ARRAY['otp'], $4, $5)
            ON CONFLICT (email) DO UPDATE
                SET otp_code = EXCLUDED.otp_code,
                    otp_expires_at = EXCLUDED.otp_expires_at
            RETURNING {USER_COLUMNS}
            "
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = %query
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(name)
            .bind(code)
            .bind(expires_at)
            .fetch_one(&self.pool)
            .instrument(span)
            .await?;
        user_from_row(&row)
    }

    async fn take_otp(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<User>> {
        // Compare-and-clear in one statement: two concurrent verifications
        // race on the row and only the first committer gets it back.
        let query = format!(
            r"
            UPDATE users
            SET otp_code = NULL, otp_expires_at = NULL
            WHERE email = $1 AND otp_code = $2 AND otp_expires_at > $3
            RETURNING {USER_COLUMNS}
            "
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = %query
        );
        let row = sqlx::query(&query)
            .bind(email)
            .bind(code)
            .bind(now)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn upsert_oauth_user(&self, profile: &NewOauthUser) -> StoreResult<User> {
        // The no-op DO UPDATE turns the insert into get-or-create: the
        // existing row comes back untouched on conflict.
        let query = format!(
            r"
            INSERT INTO users (id, email, name, photo, login_methods)
            VALUES ($1, $2, $3, $4, ARRAY['google'])
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING {USER_COLUMNS}
            "
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = %query
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&profile.email)
            .bind(&profile.name)
            .bind(&profile.photo)
            .fetch_one(&self.pool)
            .instrument(span)
            .await?;
        user_from_row(&row)
    }

    async fn update_user_profile(
        &self,
        id: Uuid,
        name: Option<String>,
        photo: Option<String>,
    ) -> StoreResult<Option<User>> {
        let query = format!(
            r"
            UPDATE users
            SET name = COALESCE($2, name), photo = COALESCE($3, photo)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = %query
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(name)
            .bind(photo)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn toggle_user_status(&self, id: Uuid) -> StoreResult<Option<User>> {
        let query = format!(
            r"
            UPDATE users
            SET status = CASE WHEN status = 'blocked' THEN 'active' ELSE 'blocked' END
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = %query
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_admin(&self, id: Uuid) -> StoreResult<Option<Admin>> {
        let query = "SELECT id, email, password_hash, role, permissions, created_at \
             FROM admins WHERE id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        row.as_ref().map(admin_from_row).transpose()
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        let query = "SELECT id, email, password_hash, role, permissions, created_at \
             FROM admins WHERE email = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        row.as_ref().map(admin_from_row).transpose()
    }

    async fn insert_admin(&self, admin: Admin) -> StoreResult<()> {
        let query = r"
            INSERT INTO admins (id, email, password_hash, role, permissions, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(admin.id)
            .bind(&admin.email)
            .bind(&admin.password_hash)
            .bind(admin.role.as_str())
            .bind(&admin.permissions)
            .bind(admin.created_at)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }

    async fn find_live(&self, id: Uuid) -> StoreResult<Option<LiveStream>> {
        let query = format!("SELECT {LIVE_COLUMNS} FROM live_streams WHERE id = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        row.as_ref().map(live_from_row).transpose()
    }

    async fn list_lives_by_status(&self, status: LiveStatus) -> StoreResult<Vec<LiveStream>> {
        let query = format!(
            "SELECT {LIVE_COLUMNS} FROM live_streams WHERE status = $1 ORDER BY created_at"
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        let rows = sqlx::query(&query)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;
        rows.iter().map(live_from_row).collect()
    }

    async fn count_lives_by_status(&self, status: LiveStatus) -> StoreResult<u64> {
        let query = "SELECT COUNT(*) AS total FROM live_streams WHERE status = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .instrument(span)
            .await?;
        let total: i64 = row.get("total");
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn insert_live_request(&self, user_id: Uuid) -> StoreResult<Option<LiveStream>> {
        // Conditional insert keeps "one active request per user" atomic
        // without a partial unique index on three states.
        let query = format!(
            r"
            INSERT INTO live_streams (id, user_id, status)
            SELECT $1, $2, 'pending'
            WHERE NOT EXISTS (
                SELECT 1 FROM live_streams
                WHERE user_id = $2 AND status IN ('pending', 'approved', 'live')
            )
            RETURNING {LIVE_COLUMNS}
            "
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = %query
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        row.as_ref().map(live_from_row).transpose()
    }

    async fn resolve_live_request(
        &self,
        id: Uuid,
        status: LiveStatus,
    ) -> StoreResult<Option<LiveStream>> {
        let query = format!(
            r"
            UPDATE live_streams
            SET status = $2
            WHERE id = $1 AND status = 'pending'
            RETURNING {LIVE_COLUMNS}
            "
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = %query
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        row.as_ref().map(live_from_row).transpose()
    }

    async fn add_live_comment(
        &self,
        live_id: Uuid,
        user_id: Uuid,
        text: String,
    ) -> StoreResult<Option<Vec<LiveComment>>> {
        let comment = serde_json::to_value(LiveComment {
            user_id,
            text,
            created_at: Utc::now(),
        })
        .map_err(|err| StoreError::Corrupt(format!("live comment: {err}")))?;
        let query = r"
            UPDATE live_streams
            SET comments = comments || jsonb_build_array($2::jsonb)
            WHERE id = $1 AND status = 'live'
            RETURNING comments
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(live_id)
            .bind(comment)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let comments: serde_json::Value = row.get("comments");
        let comments: Vec<LiveComment> = serde_json::from_value(comments)
            .map_err(|err| StoreError::Corrupt(format!("live comments: {err}")))?;
        Ok(Some(comments))
    }

    async fn find_wallet_request(&self, id: Uuid) -> StoreResult<Option<WalletRequest>> {
        let query = format!("SELECT {WALLET_REQUEST_COLUMNS} FROM wallet_requests WHERE id = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        row.as_ref().map(wallet_request_from_row).transpose()
    }

    async fn insert_wallet_request(
        &self,
        user_id: Uuid,
        wallet_type: String,
        amount: i64,
    ) -> StoreResult<WalletRequest> {
        let query = format!(
            r"
            INSERT INTO wallet_requests (id, user_id, wallet_type, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING {WALLET_REQUEST_COLUMNS}
            "
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = %query
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&wallet_type)
            .bind(amount)
            .fetch_one(&self.pool)
            .instrument(span)
            .await?;
        wallet_request_from_row(&row)
    }

    async fn list_wallet_requests_by_status(
        &self,
        status: RequestStatus,
    ) -> StoreResult<Vec<WalletRequest>> {
        let query = format!(
            "SELECT {WALLET_REQUEST_COLUMNS} FROM wallet_requests \
             WHERE status = $1 ORDER BY created_at"
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        let rows = sqlx::query(&query)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;
        rows.iter().map(wallet_request_from_row).collect()
    }

    async fn count_wallet_requests_by_status(&self, status: RequestStatus) -> StoreResult<u64> {
        let query = "SELECT COUNT(*) AS total FROM wallet_requests WHERE status = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .instrument(span)
            .await?;
        let total: i64 = row.get("total");
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn resolve_wallet_request(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> StoreResult<Option<WalletRequest>> {
        let query = format!(
            r"
            UPDATE wallet_requests
            SET status = $2
            WHERE id = $1 AND status = 'pending'
            RETURNING {WALLET_REQUEST_COLUMNS}
            "
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = %query
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        row.as_ref().map(wallet_request_from_row).transpose()
    }

    async fn append_audit_entry(&self, entry: NewAuditEntry) -> StoreResult<()> {
        let query = r"
            INSERT INTO audit_log (id, actor_id, actor_email, action, target, details)
            VALUES ($1, $2, $3, $4, $5, $6)
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(entry.actor_id)
            .bind(&entry.actor_email)
            .bind(&entry.action)
            .bind(&entry.target)
            .bind(&entry.details)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }

    async fn list_audit_entries(&self) -> StoreResult<Vec<AuditLogEntry>> {
        let query = "SELECT id, actor_id, actor_email, action, target, details, created_at \
             FROM audit_log ORDER BY created_at DESC";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;
        rows.iter()
            .map(|row| {
                Ok(AuditLogEntry {
                    id: row.get("id"),
                    actor_id: row.get("actor_id"),
                    actor_email: row.get("actor_email"),
                    action: row.get("action"),
                    target: row.get("target"),
                    details: row.get("details"),
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }
}
