//! In-memory store for tests and local development.
//!
//! All documents live behind one `RwLock`, so every trait method is a single
//! critical section and the atomicity contract (OTP consume, toggles,
//! pending-request resolution) holds trivially.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    Admin, AuditLogEntry, LiveComment, LiveStatus, LiveStream, NewAuditEntry, RequestStatus, User,
    UserStatus, WalletRequest,
};
use super::{NewOauthUser, Store, StoreResult};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    admins: HashMap<Uuid, Admin>,
    lives: HashMap<Uuid, LiveStream>,
    wallet_requests: HashMap<Uuid, WalletRequest>,
    audit_log: Vec<AuditLogEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn blank_user(email: &str, name: &str, login_method: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            photo: None,
            login_methods: vec![login_method.to_string()],
            wallets: Vec::new(),
            reward_points: 0,
            status: UserStatus::Active,
            otp_code: None,
            otp_expires_at: None,
            created_at: Utc::now(),
        }
    }

    /// Test helper: seed a user document directly.
    pub async fn insert_user(&self, user: User) {
        self.inner.write().await.users.insert(user.id, user);
    }

    /// Test helper: read the raw user document, OTP fields included.
    pub async fn user_by_email(&self, email: &str) -> Option<User> {
        let inner = self.inner.read().await;
        inner.users.values().find(|u| u.email == email).cloned()
    }

    /// Test helper: seed a live stream in an arbitrary state.
    pub async fn insert_live(&self, live: LiveStream) {
        self.inner.write().await.lives.insert(live.id, live);
    }

    /// Test helper: seed a wallet request in an arbitrary state.
    pub async fn insert_wallet_request_raw(&self, request: WalletRequest) {
        self.inner
            .write()
            .await
            .wallet_requests
            .insert(request.id, request);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.user_by_email(email).await)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }

    async fn count_users(&self) -> StoreResult<u64> {
        Ok(self.inner.read().await.users.len() as u64)
    }

    async fn upsert_otp(
        &self,
        email: &str,
        name: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        let existing = inner.users.values_mut().find(|u| u.email == email);
        let user = match existing {
            Some(user) => {
                user.otp_code = Some(code.to_string());
                user.otp_expires_at = Some(expires_at);
                user.clone()
            }
            None => {
                let mut user = Self::blank_user(email, name, "otp");
                user.otp_code = Some(code.to_string());
                user.otp_expires_at = Some(expires_at);
                inner.users.insert(user.id, user.clone());
                user
            }
        };
        Ok(user)
    }

    async fn take_otp(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<User>> {
        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.values_mut().find(|u| u.email == email) else {
            return Ok(None);
        };
        let matches = user.otp_code.as_deref() == Some(code)
            && user.otp_expires_at.is_some_and(|expiry| expiry > now);
        if !matches {
            return Ok(None);
        }
        user.otp_code = None;
        user.otp_expires_at = None;
        Ok(Some(user.clone()))
    }

    async fn upsert_oauth_user(&self, profile: &NewOauthUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.values().find(|u| u.email == profile.email) {
            return Ok(user.clone());
        }
        let mut user = Self::blank_user(&profile.email, &profile.name, "google");
        user.photo = profile.photo.clone();
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user_profile(
        &self,
        id: Uuid,
        name: Option<String>,
        photo: Option<String>,
    ) -> StoreResult<Option<User>> {
        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(photo) = photo {
            user.photo = Some(photo);
        }
        Ok(Some(user.clone()))
    }

    async fn toggle_user_status(&self, id: Uuid) -> StoreResult<Option<User>> {
        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        user.status = user.status.toggled();
        Ok(Some(user.clone()))
    }

    async fn find_admin(&self, id: Uuid) -> StoreResult<Option<Admin>> {
        Ok(self.inner.read().await.admins.get(&id).cloned())
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        let inner = self.inner.read().await;
        Ok(inner.admins.values().find(|a| a.email == email).cloned())
    }

    async fn insert_admin(&self, admin: Admin) -> StoreResult<()> {
        self.inner.write().await.admins.insert(admin.id, admin);
        Ok(())
    }

    async fn find_live(&self, id: Uuid) -> StoreResult<Option<LiveStream>> {
        Ok(self.inner.read().await.lives.get(&id).cloned())
    }

    async fn list_lives_by_status(&self, status: LiveStatus) -> StoreResult<Vec<LiveStream>> {
        let inner = self.inner.read().await;
        let mut lives: Vec<LiveStream> = inner
            .lives
            .values()
            .filter(|live| live.status == status)
            .cloned()
            .collect();
        lives.sort_by_key(|live| live.created_at);
        Ok(lives)
    }

    async fn count_lives_by_status(&self, status: LiveStatus) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.lives.values().filter(|l| l.status == status).count() as u64)
    }

    async fn insert_live_request(&self, user_id: Uuid) -> StoreResult<Option<LiveStream>> {
        let mut inner = self.inner.write().await;
        let already_active = inner.lives.values().any(|live| {
            live.user_id == user_id
                && matches!(
                    live.status,
                    LiveStatus::Pending | LiveStatus::Approved | LiveStatus::Live
                )
        });
        if already_active {
            return Ok(None);
        }
        let live = LiveStream {
            id: Uuid::new_v4(),
            user_id,
            status: LiveStatus::Pending,
            comments: Vec::new(),
            created_at: Utc::now(),
        };
        inner.lives.insert(live.id, live.clone());
        Ok(Some(live))
    }

    async fn resolve_live_request(
        &self,
        id: Uuid,
        status: LiveStatus,
    ) -> StoreResult<Option<LiveStream>> {
        let mut inner = self.inner.write().await;
        let Some(live) = inner.lives.get_mut(&id) else {
            return Ok(None);
        };
        if live.status != LiveStatus::Pending {
            return Ok(None);
        }
        live.status = status;
        Ok(Some(live.clone()))
    }

    async fn add_live_comment(
        &self,
        live_id: Uuid,
        user_id: Uuid,
        text: String,
    ) -> StoreResult<Option<Vec<LiveComment>>> {
        let mut inner = self.inner.write().await;
        let Some(live) = inner.lives.get_mut(&live_id) else {
            return Ok(None);
        };
        if live.status != LiveStatus::Live {
            return Ok(None);
        }
        live.comments.push(LiveComment {
            user_id,
            text,
            created_at: Utc::now(),
        });
        Ok(Some(live.comments.clone()))
    }

    async fn find_wallet_request(&self, id: Uuid) -> StoreResult<Option<WalletRequest>> {
        Ok(self.inner.read().await.wallet_requests.get(&id).cloned())
    }

    async fn insert_wallet_request(
        &self,
        user_id: Uuid,
        wallet_type: String,
        amount: i64,
    ) -> StoreResult<WalletRequest> {
        let request = WalletRequest {
            id: Uuid::new_v4(),
            user_id,
            wallet_type,
            amount,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .wallet_requests
            .insert(request.id, request.clone());
        Ok(request)
    }

    async fn list_wallet_requests_by_status(
        &self,
        status: RequestStatus,
    ) -> StoreResult<Vec<WalletRequest>> {
        let inner = self.inner.read().await;
        let mut requests: Vec<WalletRequest> = inner
            .wallet_requests
            .values()
            .filter(|request| request.status == status)
            .cloned()
            .collect();
        requests.sort_by_key(|request| request.created_at);
        Ok(requests)
    }

    async fn count_wallet_requests_by_status(&self, status: RequestStatus) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .wallet_requests
            .values()
            .filter(|r| r.status == status)
            .count() as u64)
    }

    async fn resolve_wallet_request(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> StoreResult<Option<WalletRequest>> {
        let mut inner = self.inner.write().await;
        let Some(request) = inner.wallet_requests.get_mut(&id) else {
            return Ok(None);
        };
        if request.status != RequestStatus::Pending {
            return Ok(None);
        }
        request.status = status;
        Ok(Some(request.clone()))
    }

    async fn append_audit_entry(&self, entry: NewAuditEntry) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.audit_log.push(AuditLogEntry {
            id: Uuid::new_v4(),
            actor_id: entry.actor_id,
            actor_email: entry.actor_email,
            action: entry.action,
            target: entry.target,
            details: entry.details,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_audit_entries(&self) -> StoreResult<Vec<AuditLogEntry>> {
        let inner = self.inner.read().await;
        let mut entries = inner.audit_log.clone();
        entries.reverse();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn otp_is_single_use() -> StoreResult<()> {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .upsert_otp("alice@example.com", "alice", "123456", now + Duration::minutes(10))
            .await?;

        let first = store.take_otp("alice@example.com", "123456", now).await?;
        assert!(first.is_some());

        let second = store.take_otp("alice@example.com", "123456", now).await?;
        assert!(second.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn expired_otp_is_rejected() -> StoreResult<()> {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .upsert_otp("alice@example.com", "alice", "123456", now - Duration::seconds(1))
            .await?;

        let taken = store.take_otp("alice@example.com", "123456", now).await?;
        assert!(taken.is_none());

        // The stale code stays cleared only on success, so a fresh one can
        // still overwrite it.
        let user = store.user_by_email("alice@example.com").await;
        assert!(user.is_some_and(|u| u.otp_code.is_some()));
        Ok(())
    }

    #[tokio::test]
    async fn new_otp_supersedes_previous_code() -> StoreResult<()> {
        let store = MemoryStore::new();
        let now = Utc::now();
        let expiry = now + Duration::minutes(10);
        store.upsert_otp("a@example.com", "a", "111111", expiry).await?;
        store.upsert_otp("a@example.com", "a", "222222", expiry).await?;

        assert!(store.take_otp("a@example.com", "111111", now).await?.is_none());
        assert!(store.take_otp("a@example.com", "222222", now).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn block_toggle_is_idempotent_per_pair() -> StoreResult<()> {
        let store = MemoryStore::new();
        let user = store
            .upsert_otp("bob@example.com", "bob", "000000", Utc::now())
            .await?;

        let blocked = store.toggle_user_status(user.id).await?.expect("user exists");
        assert_eq!(blocked.status, UserStatus::Blocked);
        let active = store.toggle_user_status(user.id).await?.expect("user exists");
        assert_eq!(active.status, UserStatus::Active);
        Ok(())
    }

    #[tokio::test]
    async fn wallet_request_resolves_exactly_once() -> StoreResult<()> {
        let store = MemoryStore::new();
        let request = store
            .insert_wallet_request(Uuid::new_v4(), "main".to_string(), 500)
            .await?;

        let approved = store
            .resolve_wallet_request(request.id, RequestStatus::Approved)
            .await?;
        assert!(approved.is_some_and(|r| r.status == RequestStatus::Approved));

        let again = store
            .resolve_wallet_request(request.id, RequestStatus::Approved)
            .await?;
        assert!(again.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn one_active_live_request_per_user() -> StoreResult<()> {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();

        let first = store.insert_live_request(user_id).await?;
        assert!(first.is_some());
        let duplicate = store.insert_live_request(user_id).await?;
        assert!(duplicate.is_none());

        // Rejecting the pending request frees the slot.
        let pending = first.expect("created above");
        store
            .resolve_live_request(pending.id, LiveStatus::Rejected)
            .await?;
        let retry = store.insert_live_request(user_id).await?;
        assert!(retry.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn comments_only_on_live_streams() -> StoreResult<()> {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let pending = store
            .insert_live_request(user_id)
            .await?
            .expect("created");

        let refused = store
            .add_live_comment(pending.id, user_id, "hi".to_string())
            .await?;
        assert!(refused.is_none());

        store
            .insert_live(LiveStream {
                status: LiveStatus::Live,
                ..pending.clone()
            })
            .await;
        let comments = store
            .add_live_comment(pending.id, user_id, "hi".to_string())
            .await?;
        assert!(comments.is_some_and(|c| c.len() == 1));
        Ok(())
    }

    #[tokio::test]
    async fn audit_entries_come_back_newest_first() -> StoreResult<()> {
        let store = MemoryStore::new();
        for action in ["block_user", "approve_wallet"] {
            store
                .append_audit_entry(NewAuditEntry {
                    actor_id: Uuid::new_v4(),
                    actor_email: "ops@example.com".to_string(),
                    action: action.to_string(),
                    target: None,
                    details: None,
                })
                .await?;
        }
        let entries = store.list_audit_entries().await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "approve_wallet");
        Ok(())
    }
}
