//! Audit trail for privileged admin actions.
//!
//! Handlers record entries through a cloneable [`AuditRecorder`] handle that
//! pushes onto an unbounded channel; a background task drains the channel and
//! appends to the store. Recording never blocks or fails the request that
//! triggered it. The channel keeps entries ordered per process, and the writer
//! task drains what is left before exiting when all handles drop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::storage::models::NewAuditEntry;
use crate::storage::Store;

/// Audit actions recorded by the dashboard.
pub mod actions {
    pub const ADMIN_LOGIN: &str = "admin_login";
    pub const BLOCK_USER: &str = "block_user";
    pub const APPROVE_LIVE: &str = "approve_live";
    pub const REJECT_LIVE: &str = "reject_live";
    pub const APPROVE_WALLET: &str = "approve_wallet";
    pub const REJECT_WALLET: &str = "reject_wallet";
}

#[derive(Clone, Debug)]
pub struct AuditRecorder {
    tx: mpsc::UnboundedSender<NewAuditEntry>,
}

impl AuditRecorder {
    /// Spawn the writer task and return the handle used by handlers.
    pub fn spawn(store: Arc<dyn Store>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<NewAuditEntry>();
        let writer = tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                if let Err(err) = store.append_audit_entry(entry.clone()).await {
                    // The action already happened; a lost entry is logged, not retried.
                    error!(
                        action = %entry.action,
                        actor = %entry.actor_email,
                        "failed to persist audit entry: {err}"
                    );
                }
            }
            info!("audit writer drained, exiting");
        });
        (Self { tx }, writer)
    }

    /// Fire-and-forget; send only fails when the writer is gone, which is
    /// worth a log line but never an error for the caller.
    pub fn record(
        &self,
        actor_id: Uuid,
        actor_email: &str,
        action: &str,
        target: Option<String>,
        details: Option<serde_json::Value>,
    ) {
        let entry = NewAuditEntry {
            actor_id,
            actor_email: actor_email.to_string(),
            action: action.to_string(),
            target,
            details,
        };
        if self.tx.send(entry).is_err() {
            error!(action, "audit writer is gone, entry dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::time::Duration;

    #[tokio::test]
    async fn entries_reach_the_store() {
        let store = Arc::new(MemoryStore::new());
        let (recorder, writer) = AuditRecorder::spawn(store.clone());

        let actor = Uuid::new_v4();
        recorder.record(
            actor,
            "ops@example.com",
            actions::BLOCK_USER,
            Some(Uuid::new_v4().to_string()),
            None,
        );
        recorder.record(actor, "ops@example.com", actions::ADMIN_LOGIN, None, None);

        // Dropping the handle closes the channel; the writer drains and exits.
        drop(recorder);
        writer.await.expect("writer exits cleanly");

        let entries = store.list_audit_entries().await.expect("list");
        assert_eq!(entries.len(), 2);
        // Newest first.
        assert_eq!(entries[0].action, actions::ADMIN_LOGIN);
        assert_eq!(entries[1].action, actions::BLOCK_USER);
    }

    #[tokio::test]
    async fn record_after_writer_abort_is_silent() {
        let store = Arc::new(MemoryStore::new());
        let (recorder, writer) = AuditRecorder::spawn(store);
        writer.abort();
        tokio::time::sleep(Duration::from_millis(10)).await;
        // Must not panic even though the receiver is gone.
        recorder.record(Uuid::new_v4(), "ops@example.com", "admin_login", None, None);
    }
}
