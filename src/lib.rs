//! # Palco (Live-streaming Admin Dashboard API)
//!
//! `palco` is the backend for a live-streaming admin dashboard. It owns user
//! login (emailed one-time codes and a federated profile callback), admin
//! password login, and the moderation surface: blocking users, approving or
//! rejecting live-stream requests and wallet withdrawals, analytics counters,
//! and an append-only audit trail of every privileged action.
//!
//! ## Identity Model
//!
//! Users and admins are separate collections that may share an email. Every
//! bearer token carries a kind discriminator, and identity resolution always
//! follows the token, never the email. Admin routes return `403 Forbidden`
//! for authenticated non-admins and `401 Unauthorized` for everything else.
//!
//! ## Moderation
//!
//! Pending live-stream and withdrawal requests are resolved exactly once:
//! concurrent approvals race on a conditional store update and the loser gets
//! `409 Conflict`. Blocking is an idempotent toggle and never revokes issued
//! tokens; it gates streaming and withdrawals, not authentication.

pub mod api;
pub mod cli;
pub mod storage;

pub use api::{APP_USER_AGENT, GIT_COMMIT_HASH};
