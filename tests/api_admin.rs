//! Moderation surface: blocking, request resolution, analytics, and the
//! audit trail.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use chrono::Utc;
use common::{admin_token, get, post, seed_admin, seed_user, send, spawn_app, user_token};
use palco::storage::models::{LiveStatus, LiveStream};

#[tokio::test]
async fn admin_lists_all_users() {
    let app = spawn_app();
    seed_user(&app.store, "a@example.com").await;
    seed_user(&app.store, "b@example.com").await;
    let admin = seed_admin(&app.store, "ops@example.com").await;
    let token = admin_token(&admin);

    let (status, body) = send(&app.router, get("/api/admin/users", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().expect("array");
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("otp_code").is_none()));
}

#[tokio::test]
async fn block_is_an_idempotent_toggle() {
    let app = spawn_app();
    let user = seed_user(&app.store, "a@example.com").await;
    let admin = seed_admin(&app.store, "ops@example.com").await;
    let token = admin_token(&admin);
    let uri = format!("/api/admin/users/{}/block", user.id);

    let (status, body) = send(&app.router, post(&uri, &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "blocked");

    let (status, body) = send(&app.router, post(&uri, &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
}

#[tokio::test]
async fn block_unknown_user_is_404() {
    let app = spawn_app();
    let admin = seed_admin(&app.store, "ops@example.com").await;
    let token = admin_token(&admin);

    let uri = format!("/api/admin/users/{}/block", uuid::Uuid::new_v4());
    let (status, _) = send(&app.router, post(&uri, &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn live_request_moderation_flow() {
    let app = spawn_app();
    let user = seed_user(&app.store, "streamer@example.com").await;
    let admin = seed_admin(&app.store, "ops@example.com").await;
    let utoken = user_token(&user);
    let atoken = admin_token(&admin);

    // User files a request; a second one conflicts while the first is open.
    let (status, body) = send(&app.router, post("/api/user/live-requests", &utoken)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    let live_id = body["id"].as_str().expect("id").to_string();

    let (status, _) = send(&app.router, post("/api/user/live-requests", &utoken)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Admin sees it pending and approves it once.
    let (status, body) = send(&app.router, get("/api/admin/live-requests", &atoken)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("array").len(), 1);

    let approve = format!("/api/admin/live-requests/{live_id}/approve");
    let (status, body) = send(&app.router, post(&approve, &atoken)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");

    // Second resolution attempt loses the race deterministically.
    let (status, _) = send(&app.router, post(&approve, &atoken)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let reject = format!("/api/admin/live-requests/{live_id}/reject");
    let (status, _) = send(&app.router, post(&reject, &atoken)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let reject = format!("/api/admin/live-requests/{}/reject", uuid::Uuid::new_v4());
    let (status, _) = send(&app.router, post(&reject, &atoken)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wallet_request_moderation_flow() {
    let app = spawn_app();
    let user = seed_user(&app.store, "saver@example.com").await;
    let admin = seed_admin(&app.store, "ops@example.com").await;
    let utoken = user_token(&user);
    let atoken = admin_token(&admin);

    let (status, body) = send(
        &app.router,
        common::post_json(
            "/api/user/withdrawals",
            &utoken,
            &serde_json::json!({ "wallet_type": "main", "amount": 5000 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let request_id = body["id"].as_str().expect("id").to_string();

    let (status, body) = send(&app.router, get("/api/admin/wallet-requests", &atoken)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("array").len(), 1);

    let approve = format!("/api/admin/wallet-requests/{request_id}/approve");
    let (status, body) = send(&app.router, post(&approve, &atoken)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");

    let (status, _) = send(&app.router, post(&approve, &atoken)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Resolved requests leave the pending queue.
    let (status, body) = send(&app.router, get("/api/admin/wallet-requests", &atoken)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn admin_token_can_browse_live_streams() {
    let app = spawn_app();
    let streamer = seed_user(&app.store, "streamer@example.com").await;
    let admin = seed_admin(&app.store, "ops@example.com").await;
    let atoken = admin_token(&admin);

    let live_id = uuid::Uuid::new_v4();
    app.store
        .insert_live(LiveStream {
            id: live_id,
            user_id: streamer.id,
            status: LiveStatus::Live,
            comments: Vec::new(),
            created_at: Utc::now(),
        })
        .await;

    // The live read endpoints accept any principal kind, admins included.
    let (status, body) = send(&app.router, get("/api/live", &atoken)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("array").len(), 1);

    let uri = format!("/api/live/{live_id}/comments");
    let (status, body) = send(&app.router, get(&uri, &atoken)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn analytics_counts_match_seeded_state() {
    let app = spawn_app();
    let alice = seed_user(&app.store, "a@example.com").await;
    let bob = seed_user(&app.store, "b@example.com").await;
    let admin = seed_admin(&app.store, "ops@example.com").await;
    let atoken = admin_token(&admin);

    let (status, _) = send(
        &app.router,
        post("/api/user/live-requests", &user_token(&alice)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app.router,
        common::post_json(
            "/api/user/withdrawals",
            &user_token(&bob),
            &serde_json::json!({ "wallet_type": "bonus", "amount": 100 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app.router, get("/api/admin/analytics", &atoken)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_users"], 2);
    assert_eq!(body["live_streams"], 0);
    assert_eq!(body["pending_live_requests"], 1);
    assert_eq!(body["pending_wallet_requests"], 1);
}

#[tokio::test]
async fn privileged_actions_land_in_the_audit_log() {
    let app = spawn_app();
    let user = seed_user(&app.store, "a@example.com").await;
    let admin = seed_admin(&app.store, "ops@example.com").await;
    let atoken = admin_token(&admin);

    let block = format!("/api/admin/users/{}/block", user.id);
    let (status, _) = send(&app.router, post(&block, &atoken)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app.router,
        post("/api/user/live-requests", &user_token(&user)),
    )
    .await;
    // Blocked users cannot request streams; unblock and retry.
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app.router, post(&block, &atoken)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(
        &app.router,
        post("/api/user/live-requests", &user_token(&user)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let live_id = body["id"].as_str().expect("id").to_string();

    let approve = format!("/api/admin/live-requests/{live_id}/approve");
    let (status, _) = send(&app.router, post(&approve, &atoken)).await;
    assert_eq!(status, StatusCode::OK);

    // The writer is asynchronous; poll until all three entries landed.
    let mut entries = serde_json::Value::Null;
    for _ in 0..100 {
        let (status, body) = send(&app.router, get("/api/admin/audit-logs", &atoken)).await;
        assert_eq!(status, StatusCode::OK);
        if body.as_array().is_some_and(|list| list.len() >= 3) {
            entries = body;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let entries = entries.as_array().expect("audit entries arrived").clone();
    assert_eq!(entries.len(), 3);
    // Newest first.
    assert_eq!(entries[0]["action"], "approve_live");
    assert_eq!(entries[1]["action"], "block_user");
    assert_eq!(entries[2]["action"], "block_user");
    assert!(entries
        .iter()
        .all(|entry| entry["actor_email"] == "ops@example.com"));
    assert_eq!(entries[0]["target"], live_id);
}
