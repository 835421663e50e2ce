//! Self-service surface: profile, wallets, withdrawals, and live streams.

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{get, patch_json, post_json, seed_user, send, spawn_app, user_token};
use palco::storage::models::{LiveStatus, LiveStream};
use palco::storage::Store;

#[tokio::test]
async fn me_returns_own_profile_without_otp_fields() {
    let app = spawn_app();
    let user = seed_user(&app.store, "a@example.com").await;
    let token = user_token(&user);

    let (status, body) = send(&app.router, get("/api/user/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@example.com");
    assert_eq!(body["reward_points"], 42);
    assert!(body.get("otp_code").is_none());
}

#[tokio::test]
async fn me_requires_a_token() {
    let app = spawn_app();
    let (status, _) = send(
        &app.router,
        axum::http::Request::builder()
            .method("GET")
            .uri("/api/user/me")
            .body(axum::body::Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_patch_updates_only_provided_fields() {
    let app = spawn_app();
    let user = seed_user(&app.store, "a@example.com").await;
    let token = user_token(&user);

    let (status, body) = send(
        &app.router,
        patch_json(
            "/api/user/me",
            &token,
            &serde_json::json!({ "photo": "https://img.example.com/a.png" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "a");
    assert_eq!(body["photo"], "https://img.example.com/a.png");

    let (status, _) = send(
        &app.router,
        patch_json("/api/user/me", &token, &serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wallets_and_rewards_reflect_the_account() {
    let app = spawn_app();
    let user = seed_user(&app.store, "a@example.com").await;
    let token = user_token(&user);

    let (status, body) = send(&app.router, get("/api/user/wallets", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let wallets = body.as_array().expect("array");
    assert_eq!(wallets.len(), 2);
    assert_eq!(wallets[0]["type"], "main");
    assert_eq!(wallets[0]["balance"], 10_000);

    let (status, body) = send(&app.router, get("/api/user/rewards", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reward_points"], 42);
}

#[tokio::test]
async fn withdrawal_validation() {
    let app = spawn_app();
    let user = seed_user(&app.store, "a@example.com").await;
    let token = user_token(&user);

    let cases = [
        (serde_json::json!({ "wallet_type": "main", "amount": 0 }), "zero amount"),
        (serde_json::json!({ "wallet_type": "main", "amount": -5 }), "negative amount"),
        (serde_json::json!({ "wallet_type": "gold", "amount": 10 }), "unknown wallet"),
        (
            serde_json::json!({ "wallet_type": "bonus", "amount": 100_000 }),
            "insufficient balance",
        ),
    ];
    for (payload, label) in cases {
        let (status, _) = send(
            &app.router,
            post_json("/api/user/withdrawals", &token, &payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case: {label}");
    }

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/user/withdrawals",
            &token,
            &serde_json::json!({ "wallet_type": "bonus", "amount": 250 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["wallet_type"], "bonus");
    assert_eq!(body["amount"], 250);
}

#[tokio::test]
async fn live_listing_shows_only_running_streams() {
    let app = spawn_app();
    let viewer = seed_user(&app.store, "viewer@example.com").await;
    let streamer = seed_user(&app.store, "streamer@example.com").await;
    let token = user_token(&viewer);

    app.store
        .insert_live(LiveStream {
            id: uuid::Uuid::new_v4(),
            user_id: streamer.id,
            status: LiveStatus::Live,
            comments: Vec::new(),
            created_at: Utc::now(),
        })
        .await;
    app.store
        .insert_live(LiveStream {
            id: uuid::Uuid::new_v4(),
            user_id: streamer.id,
            status: LiveStatus::Ended,
            comments: Vec::new(),
            created_at: Utc::now(),
        })
        .await;

    let (status, body) = send(&app.router, get("/api/live", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let streams = body.as_array().expect("array");
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0]["status"], "live");
}

#[tokio::test]
async fn comments_append_only_while_live() {
    let app = spawn_app();
    let viewer = seed_user(&app.store, "viewer@example.com").await;
    let streamer = seed_user(&app.store, "streamer@example.com").await;
    let token = user_token(&viewer);

    let live_id = uuid::Uuid::new_v4();
    let ended_id = uuid::Uuid::new_v4();
    app.store
        .insert_live(LiveStream {
            id: live_id,
            user_id: streamer.id,
            status: LiveStatus::Live,
            comments: Vec::new(),
            created_at: Utc::now(),
        })
        .await;
    app.store
        .insert_live(LiveStream {
            id: ended_id,
            user_id: streamer.id,
            status: LiveStatus::Ended,
            comments: Vec::new(),
            created_at: Utc::now(),
        })
        .await;

    let uri = format!("/api/live/{live_id}/comments");
    let (status, body) = send(
        &app.router,
        post_json(&uri, &token, &serde_json::json!({ "text": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let comments = body.as_array().expect("array");
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["text"], "hello");
    assert_eq!(
        comments[0]["user_id"].as_str(),
        Some(viewer.id.to_string().as_str())
    );

    let (status, body) = send(&app.router, get(&uri, &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("array").len(), 1);

    // Ended stream: found, but not commentable.
    let uri = format!("/api/live/{ended_id}/comments");
    let (status, _) = send(
        &app.router,
        post_json(&uri, &token, &serde_json::json!({ "text": "late" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Unknown stream: 404 for both read and write.
    let uri = format!("/api/live/{}/comments", uuid::Uuid::new_v4());
    let (status, _) = send(&app.router, get(&uri, &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app.router,
        post_json(&uri, &token, &serde_json::json!({ "text": "ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blocked_user_cannot_withdraw_but_can_read() {
    let app = spawn_app();
    let user = seed_user(&app.store, "a@example.com").await;
    let token = user_token(&user);

    app.store
        .toggle_user_status(user.id)
        .await
        .expect("toggle")
        .expect("user exists");

    // Authentication still works; the product surface is gated.
    let (status, body) = send(&app.router, get("/api/user/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "blocked");

    let (status, _) = send(
        &app.router,
        post_json(
            "/api/user/withdrawals",
            &token,
            &serde_json::json!({ "wallet_type": "main", "amount": 10 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
