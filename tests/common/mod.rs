//! Shared harness for integration tests: the real router over the in-memory
//! store, plus seeding helpers.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use secrecy::SecretString;
use tower::ServiceExt;
use uuid::Uuid;

use palco::api::audit::AuditRecorder;
use palco::api::email::LogOtpMailer;
use palco::api::handlers::auth::{token, AuthConfig, AuthState};
use palco::api::app;
use palco::storage::models::{Admin, AdminRole, User, UserStatus, Wallet};
use palco::storage::{MemoryStore, Store};

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub router: Router,
}

#[must_use]
pub fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AuthState::new(
        AuthConfig::new(SecretString::from(TEST_SECRET)),
        Arc::new(LogOtpMailer),
    ));
    let (audit, _writer) = AuditRecorder::spawn(store.clone());
    let router = app(store.clone(), state, audit);
    TestApp { store, router }
}

pub async fn seed_user(store: &MemoryStore, email: &str) -> User {
    let user = User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: email.split('@').next().unwrap_or(email).to_string(),
        photo: None,
        login_methods: vec!["otp".to_string()],
        wallets: vec![
            Wallet {
                wallet_type: "main".to_string(),
                balance: 10_000,
            },
            Wallet {
                wallet_type: "bonus".to_string(),
                balance: 250,
            },
        ],
        reward_points: 42,
        status: UserStatus::Active,
        otp_code: None,
        otp_expires_at: None,
        created_at: Utc::now(),
    };
    store.insert_user(user.clone()).await;
    user
}

pub async fn seed_admin(store: &MemoryStore, email: &str) -> Admin {
    let admin = Admin {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: String::new(),
        role: AdminRole::Superadmin,
        permissions: Vec::new(),
        created_at: Utc::now(),
    };
    store.insert_admin(admin.clone()).await.expect("seed admin");
    admin
}

#[must_use]
pub fn user_token(user: &User) -> String {
    let claims = token::Claims::for_user(user, 3600);
    token::issue(&claims, &SecretString::from(TEST_SECRET)).expect("token issues")
}

#[must_use]
pub fn admin_token(admin: &Admin) -> String {
    let claims = token::Claims::for_admin(admin, 3600);
    token::issue(&claims, &SecretString::from(TEST_SECRET)).expect("token issues")
}

#[must_use]
pub fn get(uri: &str, bearer: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .body(Body::empty())
        .expect("request builds")
}

#[must_use]
pub fn post(uri: &str, bearer: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .body(Body::empty())
        .expect("request builds")
}

#[must_use]
pub fn post_json(uri: &str, bearer: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

#[must_use]
pub fn patch_json(uri: &str, bearer: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}
