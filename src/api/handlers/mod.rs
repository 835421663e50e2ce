//! Route handlers for the dashboard API.

pub mod admin;
pub mod auth;
pub mod health;
pub mod live;
pub mod root;
pub mod users;

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));

/// Lightweight email sanity check used by auth handlers before persisting
/// data.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}
