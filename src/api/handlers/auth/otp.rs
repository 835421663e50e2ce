//! One-time-code generation.

use rand::Rng;

/// Default OTP lifetime.
pub const DEFAULT_OTP_TTL_SECONDS: u64 = 600;

/// Default bearer token lifetime (seven days).
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Six decimal digits, never starting with zero so the string length is
/// stable for clients that treat it as a number.
#[must_use]
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}
