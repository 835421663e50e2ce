//! OTP delivery abstraction.
//!
//! The send-otp handler hands the generated code to an [`OtpMailer`] and
//! reports 502 to the client when delivery fails. The default mailer for
//! local development logs the code instead of sending real email; a real
//! SMTP or API-backed sender implements the same trait.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// One-time-code delivery used by the login flow.
#[async_trait]
pub trait OtpMailer: Send + Sync {
    /// Deliver `code` to `email` or return an error to fail the request.
    async fn send_otp(&self, email: &str, code: &str) -> Result<()>;
}

/// Local dev mailer that logs the code instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogOtpMailer;

#[async_trait]
impl OtpMailer for LogOtpMailer {
    async fn send_otp(&self, email: &str, code: &str) -> Result<()> {
        info!(to_email = %email, code = %code, "otp mail send stub");
        Ok(())
    }
}
