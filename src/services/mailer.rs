use async_trait::async_trait;

/// Outbound mail capability. The only consumer today is the password-reset
/// flow; delivery failures surface as errors so the caller can roll the
/// stored token back.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, email: &str, reset_token: &str) -> anyhow::Result<()>;
}

/// Logs the reset link instead of delivering it. Stands in for a real
/// transport in development and tests.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, email: &str, reset_token: &str) -> anyhow::Result<()> {
        tracing::info!(email, "password reset requested, token: {}", reset_token);
        Ok(())
    }
}
