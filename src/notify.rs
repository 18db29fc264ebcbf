use async_trait::async_trait;

/// Outbound mail collaborator. Sends are fire-and-forget: a delivery failure
/// is logged by the caller and never fails the core operation.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()>;

    async fn send_temporary_password(&self, email: &str, password: &str) -> anyhow::Result<()>;
}

/// Default implementation that only logs. Deployments substitute an SMTP
/// implementation behind the same trait.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        tracing::info!("Verification code for {}: {}", email, code);
        Ok(())
    }

    async fn send_temporary_password(&self, email: &str, _password: &str) -> anyhow::Result<()> {
        tracing::info!("Temporary password issued for {}", email);
        Ok(())
    }
}
