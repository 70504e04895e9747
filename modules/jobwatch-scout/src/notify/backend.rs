use async_trait::async_trait;

/// Pluggable delivery backend for job notifications.
#[async_trait]
pub trait NotifyBackend: Send + Sync {
    /// Deliver one formatted message to the configured destination.
    async fn send(&self, message: &str) -> anyhow::Result<()>;

    fn name(&self) -> &str;
}
