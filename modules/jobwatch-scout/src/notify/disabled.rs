use async_trait::async_trait;
use tracing::warn;

use jobwatch_common::JobWatchError;

use super::backend::NotifyBackend;

/// Used when the bot token or chat id is missing. Every send fails, so jobs
/// stay unseen and are retried once delivery is configured.
pub struct DisabledBackend;

#[async_trait]
impl NotifyBackend for DisabledBackend {
    async fn send(&self, _message: &str) -> anyhow::Result<()> {
        warn!("Bot token or chat id is not configured. Skipping message send.");
        Err(JobWatchError::Delivery("bot token or chat id not configured".to_string()).into())
    }

    fn name(&self) -> &str {
        "disabled"
    }
}
