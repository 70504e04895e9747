use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use ::telegram::models::SendMessageRequest;
use ::telegram::{TelegramOptions, TelegramService};
use jobwatch_common::JobWatchError;

use super::backend::NotifyBackend;

pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram Bot API backend posting to a single chat.
pub struct TelegramBackend {
    service: TelegramService,
    chat_id: String,
}

impl TelegramBackend {
    pub fn new(bot_token: &str, chat_id: &str) -> anyhow::Result<Self> {
        let mut options = TelegramOptions::new(bot_token);
        options.timeout = NOTIFY_TIMEOUT;
        Self::with_options(options, chat_id)
    }

    /// Custom API base or timeout, e.g. a local Bot API server.
    pub fn with_options(options: TelegramOptions, chat_id: &str) -> anyhow::Result<Self> {
        Ok(Self {
            service: TelegramService::new(options)?,
            chat_id: chat_id.to_string(),
        })
    }
}

#[async_trait]
impl NotifyBackend for TelegramBackend {
    async fn send(&self, message: &str) -> anyhow::Result<()> {
        let request = SendMessageRequest::html(&self.chat_id, message);
        let sent = self
            .service
            .send_message(&request)
            .await
            .map_err(|e| JobWatchError::Delivery(e.to_string()))?;
        info!(
            chat_id = self.chat_id.as_str(),
            message_id = sent.message_id,
            "Sent message to chat"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
