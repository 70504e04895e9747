pub mod backend;
pub mod disabled;
pub mod telegram;

use std::sync::Arc;

use tracing::{error, info};

use jobwatch_common::Config;

use self::backend::NotifyBackend;
use self::disabled::DisabledBackend;
use self::telegram::TelegramBackend;

/// Front for the delivery backend. Failures stop here and come back as `false`.
#[derive(Clone)]
pub struct Notifier {
    backend: Arc<dyn NotifyBackend>,
}

impl Notifier {
    pub fn new(backend: Arc<dyn NotifyBackend>) -> Self {
        Self { backend }
    }

    /// Telegram if both credentials are configured, otherwise a backend that always fails.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let backend: Arc<dyn NotifyBackend> = match (&config.bot_token, &config.chat_id) {
            (Some(token), Some(chat_id)) => {
                info!("Telegram notifications enabled");
                Arc::new(TelegramBackend::new(token, chat_id)?)
            }
            _ => {
                info!("No BOT_TOKEN/CHAT_ID set, notifications disabled");
                Arc::new(DisabledBackend)
            }
        };
        Ok(Self { backend })
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Returns true only when the backend confirmed delivery.
    pub async fn deliver(&self, message: &str) -> bool {
        match self.backend.send(message).await {
            Ok(()) => true,
            Err(e) => {
                error!(backend = self.backend.name(), error = %e, "Failed to deliver message");
                false
            }
        }
    }
}
