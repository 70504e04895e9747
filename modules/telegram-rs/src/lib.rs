// https://core.telegram.org/bots/api#sendmessage

use std::fmt;
use std::time::Duration;

pub mod models;
use reqwest::Client;

use crate::models::{ApiResponse, Message, SendMessageRequest};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("Telegram request timed out")]
    Timeout,

    #[error("Request to Telegram failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Telegram returned {status}: {description}")]
    Api { status: u16, description: String },

    #[error("Failed to parse Telegram response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TelegramError::Timeout
        } else {
            TelegramError::Http(e)
        }
    }
}

#[derive(Clone)]
pub struct TelegramOptions {
    pub bot_token: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl TelegramOptions {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

// Token is a credential; keep it out of logs.
impl fmt::Debug for TelegramOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramOptions")
            .field("bot_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TelegramService {
    options: TelegramOptions,
    client: Client,
}

impl TelegramService {
    pub fn new(options: TelegramOptions) -> Result<Self, TelegramError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(TelegramError::Http)?;
        Ok(Self { options, client })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{base}/bot{token}/{method}",
            base = self.options.api_base.trim_end_matches('/'),
            token = self.options.bot_token,
        )
    }

    /// Send a text message. Any non-2xx status or `ok: false` body is an error.
    pub async fn send_message(
        &self,
        request: &SendMessageRequest,
    ) -> Result<Message, TelegramError> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: Option<ApiResponse<Message>> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let description = parsed
                .and_then(|r| r.description)
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(TelegramError::Api {
                status: status.as_u16(),
                description,
            });
        }

        match parsed {
            Some(ApiResponse {
                ok: true,
                result: Some(message),
                ..
            }) => Ok(message),
            Some(r) => Err(TelegramError::Api {
                status: r.error_code.unwrap_or(status.as_u16()),
                description: r
                    .description
                    .unwrap_or_else(|| "ok=false without description".to_string()),
            }),
            None => Err(TelegramError::Decode(body.chars().take(200).collect())),
        }
    }
}
