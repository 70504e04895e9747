use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{JobWatchError, Result};

/// Search terms for junior doctor roles.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "junior doctor",
    "junior clinical fellow",
    "clinical fellow",
    "medical fellow",
    "foundation year 1",
    "foundation year 2",
    "foundation house officer 1",
    "foundation house officer 2",
    "FY1",
    "FY2",
    "senior house officer",
    "SHO",
    "trust doctor",
    "trust grade doctor",
    "resident medical officer",
    "RMO",
];

/// Sleep between check cycles unless `POLL_INTERVAL_SECS` overrides it.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

const BOT_TOKEN_PLACEHOLDER: &str = "YOUR_BOT_TOKEN";
const CHAT_ID_PLACEHOLDER: &str = "YOUR_CHAT_ID";

/// Application configuration loaded from environment variables.
/// Built once in `main` and handed to the components that need it.
#[derive(Clone)]
pub struct Config {
    // Delivery
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,

    // Liveness server
    pub web_host: String,
    pub web_port: u16,

    // Polling
    pub seen_jobs_path: PathBuf,
    pub poll_interval: Duration,
    pub keywords: Vec<String>,
    pub keyword_filter: bool,
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    /// Missing credentials are not an error; malformed numbers are.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let keywords = match lookup("SEARCH_KEYWORDS") {
            Some(raw) => {
                let parsed: Vec<String> = raw
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if parsed.is_empty() {
                    return Err(JobWatchError::Config(
                        "SEARCH_KEYWORDS is set but contains no keywords".to_string(),
                    ));
                }
                parsed
            }
            None => DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            bot_token: credential(lookup("BOT_TOKEN"), BOT_TOKEN_PLACEHOLDER),
            chat_id: credential(lookup("CHAT_ID"), CHAT_ID_PLACEHOLDER),
            web_host: lookup("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port: parse_or("PORT", lookup("PORT"), 10000)?,
            seen_jobs_path: lookup("SEEN_JOBS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("seen_jobs.json")),
            poll_interval: Duration::from_secs(parse_or(
                "POLL_INTERVAL_SECS",
                lookup("POLL_INTERVAL_SECS"),
                DEFAULT_POLL_INTERVAL.as_secs(),
            )?),
            keywords,
            keyword_filter: parse_or("KEYWORD_FILTER", lookup("KEYWORD_FILTER"), true)?,
        })
    }

    /// True when both the bot token and destination chat are set.
    pub fn delivery_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }

    pub fn log_redacted(&self) {
        fn preview(val: &str) -> String {
            let n = val.chars().count().min(5);
            let head: String = val.chars().take(n).collect();
            format!("{}...({} chars)", head, val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) => preview(v),
                None => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  BOT_TOKEN: {}", preview_opt(&self.bot_token));
        tracing::info!("  CHAT_ID: {}", self.chat_id.as_deref().unwrap_or("<not set>"));
        tracing::info!("  WEB: {}:{}", self.web_host, self.web_port);
        tracing::info!("  SEEN_JOBS_PATH: {}", self.seen_jobs_path.display());
        tracing::info!("  POLL_INTERVAL_SECS: {}", self.poll_interval.as_secs());
        tracing::info!(
            "  KEYWORDS: {} (local filter {})",
            self.keywords.len(),
            if self.keyword_filter { "on" } else { "off" }
        );
        if !self.delivery_configured() {
            tracing::warn!("BOT_TOKEN or CHAT_ID not configured; messages will not be sent");
        }
    }
}

fn credential(value: Option<String>, placeholder: &str) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != placeholder)
}

fn parse_or<T: std::str::FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| JobWatchError::Config(format!("{key} has invalid value {raw:?}"))),
        None => Ok(default),
    }
}
