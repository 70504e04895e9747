use thiserror::Error;

/// Result type alias for job-watch operations.
pub type Result<T> = std::result::Result<T, JobWatchError>;

#[derive(Error, Debug)]
pub enum JobWatchError {
    #[error("Timed out fetching {url}")]
    TransportTimeout { url: String },

    #[error("Network error fetching {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Seen-jobs store error: {0}")]
    Persistence(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl JobWatchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, JobWatchError::TransportTimeout { .. })
    }
}
