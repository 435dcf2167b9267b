use thiserror::Error;

use tsuiseki_api::ScoreError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("config error: {0}")]
    Config(String),

    #[error("credential store error: {0}")]
    Credentials(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejections the façade makes before contacting a tracker.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid score: {0}")]
    InvalidScore(#[from] ScoreError),
}
