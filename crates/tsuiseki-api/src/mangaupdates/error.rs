use thiserror::Error;

use crate::score::ScoreError;

/// Errors from the MangaUpdates API client.
#[derive(Debug, Error)]
pub enum MangaUpdatesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not signed in to MangaUpdates")]
    NotAuthenticated,

    #[error("login failed: {0}")]
    Login(String),

    #[error("score rejected: {0}")]
    InvalidScore(#[from] ScoreError),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),
}
