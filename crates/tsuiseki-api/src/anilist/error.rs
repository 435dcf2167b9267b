use thiserror::Error;

use crate::score::ScoreError;

/// Errors from the AniList API client.
#[derive(Debug, Error)]
pub enum AniListError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not signed in to AniList")]
    NotAuthenticated,

    #[error("auth error: {0}")]
    Auth(String),

    #[error("score rejected: {0}")]
    InvalidScore(#[from] ScoreError),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),
}
