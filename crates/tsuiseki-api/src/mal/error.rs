use thiserror::Error;

use crate::score::ScoreError;

/// Errors from the MyAnimeList API client.
#[derive(Debug, Error)]
pub enum MalError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not signed in to MyAnimeList")]
    NotAuthenticated,

    #[error("PKCE code exchange failed: {0}")]
    CodeExchange(String),

    #[error("'{0}' is not a MyAnimeList manga id")]
    InvalidId(String),

    #[error("score rejected: {0}")]
    InvalidScore(#[from] ScoreError),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Parse(String),
}
