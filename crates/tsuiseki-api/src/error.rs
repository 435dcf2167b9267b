use thiserror::Error;

use crate::anilist::AniListError;
use crate::mal::MalError;
use crate::mangaupdates::MangaUpdatesError;

/// Any client error, tagged by service.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("AniList: {0}")]
    AniList(#[from] AniListError),

    #[error("MyAnimeList: {0}")]
    MyAnimeList(#[from] MalError),

    #[error("MangaUpdates: {0}")]
    MangaUpdates(#[from] MangaUpdatesError),
}
