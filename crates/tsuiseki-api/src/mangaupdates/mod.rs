pub mod auth;
pub mod client;
pub mod error;
pub mod lists;
pub mod types;

pub use auth::Credentials;
pub use client::MangaUpdatesClient;
pub use error::MangaUpdatesError;

use crate::score::ScoreFormat;
use crate::traits::{TrackerId, TrackerMetadata};

pub const METADATA: TrackerMetadata = TrackerMetadata {
    id: TrackerId::MangaUpdates,
    name: "MangaUpdates",
    url: "https://www.mangaupdates.com",
    score_format: Some(ScoreFormat::Point10DecimalOneDigit),
};
