pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use client::MalClient;
pub use error::MalError;

use crate::score::ScoreFormat;
use crate::traits::{TrackerId, TrackerMetadata};

pub const METADATA: TrackerMetadata = TrackerMetadata {
    id: TrackerId::MyAnimeList,
    name: "MyAnimeList",
    url: "https://myanimelist.net",
    score_format: Some(ScoreFormat::Point10),
};
