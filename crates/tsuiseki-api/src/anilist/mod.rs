pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use client::AniListClient;
pub use error::AniListError;

use crate::traits::{TrackerId, TrackerMetadata};

pub const METADATA: TrackerMetadata = TrackerMetadata {
    id: TrackerId::AniList,
    name: "AniList",
    url: "https://anilist.co",
    score_format: None,
};
