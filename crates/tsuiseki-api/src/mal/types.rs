use serde::Deserialize;

use crate::score::ScoreFormat;
use crate::traits::{TrackEntry, TrackStatus, TrackerSeries};

use super::METADATA;

// ── Search / manga detail responses ─────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MalSearchResponse {
    pub data: Vec<MalSearchNode>,
}

#[derive(Debug, Deserialize)]
pub struct MalSearchNode {
    pub node: MalMangaNode,
}

#[derive(Debug, Deserialize)]
pub struct MalMangaNode {
    pub id: u64,
    pub title: String,
    pub main_picture: Option<MalPicture>,
    pub synopsis: Option<String>,
    pub my_list_status: Option<MalListStatus>,
}

#[derive(Debug, Deserialize)]
pub struct MalPicture {
    pub medium: Option<String>,
    pub large: Option<String>,
}

// ── User list responses ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MalListStatus {
    pub status: Option<String>,
    pub score: Option<u32>,
    pub num_chapters_read: Option<u32>,
    #[allow(dead_code)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MalUser {
    pub name: String,
}

// ── Status mapping ──────────────────────────────────────────────

pub fn map_status_to_mal(status: TrackStatus) -> &'static str {
    match status {
        TrackStatus::Reading => "reading",
        TrackStatus::Completed => "completed",
        TrackStatus::Paused => "on_hold",
        TrackStatus::Dropped => "dropped",
        TrackStatus::Planning => "plan_to_read",
    }
}

pub fn map_mal_status(status: &str) -> TrackStatus {
    match status {
        "completed" => TrackStatus::Completed,
        "on_hold" => TrackStatus::Paused,
        "dropped" => TrackStatus::Dropped,
        "plan_to_read" => TrackStatus::Planning,
        _ => TrackStatus::Reading,
    }
}

// ── Conversions to shared trait types ───────────────────────────

impl MalMangaNode {
    pub fn into_tracker_series(self) -> TrackerSeries {
        TrackerSeries {
            id: self.id.to_string(),
            title: self.title,
            cover_url: self
                .main_picture
                .and_then(|pic| pic.large.or(pic.medium))
                .unwrap_or_default(),
            description: self.synopsis.unwrap_or_default(),
        }
    }
}

impl MalListStatus {
    pub fn into_track_entry(self, manga_id: u64) -> TrackEntry {
        TrackEntry {
            series_id: manga_id.to_string(),
            progress: self.num_chapters_read.unwrap_or(0),
            status: self
                .status
                .as_deref()
                .map(map_mal_status)
                .unwrap_or(TrackStatus::Reading),
            score: self.score.map(f64::from),
            score_format: Some(ScoreFormat::Point10),
            url: Some(format!("{}/manga/{manga_id}", METADATA.url)),
            list_id: None,
            list_name: None,
        }
    }
}
