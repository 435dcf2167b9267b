use serde::Deserialize;

use crate::score::ScoreFormat;
use crate::traits::{TrackEntry, TrackStatus, TrackerSeries};

use super::METADATA;

// ── GraphQL envelopes ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct ViewerResponse {
    #[serde(rename = "Viewer")]
    pub viewer: Viewer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    pub id: u64,
    pub name: String,
    pub media_list_options: Option<MediaListOptions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaListOptions {
    pub score_format: Option<String>,
}

impl Viewer {
    /// The viewer's score format, falling back to `POINT_10` for unknown values.
    pub fn score_format(&self) -> ScoreFormat {
        self.media_list_options
            .as_ref()
            .and_then(|o| o.score_format.as_deref())
            .and_then(parse_score_format)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct PageResponse {
    #[serde(rename = "Page")]
    pub page: Page,
}

#[derive(Debug, Deserialize)]
pub struct Page {
    pub media: Vec<AniListMedia>,
}

#[derive(Debug, Deserialize)]
pub struct MediaListResponse {
    #[serde(rename = "MediaList")]
    pub media_list: Option<MediaListEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SaveMediaListResponse {
    #[serde(rename = "SaveMediaListEntry")]
    pub entry: Option<MediaListEntry>,
}

// ── Media types ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AniListMedia {
    pub id: u64,
    pub title: MediaTitle,
    pub cover_image: Option<CoverImage>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MediaTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoverImage {
    pub large: Option<String>,
    pub medium: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaListEntry {
    pub id: u64,
    pub media_id: u64,
    pub status: Option<String>,
    pub progress: Option<u32>,
    pub score: Option<f64>,
}

// ── Status / score mapping ──────────────────────────────────────

pub fn map_status_to_anilist(status: TrackStatus) -> &'static str {
    match status {
        TrackStatus::Reading => "CURRENT",
        TrackStatus::Completed => "COMPLETED",
        TrackStatus::Paused => "PAUSED",
        TrackStatus::Dropped => "DROPPED",
        TrackStatus::Planning => "PLANNING",
    }
}

pub fn map_anilist_status(status: &str) -> TrackStatus {
    match status {
        "COMPLETED" => TrackStatus::Completed,
        "PAUSED" => TrackStatus::Paused,
        "DROPPED" => TrackStatus::Dropped,
        "PLANNING" => TrackStatus::Planning,
        // CURRENT, REPEATING
        _ => TrackStatus::Reading,
    }
}

/// Parse an AniList `ScoreFormat` enum value.
pub fn parse_score_format(s: &str) -> Option<ScoreFormat> {
    match s {
        "POINT_100" => Some(ScoreFormat::Point100),
        "POINT_10_DECIMAL" => Some(ScoreFormat::Point10Decimal),
        "POINT_10" => Some(ScoreFormat::Point10),
        "POINT_5" => Some(ScoreFormat::Point5),
        "POINT_3" => Some(ScoreFormat::Point3),
        _ => None,
    }
}

/// AniList returns `POINT_10_DECIMAL` scores as `7.5`; the domain stores `75`.
pub fn score_from_anilist(format: ScoreFormat, score: f64) -> f64 {
    match format {
        ScoreFormat::Point10Decimal => (score * 10.0).round(),
        _ => score.round(),
    }
}

pub fn score_to_anilist(format: ScoreFormat, score: f64) -> f64 {
    match format {
        ScoreFormat::Point10Decimal => score / 10.0,
        _ => score,
    }
}

// ── Conversions ─────────────────────────────────────────────────

impl AniListMedia {
    pub fn into_tracker_series(self) -> TrackerSeries {
        let title = self
            .title
            .romaji
            .or(self.title.english)
            .or(self.title.native)
            .unwrap_or_default();
        TrackerSeries {
            id: self.id.to_string(),
            title,
            cover_url: self
                .cover_image
                .and_then(|c| c.large.or(c.medium))
                .unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        }
    }
}

impl MediaListEntry {
    pub fn into_track_entry(self, format: ScoreFormat) -> TrackEntry {
        TrackEntry {
            series_id: self.media_id.to_string(),
            progress: self.progress.unwrap_or(0),
            status: self
                .status
                .as_deref()
                .map(map_anilist_status)
                .unwrap_or(TrackStatus::Reading),
            score: self.score.map(|s| score_from_anilist(format, s)),
            score_format: Some(format),
            url: Some(format!("{}/manga/{}", METADATA.url, self.media_id)),
            list_id: None,
            list_name: None,
        }
    }
}
