use serde::{Deserialize, Serialize};

use crate::traits::TrackerSeries;

// ── Search ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub search: &'a str,
    pub perpage: u32,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHit {
    pub record: SeriesRecord,
}

#[derive(Debug, Deserialize)]
pub struct SeriesRecord {
    pub series_id: u64,
    pub title: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub image: Option<SeriesImage>,
}

#[derive(Debug, Deserialize)]
pub struct SeriesImage {
    pub url: Option<ImageUrls>,
}

#[derive(Debug, Deserialize)]
pub struct ImageUrls {
    pub original: Option<String>,
    pub thumb: Option<String>,
}

// ── Account ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub username: String,
}

// ── Lists ───────────────────────────────────────────────────────

/// `GET /lists/series/{id}`
#[derive(Debug, Deserialize)]
pub struct ListSeriesEntry {
    pub series: ListSeriesRef,
    pub list_id: u64,
    pub status: Option<ListSeriesStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ListSeriesRef {
    pub id: u64,
    pub url: Option<String>,
    #[allow(dead_code)]
    pub title: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListSeriesStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u32>,
    pub chapter: Option<u32>,
}

/// One of the user's lists from `GET /lists`.
#[derive(Debug, Deserialize)]
pub struct UserList {
    pub list_id: u64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Body item for `POST /lists/series` and `POST /lists/series/update`.
#[derive(Debug, Serialize)]
pub struct ListSeriesUpdate {
    pub series: SeriesIdRef,
    pub list_id: u64,
    pub status: ListSeriesStatus,
}

#[derive(Debug, Serialize)]
pub struct SeriesIdRef {
    pub id: u64,
}

// ── Ratings ─────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Rating {
    pub rating: f64,
}

// ── Conversions ─────────────────────────────────────────────────

impl SeriesRecord {
    pub fn into_tracker_series(self) -> TrackerSeries {
        let cover_url = self
            .image
            .and_then(|i| i.url)
            .and_then(|u| u.original.or(u.thumb))
            .unwrap_or_default();
        TrackerSeries {
            id: self.series_id.to_string(),
            title: self.title,
            cover_url,
            description: self.description.unwrap_or_default(),
        }
    }
}
