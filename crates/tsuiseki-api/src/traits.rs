//! Trait definitions for list tracking services.
//!
//! All service clients (AniList, MyAnimeList, MangaUpdates) implement
//! [`TrackerClient`], allowing the registry and UI to be service-agnostic.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::score::{ScoreError, ScoreFormat};

/// A unified list tracking service interface.
///
/// Failures are reported as `Err`; "not in the user's list" and "not signed
/// in" are `Ok(None)`, never errors.
pub trait TrackerClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Static descriptor of this service.
    fn metadata(&self) -> TrackerMetadata;

    /// URL the user visits to start authenticating. Never touches the network.
    fn auth_url(&self) -> String;

    /// Exchange a one-time code (OAuth) or login credentials for a durable token.
    fn get_token(&self, access_code: &str)
        -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Inject a previously persisted token. Last write wins.
    fn set_access_token(&self, token: &str);

    /// Display name of the authenticated user, or `None` without a session.
    fn get_username(&self) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

    /// Free-text search against the remote catalog.
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<TrackerSeries>, Self::Error>> + Send;

    /// The user's list entry for a remote series, or `None` if not in their list.
    fn get_library_entry(
        &self,
        series_id: &str,
    ) -> impl Future<Output = Result<Option<TrackEntry>, Self::Error>> + Send;

    /// Create the remote entry.
    fn add_library_entry(
        &self,
        entry: &TrackEntry,
    ) -> impl Future<Output = Result<Option<TrackEntry>, Self::Error>> + Send;

    /// Push local changes to the remote entry. Safe to repeat.
    fn update_library_entry(
        &self,
        entry: &TrackEntry,
    ) -> impl Future<Output = Result<Option<TrackEntry>, Self::Error>> + Send;
}

/// Identifier of a supported tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrackerId {
    AniList,
    MyAnimeList,
    MangaUpdates,
}

impl TrackerId {
    pub const ALL: &[TrackerId] = &[Self::AniList, Self::MyAnimeList, Self::MangaUpdates];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AniList => "AniList",
            Self::MyAnimeList => "MyAnimeList",
            Self::MangaUpdates => "MangaUpdates",
        }
    }
}

impl std::fmt::Display for TrackerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a supported tracker.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown tracker: {0}")]
pub struct UnknownTracker(pub String);

impl std::str::FromStr for TrackerId {
    type Err = UnknownTracker;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownTracker(s.to_string()))
    }
}

/// Static descriptor of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerMetadata {
    pub id: TrackerId,
    pub name: &'static str,
    pub url: &'static str,
    /// Format every score on this tracker uses; `None` when it is per user.
    pub score_format: Option<ScoreFormat>,
}

/// A search result from any tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSeries {
    pub id: String,
    pub title: String,
    pub cover_url: String,
    pub description: String,
}

/// Canonical reading status shared by every tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackStatus {
    Reading,
    Completed,
    Paused,
    Dropped,
    Planning,
}

impl TrackStatus {
    pub const ALL: &[TrackStatus] = &[
        Self::Reading,
        Self::Completed,
        Self::Paused,
        Self::Dropped,
        Self::Planning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reading => "Reading",
            Self::Completed => "Completed",
            Self::Paused => "Paused",
            Self::Dropped => "Dropped",
            Self::Planning => "Planning",
        }
    }
}

impl std::fmt::Display for TrackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TrackStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown status: {s}"))
    }
}

/// The user's progress, status and score for one series on one tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEntry {
    /// Remote series id.
    pub series_id: String,
    pub progress: u32,
    pub status: TrackStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_format: Option<ScoreFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_name: Option<String>,
}

impl TrackEntry {
    /// The entry assumed for a linked series that is not yet in the user's list.
    pub fn new(series_id: impl Into<String>) -> Self {
        Self {
            series_id: series_id.into(),
            progress: 0,
            status: TrackStatus::Reading,
            score: None,
            score_format: None,
            url: None,
            list_id: None,
            list_name: None,
        }
    }

    /// Score format the entry is validated against. Entries without one use `POINT_10`.
    pub fn effective_score_format(&self) -> ScoreFormat {
        self.score_format.unwrap_or_default()
    }

    /// Coerce user input to this entry's score format and store it.
    pub fn set_score_input(&mut self, input: &str) -> Result<f64, ScoreError> {
        let score = self.effective_score_format().parse(input)?;
        self.score = Some(score);
        Ok(score)
    }

    /// Link to the entry on the tracker's website.
    pub fn web_url(&self, metadata: &TrackerMetadata) -> String {
        match &self.url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!("{}/manga/{}", metadata.url, self.series_id),
        }
    }
}

/// A [`TrackEntry`] as submitted by a caller, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEntryDraft {
    pub series_id: String,
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default)]
    pub status: Option<TrackStatus>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub score_format: Option<ScoreFormat>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub list_id: Option<String>,
    #[serde(default)]
    pub list_name: Option<String>,
}

impl TrackEntryDraft {
    pub fn new(series_id: impl Into<String>) -> Self {
        Self {
            series_id: series_id.into(),
            ..Default::default()
        }
    }

    /// Fill missing progress with 0 and missing status with Reading.
    pub fn into_entry(self) -> TrackEntry {
        TrackEntry {
            series_id: self.series_id,
            progress: self.progress.unwrap_or(0),
            status: self.status.unwrap_or(TrackStatus::Reading),
            score: self.score,
            score_format: self.score_format,
            url: self.url,
            list_id: self.list_id,
            list_name: self.list_name,
        }
    }
}

impl From<TrackEntry> for TrackEntryDraft {
    fn from(entry: TrackEntry) -> Self {
        Self {
            series_id: entry.series_id,
            progress: Some(entry.progress),
            status: Some(entry.status),
            score: entry.score,
            score_format: entry.score_format,
            url: entry.url,
            list_id: entry.list_id,
            list_name: entry.list_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_id_parse() {
        assert_eq!("AniList".parse::<TrackerId>().unwrap(), TrackerId::AniList);
        assert_eq!(
            "mangaupdates".parse::<TrackerId>().unwrap(),
            TrackerId::MangaUpdates
        );
        assert!("Kitsu".parse::<TrackerId>().is_err());
    }

    #[test]
    fn test_status_order() {
        assert_eq!(
            TrackStatus::ALL,
            &[
                TrackStatus::Reading,
                TrackStatus::Completed,
                TrackStatus::Paused,
                TrackStatus::Dropped,
                TrackStatus::Planning,
            ]
        );
        assert_eq!("on hold".parse::<TrackStatus>().ok(), None);
        assert_eq!("paused".parse::<TrackStatus>().unwrap(), TrackStatus::Paused);
    }

    #[test]
    fn test_draft_defaults() {
        let entry = TrackEntryDraft::new("30002").into_entry();
        assert_eq!(entry.series_id, "30002");
        assert_eq!(entry.progress, 0);
        assert_eq!(entry.status, TrackStatus::Reading);
    }

    #[test]
    fn test_draft_keeps_given_fields() {
        let draft = TrackEntryDraft {
            progress: Some(12),
            status: Some(TrackStatus::Paused),
            ..TrackEntryDraft::new("1")
        };
        let entry = draft.into_entry();
        assert_eq!(entry.progress, 12);
        assert_eq!(entry.status, TrackStatus::Paused);
    }

    #[test]
    fn test_entry_camel_case_json() {
        let json = r#"{
            "seriesId": "55099564912",
            "progress": 4,
            "status": "Reading",
            "score": 7.3,
            "scoreFormat": "POINT_10_DECIMAL_ONE_DIGIT",
            "listId": "0",
            "listName": "Reading List"
        }"#;
        let entry: TrackEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.score, Some(7.3));
        assert_eq!(entry.score_format, Some(ScoreFormat::Point10DecimalOneDigit));
        assert_eq!(entry.list_name.as_deref(), Some("Reading List"));
        assert!(entry.url.is_none());
    }

    #[test]
    fn test_score_input_round_trip() {
        let mut entry = TrackEntry::new("1");
        entry.score_format = Some(ScoreFormat::Point10DecimalOneDigit);
        entry.set_score_input("7.3").unwrap();

        let json = serde_json::to_string(&entry).unwrap();
        let parsed: TrackEntry = serde_json::from_str(&json).unwrap();
        let label = parsed.effective_score_format().label(parsed.score.unwrap());

        let mut again = parsed.clone();
        again.set_score_input(&label).unwrap();
        assert_eq!(label, "7.3");
        assert_eq!(again.score, Some(7.3));
    }

    #[test]
    fn test_score_input_uses_point_10_without_format() {
        let mut entry = TrackEntry::new("1");
        assert_eq!(entry.set_score_input("8").unwrap(), 8.0);
        assert!(entry.set_score_input("7.3").is_err());
        assert!(entry.set_score_input("11").is_err());
    }

    #[test]
    fn test_web_url_fallback() {
        let meta = TrackerMetadata {
            id: TrackerId::MyAnimeList,
            name: "MyAnimeList",
            url: "https://myanimelist.net",
            score_format: Some(ScoreFormat::Point10),
        };
        let mut entry = TrackEntry::new("2");
        assert_eq!(entry.web_url(&meta), "https://myanimelist.net/manga/2");

        entry.url = Some("https://myanimelist.net/manga/2/Berserk".into());
        assert_eq!(entry.web_url(&meta), "https://myanimelist.net/manga/2/Berserk");
    }
}
