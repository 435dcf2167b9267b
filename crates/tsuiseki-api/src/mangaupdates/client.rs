use reqwest::{Client, StatusCode};

use super::auth::{self, Credentials};
use super::error::MangaUpdatesError;
use super::lists::{default_list_for_status, find_list, status_for_list_type};
use super::types::{
    ListSeriesEntry, ListSeriesStatus, ListSeriesUpdate, Profile, Rating, SearchRequest,
    SearchResponse, SeriesIdRef, UserList,
};
use super::METADATA;
use crate::score::ScoreFormat;
use crate::session::AccessToken;
use crate::traits::{TrackEntry, TrackStatus, TrackerClient, TrackerMetadata, TrackerSeries};

pub const API_URL: &str = "https://api.mangaupdates.com/v1";

const SEARCH_PAGE_SIZE: u32 = 10;

/// MangaUpdates REST client using session-token auth.
pub struct MangaUpdatesClient {
    api_url: String,
    session_token: AccessToken,
    http: Client,
}

impl MangaUpdatesClient {
    pub fn new(http: Client) -> Self {
        Self {
            api_url: API_URL.to_string(),
            session_token: AccessToken::default(),
            http,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn require_token(&self) -> Result<String, MangaUpdatesError> {
        self.session_token
            .get()
            .ok_or(MangaUpdatesError::NotAuthenticated)
    }

    async fn check_response(
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, MangaUpdatesError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "MangaUpdates API error");
            Err(MangaUpdatesError::Api {
                status,
                message: body,
            })
        }
    }

    /// GET a resource that answers 404 when absent.
    async fn get_optional<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<Option<T>, MangaUpdatesError> {
        let resp = self
            .http
            .get(format!("{}{path}", self.api_url))
            .bearer_auth(token)
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check_response(resp).await?;
        resp.json()
            .await
            .map(Some)
            .map_err(|e| MangaUpdatesError::Parse(e.to_string()))
    }

    /// The user's lists, including custom ones.
    pub async fn get_lists(&self) -> Result<Vec<UserList>, MangaUpdatesError> {
        let token = self.require_token()?;
        let resp = self
            .http
            .get(format!("{}/lists", self.api_url))
            .bearer_auth(token)
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| MangaUpdatesError::Parse(e.to_string()))
    }

    /// Name and status of a list id, consulting custom lists when it is not a default one.
    async fn resolve_list(&self, list_id: u64) -> Result<(Option<String>, TrackStatus), MangaUpdatesError> {
        let id = list_id.to_string();
        if let Some(mapping) = find_list(&id) {
            return Ok((Some(mapping.name.to_string()), mapping.status));
        }

        let custom = self
            .get_lists()
            .await?
            .into_iter()
            .find(|l| l.list_id == list_id);
        Ok(match custom {
            Some(list) => {
                let status = list
                    .kind
                    .as_deref()
                    .map(status_for_list_type)
                    .unwrap_or(TrackStatus::Reading);
                (Some(list.title), status)
            }
            None => (None, TrackStatus::Reading),
        })
    }

    async fn save_entry(
        &self,
        entry: &TrackEntry,
        endpoint: &str,
    ) -> Result<Option<TrackEntry>, MangaUpdatesError> {
        let series_id = parse_series_id(&entry.series_id)?;
        if let Some(score) = entry.score {
            ScoreFormat::Point10DecimalOneDigit.check(entry.score_format, score)?;
        }
        let token = self.require_token()?;

        let list_id = target_list_id(entry)?;

        let body = vec![ListSeriesUpdate {
            series: SeriesIdRef { id: series_id },
            list_id,
            status: ListSeriesStatus {
                volume: None,
                chapter: Some(entry.progress),
            },
        }];

        tracing::debug!(series_id, list_id, endpoint, "MangaUpdates list write");
        let resp = self
            .http
            .post(format!("{}{endpoint}", self.api_url))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        Self::check_response(resp).await?;

        if let Some(score) = entry.score {
            let resp = self
                .http
                .put(format!("{}/series/{series_id}/rating", self.api_url))
                .bearer_auth(&token)
                .json(&Rating { rating: score })
                .send()
                .await?;
            Self::check_response(resp).await?;
        }

        // List writes return no entry; read back what the server stored.
        self.get_library_entry(&entry.series_id).await
    }
}

/// List an entry is written to. A default list that disagrees with the entry's
/// status is replaced by the default list for that status; custom lists are kept.
fn target_list_id(entry: &TrackEntry) -> Result<u64, MangaUpdatesError> {
    let id = match entry.list_id.as_deref() {
        Some(id) => match find_list(id) {
            Some(mapping) if mapping.status != entry.status => {
                default_list_for_status(entry.status).id
            }
            _ => id,
        },
        None => default_list_for_status(entry.status).id,
    };
    id.parse()
        .map_err(|_| MangaUpdatesError::Parse(format!("invalid list id '{id}'")))
}

fn parse_series_id(series_id: &str) -> Result<u64, MangaUpdatesError> {
    series_id.parse().map_err(|_| {
        MangaUpdatesError::Parse(format!("invalid MangaUpdates series id '{series_id}'"))
    })
}

impl TrackerClient for MangaUpdatesClient {
    type Error = MangaUpdatesError;

    fn metadata(&self) -> TrackerMetadata {
        METADATA
    }

    fn auth_url(&self) -> String {
        auth::LOGIN_PAGE_URL.to_string()
    }

    /// `access_code` is a JSON-encoded [`Credentials`].
    async fn get_token(&self, access_code: &str) -> Result<String, MangaUpdatesError> {
        let credentials = Credentials::from_access_code(access_code)?;
        auth::login(&self.http, &self.api_url, &credentials).await
    }

    fn set_access_token(&self, token: &str) {
        self.session_token.set(token);
    }

    async fn get_username(&self) -> Result<Option<String>, MangaUpdatesError> {
        let Some(token) = self.session_token.get() else {
            return Ok(None);
        };

        let resp = self
            .http
            .get(format!("{}/account/profile", self.api_url))
            .bearer_auth(token)
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let profile: Profile = resp
            .json()
            .await
            .map_err(|e| MangaUpdatesError::Parse(e.to_string()))?;
        Ok(Some(profile.username))
    }

    async fn search(&self, query: &str) -> Result<Vec<TrackerSeries>, MangaUpdatesError> {
        let resp = self
            .http
            .post(format!("{}/series/search", self.api_url))
            .json(&SearchRequest {
                search: query,
                perpage: SEARCH_PAGE_SIZE,
            })
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| MangaUpdatesError::Parse(e.to_string()))?;

        Ok(body
            .results
            .into_iter()
            .map(|hit| hit.record.into_tracker_series())
            .collect())
    }

    async fn get_library_entry(
        &self,
        series_id: &str,
    ) -> Result<Option<TrackEntry>, MangaUpdatesError> {
        let id = parse_series_id(series_id)?;
        let token = self.require_token()?;

        let Some(listed) = self
            .get_optional::<ListSeriesEntry>(&format!("/lists/series/{id}"), &token)
            .await?
        else {
            return Ok(None);
        };

        let rating = self
            .get_optional::<Rating>(&format!("/series/{id}/rating"), &token)
            .await?;
        let (list_name, status) = self.resolve_list(listed.list_id).await?;

        Ok(Some(TrackEntry {
            series_id: listed.series.id.to_string(),
            progress: listed.status.and_then(|s| s.chapter).unwrap_or(0),
            status,
            score: rating.map(|r| r.rating),
            score_format: Some(ScoreFormat::Point10DecimalOneDigit),
            url: listed.series.url,
            list_id: Some(listed.list_id.to_string()),
            list_name,
        }))
    }

    async fn add_library_entry(
        &self,
        entry: &TrackEntry,
    ) -> Result<Option<TrackEntry>, MangaUpdatesError> {
        self.save_entry(entry, "/lists/series").await
    }

    async fn update_library_entry(
        &self,
        entry: &TrackEntry,
    ) -> Result<Option<TrackEntry>, MangaUpdatesError> {
        self.save_entry(entry, "/lists/series/update").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_on(list_id: Option<&str>, status: TrackStatus) -> TrackEntry {
        TrackEntry {
            list_id: list_id.map(String::from),
            status,
            ..TrackEntry::new("77")
        }
    }

    #[test]
    fn test_target_list_follows_status_change() {
        let moved = entry_on(Some("0"), TrackStatus::Completed);
        assert_eq!(target_list_id(&moved).unwrap(), 2);

        let unchanged = entry_on(Some("4"), TrackStatus::Paused);
        assert_eq!(target_list_id(&unchanged).unwrap(), 4);
    }

    #[test]
    fn test_target_list_keeps_custom_list() {
        let custom = entry_on(Some("101"), TrackStatus::Completed);
        assert_eq!(target_list_id(&custom).unwrap(), 101);
    }

    #[test]
    fn test_target_list_without_list_id() {
        assert_eq!(target_list_id(&entry_on(None, TrackStatus::Planning)).unwrap(), 1);
        assert!(target_list_id(&entry_on(Some("abc"), TrackStatus::Reading)).is_err());
    }
}
