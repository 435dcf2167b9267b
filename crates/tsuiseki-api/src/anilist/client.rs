use reqwest::Client;

use super::auth;
use super::error::AniListError;
use super::types::{
    map_status_to_anilist, score_to_anilist, GraphQLResponse, MediaListResponse, PageResponse,
    SaveMediaListResponse, Viewer, ViewerResponse,
};
use super::METADATA;
use crate::session::AccessToken;
use crate::traits::{TrackEntry, TrackerClient, TrackerMetadata, TrackerSeries};

pub const API_URL: &str = "https://graphql.anilist.co";

const SEARCH_QUERY: &str = r#"
query ($search: String) {
    Page(perPage: 10) {
        media(search: $search, type: MANGA) {
            id
            title { romaji english native }
            coverImage { large medium }
            description
        }
    }
}
"#;

const VIEWER_QUERY: &str = r#"
query {
    Viewer {
        id
        name
        mediaListOptions { scoreFormat }
    }
}
"#;

const LIBRARY_ENTRY_QUERY: &str = r#"
query ($userId: Int, $mediaId: Int) {
    MediaList(userId: $userId, mediaId: $mediaId) {
        id
        mediaId
        status
        progress
        score
    }
}
"#;

const SAVE_LIBRARY_ENTRY_MUTATION: &str = r#"
mutation ($mediaId: Int, $status: MediaListStatus, $progress: Int, $score: Float) {
    SaveMediaListEntry(mediaId: $mediaId, status: $status, progress: $progress, score: $score) {
        id
        mediaId
        status
        progress
        score
    }
}
"#;

/// AniList GraphQL API client.
pub struct AniListClient {
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    api_url: String,
    token_url: String,
    access_token: AccessToken,
    http: Client,
}

impl AniListClient {
    pub fn new(http: Client, client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: None,
            api_url: API_URL.to_string(),
            token_url: auth::TOKEN_URL.to_string(),
            access_token: AccessToken::default(),
            http,
        }
    }

    /// Switch from the implicit grant to the authorization code grant.
    pub fn with_client_secret(
        mut self,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        self.client_secret = Some(client_secret.into());
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Secret and redirect URI, when the code grant is configured.
    fn code_grant(&self) -> Option<(&str, &str)> {
        match (&self.client_secret, &self.redirect_uri) {
            (Some(secret), Some(redirect)) => Some((secret, redirect)),
            _ => None,
        }
    }

    async fn graphql_request<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, AniListError> {
        tracing::debug!(operation, "AniList GraphQL request");

        let mut req = self
            .http
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");
        if let Some(token) = self.access_token.get() {
            req = req.bearer_auth(token);
        }

        let resp = req
            .json(&serde_json::json!({
                "query": query,
                "variables": variables,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(operation, status = status_code, "AniList API error");
            return Err(AniListError::Api {
                status: status_code,
                message: body,
            });
        }

        tracing::debug!(operation, status = %status, "AniList response received");
        resp.json::<T>()
            .await
            .map_err(|e| AniListError::Parse(e.to_string()))
    }

    /// Fetch the authenticated user, including their score format.
    pub async fn get_viewer(&self) -> Result<Viewer, AniListError> {
        if !self.access_token.is_set() {
            return Err(AniListError::NotAuthenticated);
        }
        let resp: GraphQLResponse<ViewerResponse> = self
            .graphql_request("Viewer", VIEWER_QUERY, serde_json::json!({}))
            .await?;
        Ok(resp.data.viewer)
    }

    async fn save_entry(&self, entry: &TrackEntry) -> Result<Option<TrackEntry>, AniListError> {
        let media_id = parse_media_id(&entry.series_id)?;
        let format = self.get_viewer().await?.score_format();

        let mut vars = serde_json::json!({
            "mediaId": media_id,
            "status": map_status_to_anilist(entry.status),
            "progress": entry.progress,
        });
        if let Some(score) = entry.score {
            format.check(entry.score_format, score)?;
            vars["score"] = serde_json::json!(score_to_anilist(format, score));
        }

        let resp: GraphQLResponse<SaveMediaListResponse> = self
            .graphql_request("SaveMediaListEntry", SAVE_LIBRARY_ENTRY_MUTATION, vars)
            .await?;
        Ok(resp.data.entry.map(|e| e.into_track_entry(format)))
    }
}

fn parse_media_id(series_id: &str) -> Result<u64, AniListError> {
    series_id
        .parse()
        .map_err(|_| AniListError::Parse(format!("invalid AniList media id '{series_id}'")))
}

impl TrackerClient for AniListClient {
    type Error = AniListError;

    fn metadata(&self) -> TrackerMetadata {
        METADATA
    }

    fn auth_url(&self) -> String {
        auth::authorize_url(&self.client_id, self.code_grant().map(|(_, redirect)| redirect))
    }

    async fn get_token(&self, access_code: &str) -> Result<String, AniListError> {
        let code = access_code.trim();
        if code.is_empty() {
            return Err(AniListError::Auth("empty access code".into()));
        }

        match self.code_grant() {
            Some((secret, redirect)) => {
                let resp = auth::exchange_code(
                    &self.http,
                    &self.token_url,
                    &self.client_id,
                    secret,
                    redirect,
                    code,
                )
                .await?;
                Ok(resp.access_token)
            }
            // Implicit grant: the user already holds the token.
            None => Ok(code.to_string()),
        }
    }

    fn set_access_token(&self, token: &str) {
        self.access_token.set(token);
    }

    async fn get_username(&self) -> Result<Option<String>, AniListError> {
        if !self.access_token.is_set() {
            return Ok(None);
        }
        Ok(Some(self.get_viewer().await?.name))
    }

    async fn search(&self, query: &str) -> Result<Vec<TrackerSeries>, AniListError> {
        let resp: GraphQLResponse<PageResponse> = self
            .graphql_request(
                "Search",
                SEARCH_QUERY,
                serde_json::json!({ "search": query }),
            )
            .await?;

        Ok(resp
            .data
            .page
            .media
            .into_iter()
            .map(|m| m.into_tracker_series())
            .collect())
    }

    async fn get_library_entry(&self, series_id: &str) -> Result<Option<TrackEntry>, AniListError> {
        let media_id = parse_media_id(series_id)?;
        let viewer = self.get_viewer().await?;

        let lookup: Result<GraphQLResponse<MediaListResponse>, _> = self
            .graphql_request(
                "MediaList",
                LIBRARY_ENTRY_QUERY,
                serde_json::json!({ "userId": viewer.id, "mediaId": media_id }),
            )
            .await;

        match lookup {
            Ok(resp) => Ok(resp
                .data
                .media_list
                .map(|e| e.into_track_entry(viewer.score_format()))),
            // AniList answers 404 when the media is not on the user's list.
            Err(AniListError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn add_library_entry(&self, entry: &TrackEntry) -> Result<Option<TrackEntry>, AniListError> {
        // SaveMediaListEntry creates the entry when absent.
        self.save_entry(entry).await
    }

    async fn update_library_entry(
        &self,
        entry: &TrackEntry,
    ) -> Result<Option<TrackEntry>, AniListError> {
        self.save_entry(entry).await
    }
}
