use std::sync::{PoisonError, RwLock};

use reqwest::{Client, RequestBuilder};

use super::auth;
use super::error::MalError;
use super::types::{map_status_to_mal, MalListStatus, MalMangaNode, MalSearchResponse, MalUser};
use super::METADATA;
use crate::score::ScoreFormat;
use crate::session::AccessToken;
use crate::traits::{TrackEntry, TrackerClient, TrackerMetadata, TrackerSeries};

pub const API_URL: &str = "https://api.myanimelist.net/v2";

/// MAL rejects search queries longer than this.
const MAX_QUERY_CHARS: usize = 64;

/// MyAnimeList API v2 client.
pub struct MalClient {
    client_id: String,
    redirect_uri: Option<String>,
    /// Shared by the auth URL and the code exchange; persisted by the host
    /// when the exchange happens in a later process.
    code_verifier: RwLock<String>,
    api_url: String,
    auth_url: String,
    token_url: String,
    access_token: AccessToken,
    http: Client,
}

impl MalClient {
    pub fn new(http: Client, client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: None,
            code_verifier: RwLock::new(auth::generate_verifier()),
            api_url: API_URL.to_string(),
            auth_url: auth::AUTH_URL.to_string(),
            token_url: auth::TOKEN_URL.to_string(),
            access_token: AccessToken::default(),
            http,
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_oauth_urls(mut self, auth_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self.token_url = token_url.into();
        self
    }

    pub fn code_verifier(&self) -> String {
        self.code_verifier
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reuse the verifier behind an auth URL issued earlier. Blank input is ignored.
    pub fn set_code_verifier(&self, verifier: &str) {
        let verifier = verifier.trim();
        if verifier.is_empty() {
            return;
        }
        *self
            .code_verifier
            .write()
            .unwrap_or_else(PoisonError::into_inner) = verifier.to_string();
    }

    /// Attach the bearer token, or the client id for endpoints that allow anonymous access.
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.access_token.get() {
            Some(token) => req.bearer_auth(token),
            None => req.header("X-MAL-CLIENT-ID", &self.client_id),
        }
    }

    fn require_token(&self) -> Result<String, MalError> {
        self.access_token.get().ok_or(MalError::NotAuthenticated)
    }

    /// Check the HTTP response for errors and return the body text on failure.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, MalError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "MAL API error");
            Err(MalError::Api {
                status,
                message: body,
            })
        }
    }

    /// `PATCH my_list_status` creates the entry when absent, so add and update share it.
    async fn save_entry(&self, entry: &TrackEntry) -> Result<Option<TrackEntry>, MalError> {
        let manga_id = parse_manga_id(&entry.series_id)?;
        let token = self.require_token()?;

        let mut params: Vec<(&str, String)> = vec![
            ("status", map_status_to_mal(entry.status).to_string()),
            ("num_chapters_read", entry.progress.to_string()),
        ];
        if let Some(score) = entry.score {
            // Integer 0-10; 0 clears the score.
            ScoreFormat::Point10.check(entry.score_format, score)?;
            params.push(("score", ScoreFormat::Point10.label(score)));
        }

        tracing::debug!(manga_id, "MAL my_list_status PATCH");
        let resp = self
            .http
            .patch(format!("{}/manga/{manga_id}/my_list_status", self.api_url))
            .bearer_auth(token)
            .form(&params)
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let status: MalListStatus = resp
            .json()
            .await
            .map_err(|e| MalError::Parse(e.to_string()))?;

        Ok(Some(status.into_track_entry(manga_id)))
    }
}

fn parse_manga_id(series_id: &str) -> Result<u64, MalError> {
    series_id
        .parse()
        .map_err(|_| MalError::InvalidId(series_id.to_string()))
}

impl TrackerClient for MalClient {
    type Error = MalError;

    fn metadata(&self) -> TrackerMetadata {
        METADATA
    }

    fn auth_url(&self) -> String {
        auth::authorize_url(
            &self.auth_url,
            &self.client_id,
            &self.code_verifier(),
            self.redirect_uri.as_deref(),
        )
    }

    async fn get_token(&self, access_code: &str) -> Result<String, MalError> {
        let code = access_code.trim();
        if code.is_empty() {
            return Err(MalError::CodeExchange("empty authorization code".into()));
        }
        let token_resp = auth::exchange_code(
            &self.http,
            &self.token_url,
            &self.client_id,
            code,
            &self.code_verifier(),
            self.redirect_uri.as_deref(),
        )
        .await?;
        Ok(token_resp.access_token)
    }

    fn set_access_token(&self, token: &str) {
        self.access_token.set(token);
    }

    async fn get_username(&self) -> Result<Option<String>, MalError> {
        let Some(token) = self.access_token.get() else {
            return Ok(None);
        };

        let resp = self
            .http
            .get(format!("{}/users/@me", self.api_url))
            .bearer_auth(token)
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let user: MalUser = resp
            .json()
            .await
            .map_err(|e| MalError::Parse(e.to_string()))?;
        Ok(Some(user.name))
    }

    async fn search(&self, query: &str) -> Result<Vec<TrackerSeries>, MalError> {
        let query: String = query.chars().take(MAX_QUERY_CHARS).collect();

        let req = self
            .http
            .get(format!("{}/manga", self.api_url))
            .query(&[
                ("q", query.as_str()),
                ("limit", "10"),
                ("fields", "id,title,main_picture,synopsis"),
            ]);
        let resp = self.authorize(req).send().await?;

        let resp = Self::check_response(resp).await?;
        let search: MalSearchResponse = resp
            .json()
            .await
            .map_err(|e| MalError::Parse(e.to_string()))?;

        Ok(search
            .data
            .into_iter()
            .map(|n| n.node.into_tracker_series())
            .collect())
    }

    async fn get_library_entry(&self, series_id: &str) -> Result<Option<TrackEntry>, MalError> {
        let manga_id = parse_manga_id(series_id)?;
        let token = self.require_token()?;

        let resp = self
            .http
            .get(format!("{}/manga/{manga_id}", self.api_url))
            .bearer_auth(token)
            .query(&[("fields", "my_list_status")])
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let node: MalMangaNode = resp
            .json()
            .await
            .map_err(|e| MalError::Parse(e.to_string()))?;

        Ok(node.my_list_status.map(|s| s.into_track_entry(node.id)))
    }

    async fn add_library_entry(&self, entry: &TrackEntry) -> Result<Option<TrackEntry>, MalError> {
        self.save_entry(entry).await
    }

    async fn update_library_entry(&self, entry: &TrackEntry) -> Result<Option<TrackEntry>, MalError> {
        self.save_entry(entry).await
    }
}
