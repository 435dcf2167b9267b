use std::time::Duration;

use tsuiseki_api::anilist::AniListClient;
use tsuiseki_api::mal::MalClient;
use tsuiseki_api::mangaupdates::MangaUpdatesClient;
use tsuiseki_api::{
    TrackEntry, TrackerClient, TrackerError, TrackerId, TrackerMetadata, TrackerSeries,
};

use crate::config::TrackersConfig;
use crate::error::CoreError;

const USER_AGENT: &str = concat!("tsuiseki/", env!("CARGO_PKG_VERSION"));

/// One client per supported tracker, built once at startup.
pub struct TrackerRegistry {
    anilist: AniListClient,
    mal: MalClient,
    mangaupdates: MangaUpdatesClient,
}

/// A resolved client.
#[derive(Clone, Copy)]
pub enum Tracker<'a> {
    AniList(&'a AniListClient),
    MyAnimeList(&'a MalClient),
    MangaUpdates(&'a MangaUpdatesClient),
}

impl TrackerRegistry {
    pub fn new(anilist: AniListClient, mal: MalClient, mangaupdates: MangaUpdatesClient) -> Self {
        Self {
            anilist,
            mal,
            mangaupdates,
        }
    }

    /// Build every client from config, sharing one HTTP client and its timeout.
    pub fn from_config(config: &TrackersConfig) -> Result<Self, CoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        let mut anilist = AniListClient::new(http.clone(), &config.anilist.client_id)
            .with_api_url(&config.anilist.api_url)
            .with_token_url(&config.anilist.token_url);
        if let (Some(secret), Some(redirect)) =
            (&config.anilist.client_secret, &config.anilist.redirect_uri)
        {
            anilist = anilist.with_client_secret(secret, redirect);
        }

        let mut mal = MalClient::new(http.clone(), &config.mal.client_id)
            .with_api_url(&config.mal.api_url)
            .with_oauth_urls(&config.mal.auth_url, &config.mal.token_url);
        if let Some(redirect) = &config.mal.redirect_uri {
            mal = mal.with_redirect_uri(redirect);
        }

        let mangaupdates = MangaUpdatesClient::new(http).with_api_url(&config.mangaupdates.api_url);

        tracing::debug!(
            timeout_secs = config.request_timeout_secs,
            "tracker registry built"
        );
        Ok(Self::new(anilist, mal, mangaupdates))
    }

    pub fn resolve(&self, id: TrackerId) -> Tracker<'_> {
        match id {
            TrackerId::AniList => Tracker::AniList(&self.anilist),
            TrackerId::MyAnimeList => Tracker::MyAnimeList(&self.mal),
            TrackerId::MangaUpdates => Tracker::MangaUpdates(&self.mangaupdates),
        }
    }

    /// Every tracker, in [`TrackerId::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = Tracker<'_>> + '_ {
        TrackerId::ALL.iter().map(|id| self.resolve(*id))
    }

    pub fn mal(&self) -> &MalClient {
        &self.mal
    }

    pub fn mangaupdates(&self) -> &MangaUpdatesClient {
        &self.mangaupdates
    }
}

/// Forward a call to the concrete client, tagging its error.
macro_rules! dispatch {
    ($tracker:expr, $client:ident => $call:expr) => {
        match $tracker {
            Tracker::AniList($client) => $call.map_err(TrackerError::from),
            Tracker::MyAnimeList($client) => $call.map_err(TrackerError::from),
            Tracker::MangaUpdates($client) => $call.map_err(TrackerError::from),
        }
    };
}

impl Tracker<'_> {
    pub fn id(&self) -> TrackerId {
        self.metadata().id
    }
}

impl TrackerClient for Tracker<'_> {
    type Error = TrackerError;

    fn metadata(&self) -> TrackerMetadata {
        match self {
            Tracker::AniList(c) => c.metadata(),
            Tracker::MyAnimeList(c) => c.metadata(),
            Tracker::MangaUpdates(c) => c.metadata(),
        }
    }

    fn auth_url(&self) -> String {
        match self {
            Tracker::AniList(c) => c.auth_url(),
            Tracker::MyAnimeList(c) => c.auth_url(),
            Tracker::MangaUpdates(c) => c.auth_url(),
        }
    }

    async fn get_token(&self, access_code: &str) -> Result<String, TrackerError> {
        dispatch!(self, c => c.get_token(access_code).await)
    }

    fn set_access_token(&self, token: &str) {
        match self {
            Tracker::AniList(c) => c.set_access_token(token),
            Tracker::MyAnimeList(c) => c.set_access_token(token),
            Tracker::MangaUpdates(c) => c.set_access_token(token),
        }
    }

    async fn get_username(&self) -> Result<Option<String>, TrackerError> {
        dispatch!(self, c => c.get_username().await)
    }

    async fn search(&self, query: &str) -> Result<Vec<TrackerSeries>, TrackerError> {
        dispatch!(self, c => c.search(query).await)
    }

    async fn get_library_entry(&self, series_id: &str) -> Result<Option<TrackEntry>, TrackerError> {
        dispatch!(self, c => c.get_library_entry(series_id).await)
    }

    async fn add_library_entry(&self, entry: &TrackEntry) -> Result<Option<TrackEntry>, TrackerError> {
        dispatch!(self, c => c.add_library_entry(entry).await)
    }

    async fn update_library_entry(
        &self,
        entry: &TrackEntry,
    ) -> Result<Option<TrackEntry>, TrackerError> {
        dispatch!(self, c => c.update_library_entry(entry).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_resolve_is_total() {
        let registry = TrackerRegistry::from_config(&AppConfig::default().trackers).unwrap();
        for id in TrackerId::ALL {
            assert_eq!(registry.resolve(*id).id(), *id);
        }
    }

    #[test]
    fn test_iter_order() {
        let registry = TrackerRegistry::from_config(&AppConfig::default().trackers).unwrap();
        let names: Vec<_> = registry.iter().map(|t| t.metadata().name).collect();
        assert_eq!(names, ["AniList", "MyAnimeList", "MangaUpdates"]);
    }
}
