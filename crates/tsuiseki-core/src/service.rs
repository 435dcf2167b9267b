use std::collections::BTreeMap;

use futures::future::join_all;
use serde::Serialize;
use tsuiseki_api::{
    ScoreError, ScoreFormat, TrackEntry, TrackEntryDraft, TrackerClient, TrackerId, TrackerMetadata,
    TrackerSeries,
};

use crate::config::TrackersConfig;
use crate::credentials::{token_key, verifier_key, CredentialStore};
use crate::error::{CoreError, ServiceError};
use crate::keys::TrackerKeys;
use crate::registry::TrackerRegistry;

/// What [`TrackerService::push_progress`] did on one tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "entry", rename_all = "snake_case")]
pub enum PushOutcome {
    Added(Option<TrackEntry>),
    Updated(Option<TrackEntry>),
    /// Remote progress was already at or past the pushed value.
    UpToDate,
    Failed,
}

/// Tracker-agnostic entry point used by the host.
///
/// Client failures are logged and surface as `None` or an empty list. Nothing
/// is cached; each call goes to the tracker.
pub struct TrackerService {
    registry: TrackerRegistry,
}

impl TrackerService {
    pub fn new(registry: TrackerRegistry) -> Self {
        Self { registry }
    }

    pub fn from_config(config: &TrackersConfig) -> Result<Self, CoreError> {
        TrackerRegistry::from_config(config).map(Self::new)
    }

    pub fn registry(&self) -> &TrackerRegistry {
        &self.registry
    }

    // ── Discovery ─────────────────────────────────────────────────

    pub fn metadata(&self, tracker: TrackerId) -> TrackerMetadata {
        self.registry.resolve(tracker).metadata()
    }

    pub fn get_all(&self) -> Vec<TrackerMetadata> {
        self.registry.iter().map(|t| t.metadata()).collect()
    }

    pub fn get_auth_urls(&self) -> BTreeMap<TrackerId, String> {
        self.registry.iter().map(|t| (t.id(), t.auth_url())).collect()
    }

    // ── Sessions ──────────────────────────────────────────────────

    pub async fn get_token(&self, tracker: TrackerId, access_code: &str) -> Option<String> {
        tracing::info!(tracker = %tracker, "exchanging access code");
        match self.registry.resolve(tracker).get_token(access_code).await {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(tracker = %tracker, error = %e, "token exchange failed");
                None
            }
        }
    }

    pub fn set_access_token(&self, tracker: TrackerId, token: &str) {
        tracing::info!(tracker = %tracker, "setting access token");
        self.registry.resolve(tracker).set_access_token(token);
    }

    /// Persist what a later process needs to finish a sign-in started from
    /// [`get_auth_urls`](Self::get_auth_urls): the MyAnimeList PKCE verifier.
    pub fn save_auth_state(&self, store: &dyn CredentialStore) -> Result<(), CoreError> {
        let verifier = self.registry.mal().code_verifier();
        store.write(&verifier_key(TrackerId::MyAnimeList), &verifier)?;
        tracing::debug!("saved pending PKCE verifier");
        Ok(())
    }

    /// Inject every persisted token and any pending PKCE verifier.
    /// Returns the trackers that got a token.
    pub fn restore_sessions(
        &self,
        store: &dyn CredentialStore,
    ) -> Result<Vec<TrackerId>, CoreError> {
        if let Some(verifier) = store.read(&verifier_key(TrackerId::MyAnimeList))? {
            self.registry.mal().set_code_verifier(&verifier);
        }

        let mut restored = Vec::new();
        for tracker in self.registry.iter() {
            let id = tracker.id();
            if let Some(token) = store.read(&token_key(id))?.filter(|t| !t.is_empty()) {
                tracker.set_access_token(&token);
                restored.push(id);
            }
        }
        tracing::info!(count = restored.len(), "restored tracker sessions");
        Ok(restored)
    }

    /// Exchange `access_code`, then persist and inject the token.
    /// `Ok(false)` when the tracker rejected the code.
    pub async fn login(
        &self,
        tracker: TrackerId,
        access_code: &str,
        store: &dyn CredentialStore,
    ) -> Result<bool, CoreError> {
        let Some(token) = self.get_token(tracker, access_code).await else {
            return Ok(false);
        };
        store.write(&token_key(tracker), &token)?;
        // A verifier is single use.
        store.remove(&verifier_key(tracker))?;
        self.registry.resolve(tracker).set_access_token(&token);
        tracing::info!(tracker = %tracker, "logged in");
        Ok(true)
    }

    pub fn logout(&self, tracker: TrackerId, store: &dyn CredentialStore) -> Result<(), CoreError> {
        tracing::info!(tracker = %tracker, "logging out");
        store.remove(&token_key(tracker))?;
        self.registry.resolve(tracker).set_access_token("");
        Ok(())
    }

    pub async fn get_username(&self, tracker: TrackerId) -> Option<String> {
        tracing::info!(tracker = %tracker, "fetching username");
        match self.registry.resolve(tracker).get_username().await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(tracker = %tracker, error = %e, "username lookup failed");
                None
            }
        }
    }

    // ── Catalog and library ───────────────────────────────────────

    pub async fn search(&self, tracker: TrackerId, query: &str) -> Vec<TrackerSeries> {
        tracing::info!(tracker = %tracker, query, "searching");
        match self.registry.resolve(tracker).search(query).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(tracker = %tracker, query, error = %e, "search failed");
                Vec::new()
            }
        }
    }

    pub async fn get_library_entry(&self, tracker: TrackerId, series_id: &str) -> Option<TrackEntry> {
        tracing::info!(tracker = %tracker, series_id, "fetching library entry");
        match self.registry.resolve(tracker).get_library_entry(series_id).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(tracker = %tracker, series_id, error = %e, "library entry lookup failed");
                None
            }
        }
    }

    /// The remote entry, or the entry a linked series starts from.
    pub async fn entry_or_default(&self, tracker: TrackerId, series_id: &str) -> TrackEntry {
        self.get_library_entry(tracker, series_id)
            .await
            .unwrap_or_else(|| TrackEntry {
                score_format: self.metadata(tracker).score_format,
                ..TrackEntry::new(series_id)
            })
    }

    /// Add an entry, defaulting progress to 0 and status to Reading.
    pub async fn add_library_entry(
        &self,
        tracker: TrackerId,
        draft: TrackEntryDraft,
    ) -> Result<Option<TrackEntry>, ServiceError> {
        let entry = draft.into_entry();
        tracing::info!(
            tracker = %tracker,
            series_id = %entry.series_id,
            status = %entry.status,
            progress = entry.progress,
            "adding library entry"
        );
        validate_score(&entry, self.metadata(tracker).score_format)?;

        match self.registry.resolve(tracker).add_library_entry(&entry).await {
            Ok(saved) => Ok(saved),
            Err(e) => {
                tracing::warn!(tracker = %tracker, series_id = %entry.series_id, error = %e, "add failed");
                Ok(None)
            }
        }
    }

    pub async fn update_library_entry(
        &self,
        tracker: TrackerId,
        entry: TrackEntry,
    ) -> Result<Option<TrackEntry>, ServiceError> {
        tracing::info!(
            tracker = %tracker,
            series_id = %entry.series_id,
            status = %entry.status,
            progress = entry.progress,
            "updating library entry"
        );
        validate_score(&entry, self.metadata(tracker).score_format)?;

        match self.registry.resolve(tracker).update_library_entry(&entry).await {
            Ok(saved) => Ok(saved),
            Err(e) => {
                tracing::warn!(tracker = %tracker, series_id = %entry.series_id, error = %e, "update failed");
                Ok(None)
            }
        }
    }

    // ── Progress sync ─────────────────────────────────────────────

    /// Push `progress` to every linked tracker concurrently.
    ///
    /// Absent entries are added; entries behind `progress` are updated.
    /// Remote progress is never lowered. A tracker whose entry cannot be read
    /// is skipped rather than risking a duplicate add.
    pub async fn push_progress(
        &self,
        keys: &TrackerKeys,
        progress: u32,
    ) -> Vec<(TrackerId, PushOutcome)> {
        let pushes = keys.linked().map(|(tracker, series_id)| async move {
            (tracker, self.push_one(tracker, series_id, progress).await)
        });
        join_all(pushes).await
    }

    async fn push_one(&self, tracker: TrackerId, series_id: &str, progress: u32) -> PushOutcome {
        let client = self.registry.resolve(tracker);
        tracing::info!(tracker = %tracker, series_id, progress, "pushing progress");

        let existing = match client.get_library_entry(series_id).await {
            Ok(existing) => existing,
            Err(e) => {
                tracing::warn!(tracker = %tracker, series_id, error = %e, "progress push skipped");
                return PushOutcome::Failed;
            }
        };

        let result = match existing {
            None => {
                let mut entry = TrackEntry::new(series_id);
                entry.progress = progress;
                client.add_library_entry(&entry).await.map(PushOutcome::Added)
            }
            Some(mut entry) if entry.progress < progress => {
                entry.progress = progress;
                client.update_library_entry(&entry).await.map(PushOutcome::Updated)
            }
            Some(_) => Ok(PushOutcome::UpToDate),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(tracker = %tracker, series_id, error = %e, "progress push failed");
            PushOutcome::Failed
        })
    }
}

/// Reject a bad score before any request is made. Trackers with a fixed
/// format check against it; the others use the entry's own format.
fn validate_score(entry: &TrackEntry, fixed: Option<ScoreFormat>) -> Result<(), ScoreError> {
    let Some(score) = entry.score else {
        return Ok(());
    };
    let result = match fixed {
        Some(format) => format.check(entry.score_format, score),
        None => entry.effective_score_format().check(None, score),
    };
    if let Err(e) = &result {
        tracing::warn!(series_id = %entry.series_id, score, error = %e, "score rejected");
    }
    result
}
