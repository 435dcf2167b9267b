use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tsuiseki_api::TrackerId;

/// Remote series id of a local series on each tracker. An empty id means unlinked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackerKeys(BTreeMap<TrackerId, String>);

impl TrackerKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// The linked remote id, if any.
    pub fn get(&self, tracker: TrackerId) -> Option<&str> {
        self.0
            .get(&tracker)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn link(&mut self, tracker: TrackerId, series_id: impl Into<String>) {
        self.0.insert(tracker, series_id.into());
    }

    pub fn unlink(&mut self, tracker: TrackerId) {
        self.0.insert(tracker, String::new());
    }

    /// Linked trackers with their remote ids.
    pub fn linked(&self) -> impl Iterator<Item = (TrackerId, &str)> + '_ {
        self.0
            .iter()
            .filter(|(_, id)| !id.is_empty())
            .map(|(tracker, id)| (*tracker, id.as_str()))
    }
}

impl FromIterator<(TrackerId, String)> for TrackerKeys {
    fn from_iter<I: IntoIterator<Item = (TrackerId, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_id_is_unlinked() {
        let mut keys = TrackerKeys::new();
        keys.link(TrackerId::AniList, "30013");
        keys.link(TrackerId::MangaUpdates, "");
        assert_eq!(keys.get(TrackerId::AniList), Some("30013"));
        assert_eq!(keys.get(TrackerId::MangaUpdates), None);
        assert_eq!(keys.linked().count(), 1);

        keys.unlink(TrackerId::AniList);
        assert_eq!(keys.get(TrackerId::AniList), None);
        assert_eq!(keys.linked().count(), 0);
    }

    #[test]
    fn test_json_shape() {
        let keys: TrackerKeys =
            serde_json::from_str(r#"{"MyAnimeList": "2", "AniList": ""}"#).unwrap();
        assert_eq!(keys.get(TrackerId::MyAnimeList), Some("2"));
        assert_eq!(
            serde_json::to_string(&keys).unwrap(),
            r#"{"AniList":"","MyAnimeList":"2"}"#
        );
    }
}
