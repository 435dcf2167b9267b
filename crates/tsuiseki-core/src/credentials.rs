use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tsuiseki_api::TrackerId;

use crate::error::CoreError;

/// Prefix of the key each tracker's token is stored under.
pub const TOKEN_KEY_PREFIX: &str = "tracker-access-token-";

/// Prefix of the key a pending PKCE verifier is stored under.
pub const VERIFIER_KEY_PREFIX: &str = "tracker-pkce-verifier-";

/// Key-value store holding tracker tokens across restarts.
pub trait CredentialStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn write(&self, key: &str, value: &str) -> Result<(), CoreError>;
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

/// Store key for a tracker's token, e.g. `tracker-access-token-AniList`.
pub fn token_key(tracker: TrackerId) -> String {
    format!("{TOKEN_KEY_PREFIX}{tracker}")
}

/// Store key for the verifier behind a tracker's last auth URL.
pub fn verifier_key(tracker: TrackerId) -> String {
    format!("{VERIFIER_KEY_PREFIX}{tracker}")
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn read(&self, key: &str) -> Result<Option<String>, CoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// Store backed by a TOML table on disk. The whole file is rewritten on each change.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, CoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| CoreError::Credentials(e.to_string()))
    }

    fn store(&self, values: &BTreeMap<String, String>) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string(values).map_err(|e| CoreError::Credentials(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn read(&self, key: &str) -> Result<Option<String>, CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.store(&values)
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.store(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_key() {
        assert_eq!(
            token_key(TrackerId::MyAnimeList),
            "tracker-access-token-MyAnimeList"
        );
        assert_eq!(
            verifier_key(TrackerId::MyAnimeList),
            "tracker-pkce-verifier-MyAnimeList"
        );
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::new();
        store.write("k", "v").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(store.read("k").unwrap().is_none());
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.toml");

        let store = FileCredentialStore::new(&path);
        assert!(store.read("missing").unwrap().is_none());
        store.write(&token_key(TrackerId::AniList), "tok-a").unwrap();
        store.write(&token_key(TrackerId::MangaUpdates), "tok-m").unwrap();

        let reopened = FileCredentialStore::new(&path);
        assert_eq!(
            reopened.read(&token_key(TrackerId::AniList)).unwrap().as_deref(),
            Some("tok-a")
        );

        reopened.remove(&token_key(TrackerId::AniList)).unwrap();
        assert!(store.read(&token_key(TrackerId::AniList)).unwrap().is_none());
        assert_eq!(
            store.read(&token_key(TrackerId::MangaUpdates)).unwrap().as_deref(),
            Some("tok-m")
        );
    }
}
