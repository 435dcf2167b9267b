use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
    pub trackers: TrackersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub tracker_auto_update: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Also write a daily rolling log file to the data directory.
    pub file: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackersConfig {
    pub request_timeout_secs: u64,
    pub anilist: AniListConfig,
    pub mal: MalConfig,
    pub mangaupdates: MangaUpdatesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AniListConfig {
    pub client_id: String,
    /// With a secret and redirect URI the code grant replaces the implicit grant.
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub api_url: String,
    pub token_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MalConfig {
    pub client_id: String,
    pub redirect_uri: Option<String>,
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MangaUpdatesConfig {
    pub api_url: String,
}

impl AppConfig {
    /// Load config: user file (if exists), otherwise built-in defaults.
    pub fn load() -> Result<Self, CoreError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            Self::load_from(&user_path)
        } else {
            toml::from_str(DEFAULT_CONFIG).map_err(|e| CoreError::Config(e.to_string()))
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        let user_str = std::fs::read_to_string(path)?;
        toml::from_str(&user_str).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), CoreError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the persisted tracker tokens.
    pub fn credentials_path() -> PathBuf {
        Self::data_dir().join("credentials.toml")
    }

    /// Directory for rolling log files.
    pub fn log_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }

    fn data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "tsuiseki")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = AppConfig::default();
        assert!(config.general.tracker_auto_update);
        assert_eq!(config.trackers.request_timeout_secs, 15);
        assert_eq!(config.trackers.mal.api_url, "https://api.myanimelist.net/v2");
        assert!(config.trackers.anilist.client_secret.is_none());
        assert!(!config.logging.file);
    }

    #[test]
    fn test_roundtrip() {
        let config = AppConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(
            deserialized.trackers.mangaupdates.api_url,
            config.trackers.mangaupdates.api_url
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = AppConfig::default();
        config.trackers.mal.client_id = "abc123".into();
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.trackers.mal.client_id, "abc123");
    }
}
