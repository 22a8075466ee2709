//! Runtime configuration.
//!
//! Read from `config.toml` in the data directory, then overridden by
//! environment variables. Every field has a default so a missing file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const API_KEY_ENV: &str = "REELSIFY_FIREBASE_API_KEY";
pub const DATA_PATH_ENV: &str = "REELSIFY_PATH";

/// Resolve the data directory.
///
/// 1. `$REELSIFY_PATH` if set
/// 2. `~/.reelsify`
/// 3. `./.reelsify`
pub fn default_data_path() -> PathBuf {
    std::env::var(DATA_PATH_ENV)
        .ok()
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".reelsify")))
        .unwrap_or_else(|| PathBuf::from(".reelsify"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Web API key of the Firebase project. Without one, accounts are kept
    /// in-process only.
    pub firebase_api_key: Option<String>,
    /// Alternate Identity Toolkit endpoint (the auth emulator, for instance).
    pub firebase_endpoint: Option<String>,
    /// JSON list of reels to show instead of the bundled one.
    pub feed_path: Option<PathBuf>,
    pub splash_ms: u64,
    pub window_width: f32,
    pub window_height: f32,

    #[serde(skip)]
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            firebase_api_key: None,
            firebase_endpoint: None,
            feed_path: None,
            splash_ms: 5000,
            window_width: 390.0,
            window_height: 844.0,
            data_dir: PathBuf::from(".reelsify"),
        }
    }
}

impl Config {
    /// Load from the default location. Problems are logged and defaults used.
    pub fn load() -> Self {
        let data_dir = default_data_path();
        let mut config = match Config::from_file(&data_dir.join("config.toml")) {
            Ok(Some(config)) => config,
            Ok(None) => {
                log::debug!("No config file in {}, using defaults", data_dir.display());
                Config::default()
            }
            Err(e) => {
                log::error!("{}; using defaults", e);
                Config::default()
            }
        };
        config.data_dir = data_dir;
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Parse `path`. `Ok(None)` when the file does not exist.
    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.firebase_api_key = Some(key);
        }
    }

    pub fn splash_duration(&self) -> Duration {
        Duration::from_millis(self.splash_ms)
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::from_file(&dir.path().join("config.toml")).unwrap().is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "firebase_api_key = \"abc\"\nsplash_ms = 1500\n").unwrap();

        let config = Config::from_file(&path).unwrap().unwrap();
        assert_eq!(config.firebase_api_key.as_deref(), Some("abc"));
        assert_eq!(config.splash_duration(), Duration::from_millis(1500));
        assert_eq!(config.window_height, 844.0);
        assert_eq!(config.feed_path, None);
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "splash_ms = \"soon\"").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn env_key_overrides_file_but_blank_does_not() {
        let mut config = Config {
            firebase_api_key: Some("from-file".to_string()),
            ..Config::default()
        };
        config.apply_env(|_| Some("   ".to_string()));
        assert_eq!(config.firebase_api_key.as_deref(), Some("from-file"));

        config.apply_env(|key| (key == API_KEY_ENV).then(|| "from-env".to_string()));
        assert_eq!(config.firebase_api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn session_lives_in_data_dir() {
        let config = Config {
            data_dir: PathBuf::from("/tmp/reelsify-test"),
            ..Config::default()
        };
        assert_eq!(config.session_path(), PathBuf::from("/tmp/reelsify-test/session.json"));
    }
}
