//! Client configuration.
//!
//! Loaded from `~/.stellecta/config.toml` when present. Every key is
//! optional; `STELLECTA_API_URL` and command-line flags override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Directory under the home directory holding config and tokens.
pub const APP_DIR: &str = ".stellecta";
const CONFIG_FILE: &str = "config.toml";
const TOKEN_FILE: &str = "tokens.json";

pub const API_URL_ENV: &str = "STELLECTA_API_URL";
const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
const DEFAULT_SESSION_LIMIT: usize = 20;
const DEFAULT_XP_NOTIFICATION_SECS: u64 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not find home directory")]
    NoHomeDir,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk shape. Absent keys fall back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    api_base_url: Option<String>,
    token_path: Option<PathBuf>,
    session_limit: Option<usize>,
    xp_notification_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL every API path is joined onto (no trailing slash).
    pub api_base_url: String,
    /// Where access and refresh tokens are persisted.
    pub token_path: PathBuf,
    /// Default number of sessions fetched for the sidebar.
    pub session_limit: usize,
    /// How long an XP notification stays visible.
    pub xp_notification: Duration,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from the default location, applying env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let dir = app_dir()?;
        let mut config = Self::load_from(&dir.join(CONFIG_FILE), &dir)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.set_api_base_url(&url);
        }
        Ok(config)
    }

    /// Load from an explicit file. A missing file yields defaults rooted at `dir`.
    pub fn load_from(path: &Path, dir: &Path) -> Result<Self, ConfigError> {
        let file = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            ConfigFile::default()
        };

        let mut config = Self::defaults_in(dir);
        if let Some(url) = file.api_base_url {
            config.set_api_base_url(&url);
        }
        if let Some(token_path) = file.token_path {
            config.token_path = token_path;
        }
        if let Some(limit) = file.session_limit {
            config.session_limit = limit;
        }
        if let Some(secs) = file.xp_notification_secs {
            config.xp_notification = Duration::from_secs(secs);
        }
        config.request_timeout = file.request_timeout_secs.map(Duration::from_secs);
        Ok(config)
    }

    /// Defaults with token storage under `dir`.
    pub fn defaults_in(dir: &Path) -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            token_path: dir.join(TOKEN_FILE),
            session_limit: DEFAULT_SESSION_LIMIT,
            xp_notification: Duration::from_secs(DEFAULT_XP_NOTIFICATION_SECS),
            request_timeout: None,
        }
    }

    pub fn set_api_base_url(&mut self, url: &str) {
        self.api_base_url = url.trim_end_matches('/').to_string();
    }
}

/// `~/.stellecta`
pub fn app_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(APP_DIR))
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml"), dir.path()).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.session_limit, 20);
        assert_eq!(config.token_path, dir.path().join(TOKEN_FILE));
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "api_base_url = \"https://api.example.com/v1/\"\nsession_limit = 5\nxp_notification_secs = 10\nrequest_timeout_secs = 30\n",
        )
        .unwrap();

        let config = Config::load_from(&path, dir.path()).unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com/v1");
        assert_eq!(config.session_limit, 5);
        assert_eq!(config.xp_notification, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "colour = \"blue\"\n").unwrap();

        let err = Config::load_from(&path, dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
