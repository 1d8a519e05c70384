//! Configuration system (layered: code > env > config file).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::ApiError;

const API_MEDIA_SUFFIX: &str = "/api/media";
const API_USERS_SUFFIX: &str = "/api/users";
const DEFAULT_YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3/search";

/// Recognised configuration keys, named as they appear in the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ConfigKey {
    ApiUrl,
    AuthUrl,
    ClientId,
    RedirectUri,
    YtApiUrl,
    YtApiKey,
    PlexUrl,
    PlexToken,
}

impl ConfigKey {
    /// Keys whose absence is an unrecoverable startup fault.
    pub fn is_critical(self) -> bool {
        matches!(self, Self::ApiUrl | Self::AuthUrl | Self::ClientId)
    }

    fn is_url(self) -> bool {
        matches!(
            self,
            Self::ApiUrl | Self::AuthUrl | Self::RedirectUri | Self::YtApiUrl | Self::PlexUrl
        )
    }
}

/// YouTube Data API settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YouTubeConfig {
    pub api_url: String,
    pub api_key: String,
}

/// Layered configuration for the SDK.
///
/// Resolution order:
/// 1. Explicit values (`set`)
/// 2. Environment variables (a `.env` file is loaded first when present)
/// 3. The TOML config file (`~/.prasaddys/config.toml` by default)
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    values: Arc<RwLock<HashMap<ConfigKey, String>>>,
}

impl AppConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every layer: the default config file (if it exists), then the
    /// environment on top.
    pub fn load() -> Result<Self, ApiError> {
        let path = default_config_path();
        let config = if path.exists() {
            Self::load_from_path(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file; using environment only");
            Self::new()
        };
        config.merge_from(&Self::from_env());
        Ok(config)
    }

    /// Load from environment variables (`API_URL`, `CLIENT_ID`, ...).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_vars(std::env::vars())
    }

    /// Build from arbitrary `(name, value)` pairs; unknown names are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let config = Self::new();
        for (name, value) in vars {
            if let Ok(key) = ConfigKey::from_str(name.as_ref()) {
                config.set(key, value);
            }
        }
        config
    }

    /// Load a flat TOML table of `KEY = "value"` pairs. Key names are
    /// case-insensitive.
    pub fn load_from_path(path: &Path) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ApiError::Configuration(format!("failed to read {}: {err}", path.display()))
        })?;
        let table: HashMap<String, toml::Value> = toml::from_str(&raw).map_err(|err| {
            ApiError::Configuration(format!("failed to parse {}: {err}", path.display()))
        })?;

        let config = Self::new();
        for (name, value) in table {
            let Ok(key) = ConfigKey::from_str(&name) else {
                tracing::warn!(key = %name, path = %path.display(), "ignoring unknown config key");
                continue;
            };
            match value {
                toml::Value::String(value) => config.set(key, value),
                other => {
                    return Err(ApiError::Configuration(format!(
                        "{key} must be a string, found {}",
                        other.type_str()
                    )))
                }
            }
        }
        Ok(config)
    }

    pub fn set(&self, key: ConfigKey, value: impl Into<String>) {
        let value = value.into();
        let mut values = self
            .values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if value.trim().is_empty() {
            values.remove(&key);
        } else {
            values.insert(key, value.trim().to_string());
        }
    }

    pub fn get(&self, key: ConfigKey) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned()
    }

    /// Copy every value of `other` over this config.
    pub fn merge_from(&self, other: &AppConfig) {
        for key in ConfigKey::iter() {
            if let Some(value) = other.get(key) {
                self.set(key, value);
            }
        }
    }

    /// Check every critical key, plus `REDIRECT_URI` when the interactive
    /// flow will be used. Missing optional keys are logged.
    pub fn validate(&self, require_redirect: bool) -> Result<(), ApiError> {
        for key in ConfigKey::iter().filter(|key| key.is_critical()) {
            self.critical(key)?;
        }
        if require_redirect {
            self.critical(ConfigKey::RedirectUri)?;
        }
        if self.youtube().is_none() {
            tracing::warn!("YT_API_KEY is not set; YouTube search is unavailable");
        }
        if self.get(ConfigKey::PlexUrl).is_none() || self.get(ConfigKey::PlexToken).is_none() {
            tracing::warn!("PLEX_URL/PLEX_TOKEN not set; thumbnails are unavailable");
        }
        Ok(())
    }

    fn critical(&self, key: ConfigKey) -> Result<String, ApiError> {
        let value = self
            .get(key)
            .ok_or_else(|| ApiError::Configuration(format!("missing critical key {key}")))?;
        if key.is_url() {
            reqwest::Url::parse(&value).map_err(|err| {
                ApiError::Configuration(format!("{key} is not a valid URL ({value}): {err}"))
            })?;
        }
        Ok(value)
    }

    pub fn api_url(&self) -> Result<String, ApiError> {
        self.critical(ConfigKey::ApiUrl)
    }

    pub fn auth_url(&self) -> Result<String, ApiError> {
        self.critical(ConfigKey::AuthUrl)
    }

    pub fn client_id(&self) -> Result<String, ApiError> {
        self.critical(ConfigKey::ClientId)
    }

    pub fn redirect_uri(&self) -> Result<String, ApiError> {
        self.critical(ConfigKey::RedirectUri)
    }

    /// The users API lives beside the media API: `/api/media` becomes `/api/users`.
    pub fn users_base_url(&self) -> Result<String, ApiError> {
        let api_url = self.api_url()?;
        let trimmed = api_url.trim_end_matches('/');
        Ok(match trimmed.strip_suffix(API_MEDIA_SUFFIX) {
            Some(prefix) => format!("{prefix}{API_USERS_SUFFIX}"),
            None => trimmed.replace(API_MEDIA_SUFFIX, API_USERS_SUFFIX),
        })
    }

    /// Absolute thumbnail URL on the media server, if it is configured.
    pub fn thumbnail_url(&self, path: &str) -> Option<String> {
        let base = self.get(ConfigKey::PlexUrl)?;
        let token = self.get(ConfigKey::PlexToken)?;
        Some(format!(
            "{}{path}?X-Plex-Token={token}",
            base.trim_end_matches('/')
        ))
    }

    pub fn youtube(&self) -> Option<YouTubeConfig> {
        let api_key = self.get(ConfigKey::YtApiKey)?;
        let api_url = self
            .get(ConfigKey::YtApiUrl)
            .unwrap_or_else(|| DEFAULT_YOUTUBE_API_URL.to_string());
        Some(YouTubeConfig { api_url, api_key })
    }
}

/// `~/.prasaddys/config.toml`
pub fn default_config_path() -> PathBuf {
    prasaddys_home().join("config.toml")
}

/// `~/.prasaddys`, shared by the config file, secure store and cache.
pub fn prasaddys_home() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".prasaddys"))
        .unwrap_or_else(|| PathBuf::from(".prasaddys"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        AppConfig::from_vars(pairs.iter().copied())
    }

    #[test]
    fn keys_parse_case_insensitively() {
        assert_eq!(ConfigKey::from_str("API_URL").unwrap(), ConfigKey::ApiUrl);
        assert_eq!(ConfigKey::from_str("yt_api_key").unwrap(), ConfigKey::YtApiKey);
        assert_eq!(ConfigKey::ClientId.to_string(), "CLIENT_ID");
    }

    #[test]
    fn missing_critical_key_is_configuration_error() {
        let cfg = config(&[("API_URL", "https://media.example.com/api/media")]);
        let err = cfg.validate(false).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(msg) if msg.contains("AUTH_URL")));
    }

    #[test]
    fn invalid_url_is_configuration_error() {
        let cfg = config(&[("API_URL", "not a url")]);
        assert!(matches!(cfg.api_url(), Err(ApiError::Configuration(_))));
    }

    #[test]
    fn users_base_url_swaps_media_suffix() {
        let cfg = config(&[("API_URL", "https://host.example.com/api/media/")]);
        assert_eq!(
            cfg.users_base_url().unwrap(),
            "https://host.example.com/api/users"
        );
    }

    #[test]
    fn optional_features_degrade_to_none() {
        let cfg = config(&[]);
        assert!(cfg.youtube().is_none());
        assert!(cfg.thumbnail_url("/library/1/thumb").is_none());
    }

    #[test]
    fn thumbnail_url_appends_token() {
        let cfg = config(&[("PLEX_URL", "http://plex.local:32400/"), ("PLEX_TOKEN", "tok")]);
        assert_eq!(
            cfg.thumbnail_url("/library/1/thumb").as_deref(),
            Some("http://plex.local:32400/library/1/thumb?X-Plex-Token=tok")
        );
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let cfg = config(&[("CLIENT_ID", "  ")]);
        assert!(cfg.get(ConfigKey::ClientId).is_none());
    }
}
