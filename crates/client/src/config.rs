//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ATELIER_API_URL` - Base URL of the REST backend (e.g. `https://api.example.com/api`)
//!
//! ## Optional
//! - `ATELIER_TOKEN_FILE` - Where the session tokens are persisted
//!   (default: `tokens.json` in the platform config directory, `:memory:` keeps them in memory)
//! - `ATELIER_REFRESH_INTERVAL_SECS` - Seconds between token refreshes (default: 840)
//! - `ATELIER_ENV` - `development` or `production` (default: production)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::logging::RunMode;

/// Access tokens expire after 15 minutes; refresh one minute early.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 14 * 60;

/// `ATELIER_TOKEN_FILE` value selecting the in-memory token store.
pub const MEMORY_TOKEN_STORE: &str = ":memory:";

const TOKEN_FILE_NAME: &str = "tokens.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where the session tokens live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStorage {
    /// JSON file shared by every process of the same user.
    File(PathBuf),
    /// Process-local; the session ends with the process.
    Memory,
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every API path is appended to
    pub api_url: Url,
    /// Token persistence
    pub token_storage: TokenStorage,
    /// Period of the background token refresh
    pub refresh_interval: Duration,
    /// Controls diagnostic output
    pub mode: RunMode,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the API URL.
    ///
    /// Tokens are kept in memory.
    #[must_use]
    pub const fn new(api_url: Url) -> Self {
        Self {
            api_url,
            token_storage: TokenStorage::Memory,
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            mode: RunMode::Production,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Loads `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if `ATELIER_API_URL` is missing or any variable is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `ATELIER_API_URL` is missing or any variable is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = get_required_env(&lookup, "ATELIER_API_URL")?;
        let api_url = parse_api_url(&raw_url)?;

        let token_storage = match get_optional_env(&lookup, "ATELIER_TOKEN_FILE") {
            Some(value) if value == MEMORY_TOKEN_STORE => TokenStorage::Memory,
            Some(path) => TokenStorage::File(PathBuf::from(path)),
            None => TokenStorage::File(default_token_path()?),
        };

        let interval = get_env_or_default(
            &lookup,
            "ATELIER_REFRESH_INTERVAL_SECS",
            &DEFAULT_REFRESH_INTERVAL_SECS.to_string(),
        );
        let refresh_interval = match interval.parse::<u64>() {
            Ok(0) | Err(_) => {
                return Err(ConfigError::InvalidEnvVar(
                    "ATELIER_REFRESH_INTERVAL_SECS".to_string(),
                    "must be a positive number of seconds".to_string(),
                ));
            }
            Ok(secs) => Duration::from_secs(secs),
        };

        let mode = get_env_or_default(&lookup, "ATELIER_ENV", "production")
            .parse::<RunMode>()
            .map_err(|e| ConfigError::InvalidEnvVar("ATELIER_ENV".to_string(), e))?;

        Ok(Self {
            api_url,
            token_storage,
            refresh_interval,
            mode,
        })
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        ConfigError::InvalidEnvVar("ATELIER_API_URL".to_string(), e.to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "ATELIER_API_URL".to_string(),
            "must be an http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

fn default_token_path() -> Result<PathBuf, ConfigError> {
    directories::ProjectDirs::from("studio", "Atelier", "atelier")
        .map(|dirs| dirs.config_dir().join(TOKEN_FILE_NAME))
        .ok_or_else(|| ConfigError::MissingEnvVar("ATELIER_TOKEN_FILE".to_string()))
}

/// Get a required environment variable.
fn get_required_env<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    get_optional_env(lookup, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_missing_api_url_fails_fast() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "ATELIER_API_URL"));
    }

    #[test]
    fn test_invalid_api_url() {
        assert!(matches!(
            load(&[("ATELIER_API_URL", "not a url")]),
            Err(ConfigError::InvalidEnvVar(..))
        ));
        assert!(matches!(
            load(&[("ATELIER_API_URL", "ftp://files.example.com")]),
            Err(ConfigError::InvalidEnvVar(..))
        ));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("ATELIER_API_URL", "https://api.example.com/api"),
            ("ATELIER_TOKEN_FILE", "/tmp/atelier/tokens.json"),
        ])
        .unwrap();
        assert_eq!(config.api_url.as_str(), "https://api.example.com/api");
        assert_eq!(config.refresh_interval, Duration::from_secs(840));
        assert_eq!(config.mode, RunMode::Production);
        assert_eq!(
            config.token_storage,
            TokenStorage::File(PathBuf::from("/tmp/atelier/tokens.json"))
        );
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ATELIER_API_URL", "http://localhost:5000/api"),
            ("ATELIER_TOKEN_FILE", ":memory:"),
            ("ATELIER_REFRESH_INTERVAL_SECS", "60"),
            ("ATELIER_ENV", "development"),
        ])
        .unwrap();
        assert_eq!(config.token_storage, TokenStorage::Memory);
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.mode, RunMode::Development);
    }

    #[test]
    fn test_zero_refresh_interval_rejected() {
        let err = load(&[
            ("ATELIER_API_URL", "http://localhost:5000/api"),
            ("ATELIER_TOKEN_FILE", ":memory:"),
            ("ATELIER_REFRESH_INTERVAL_SECS", "0"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("ATELIER_REFRESH_INTERVAL_SECS"));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(
            load(&[
                ("ATELIER_API_URL", "http://localhost:5000/api"),
                ("ATELIER_TOKEN_FILE", ":memory:"),
                ("ATELIER_ENV", "staging"),
            ])
            .is_err()
        );
    }
}
