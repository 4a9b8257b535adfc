//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `TEAMALL_API_BASE_URL` - Backend base address (default: `http://localhost:8080/api`)
//! - `TEAMALL_TIMEOUT_SECS` - Request timeout in seconds (default: 15)
//! - `TEAMALL_STORE_PATH` - File backing the persistent store (default: `.teamall/storage.json`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_STORE_PATH: &str = ".teamall/storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),

    #[error("Invalid {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address every API path is appended to
    pub base_url: Url,
    /// Upper bound on a request's lifetime
    pub timeout: Duration,
    /// Location of the file-backed persistent store
    pub store_path: PathBuf,
}

impl ClientConfig {
    /// Build a configuration for `base_url` with default timeout and store path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)
                .map_err(|reason| ConfigError::InvalidValue("base_url", reason))?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url(&get_env_or_default("TEAMALL_API_BASE_URL", DEFAULT_BASE_URL))
            .map_err(|reason| ConfigError::InvalidEnvVar("TEAMALL_API_BASE_URL".to_string(), reason))?;
        let timeout = parse_timeout(
            "TEAMALL_TIMEOUT_SECS",
            &get_env_or_default("TEAMALL_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string()),
        )?;
        let store_path = PathBuf::from(get_env_or_default("TEAMALL_STORE_PATH", DEFAULT_STORE_PATH));

        Ok(Self {
            base_url,
            timeout,
            store_path,
        })
    }

    /// Replace the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the store path.
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse and validate the API base URL.
fn parse_base_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    Ok(url)
}

/// Parse a positive timeout in whole seconds.
fn parse_timeout(var_name: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be at least 1 second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = ClientConfig::new("http://shop.example:8080/api").unwrap();
        assert_eq!(config.base_url.as_str(), "http://shop.example:8080/api");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.store_path, PathBuf::from(".teamall/storage.json"));
    }

    #[test]
    fn test_base_url_rejects_other_schemes() {
        let err = ClientConfig::new("ftp://shop.example/api").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("base_url", _)));
        assert_eq!(
            err.to_string(),
            "Invalid base_url: unsupported scheme 'ftp'"
        );
        assert!(ClientConfig::new("not a url").is_err());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("T", "30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_timeout("T", " 5 ").unwrap(), Duration::from_secs(5));
        assert!(parse_timeout("T", "0").is_err());
        assert!(parse_timeout("T", "-1").is_err());
        assert!(parse_timeout("T", "soon").is_err());
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::new("https://shop.example/api")
            .unwrap()
            .with_timeout(Duration::from_secs(3))
            .with_store_path("/tmp/teamall.json");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.store_path, PathBuf::from("/tmp/teamall.json"));
    }
}
