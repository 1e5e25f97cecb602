//! Client configuration.
//!
//! The API base URL and request timeout come from the environment
//! (`ENVERS_API_URL`, `ENVERS_TIMEOUT_SECS`) with compiled defaults.
//! Loading a `.env` file first is the embedding application's job.

use std::time::Duration;

/// Default base URL for the Envers backend
const DEFAULT_API_URL: &str = "https://api.envers.app";

/// HTTP request timeout in seconds.
/// 20s allows for slow mobile networks while failing fast enough that a
/// screen is never stuck on a spinner indefinitely.
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Environment variable overriding the API base URL
const API_URL_ENV: &str = "ENVERS_API_URL";

/// Environment variable overriding the request timeout (seconds)
const TIMEOUT_ENV: &str = "ENVERS_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl Config {
    /// Build a config for the given base URL with the default timeout.
    /// A trailing slash on the base URL is stripped so endpoint paths can
    /// always be joined with a leading slash.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let mut url = api_base_url.into();
        while url.ends_with('/') {
            url.pop();
        }
        Self {
            api_base_url: url,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read the config from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = Self::new(url);
        if let Some(timeout) = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|raw| parse_timeout(&raw))
        {
            config.request_timeout = timeout;
        }
        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Parse a timeout override. Unparseable or zero values are ignored; a
/// zero-second timeout would fail every request instantly.
fn parse_timeout(raw: &str) -> Option<Duration> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_stripped() {
        let config = Config::new("https://example.com/");
        assert_eq!(config.api_base_url, "https://example.com");

        let config = Config::new("https://example.com///");
        assert_eq!(config.api_base_url, "https://example.com");
    }

    #[test]
    fn test_default_timeout_is_finite() {
        let config = Config::default();
        assert_eq!(config.request_timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_timeout_override_rejects_zero_and_garbage() {
        assert_eq!(parse_timeout("45"), Some(Duration::from_secs(45)));
        assert_eq!(parse_timeout("0"), None);
        assert_eq!(parse_timeout("fast"), None);
        assert_eq!(parse_timeout(""), None);
        assert_eq!(parse_timeout("-5"), None);
    }
}
