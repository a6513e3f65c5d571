//! Configuration module for environment variables and client settings

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;

use crate::policy::{CachePolicy, RetryPolicy};

/// Default API endpoint of the marketplace backend
pub const DEFAULT_API_URL: &str = "https://api.igame.ml";

/// Global client configuration loaded from environment variables
pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL every API path is joined onto
    pub api_url: url::Url,

    /// Fixed per-request timeout of the HTTP client
    pub timeout: Duration,

    /// Where the token store persists its values
    pub token_file: PathBuf,

    /// Retry policy for queries and mutations
    pub retry: RetryPolicy,

    /// Freshness and eviction windows of the query cache
    pub cache: CachePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: url::Url::parse(DEFAULT_API_URL).expect("default API url is valid"),
            timeout: Duration::from_millis(8000),
            token_file: PathBuf::from(".igame-tokens.json"),
            retry: RetryPolicy::default(),
            cache: CachePolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api_url = match env::var("IGAME_API_URL") {
            Ok(raw) => url::Url::parse(&raw)
                .map_err(|e| anyhow!("IGAME_API_URL is not a valid url: {}", e))?,
            Err(_) => defaults.api_url,
        };

        Ok(Self {
            api_url,

            timeout: Duration::from_millis(
                env::var("IGAME_TIMEOUT_MS")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .unwrap_or(8000),
            ),

            token_file: env::var("IGAME_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.token_file),

            retry: RetryPolicy {
                max_attempts: env::var("IGAME_RETRY_ATTEMPTS")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .unwrap_or(3),
                ..defaults.retry
            },

            cache: CachePolicy {
                stale_time: Duration::from_secs(
                    env::var("IGAME_STALE_SECS")
                        .unwrap_or_else(|_| "300".to_string())
                        .parse()
                        .unwrap_or(300),
                ),
                cache_time: Duration::from_secs(
                    env::var("IGAME_CACHE_SECS")
                        .unwrap_or_else(|_| "3600".to_string())
                        .parse()
                        .unwrap_or(3600),
                ),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend() {
        let config = Config::default();
        assert_eq!(config.api_url.as_str(), "https://api.igame.ml/");
        assert_eq!(config.timeout, Duration::from_secs(8));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.cache.stale_time, Duration::from_secs(5 * 60));
        assert_eq!(config.cache.cache_time, Duration::from_secs(60 * 60));
    }
}
