//! Fetch configuration

use ott_common::{OttError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Fetch Configuration Constants
// ============================================================================

/// Default number of concurrent downloads.
pub const DEFAULT_WORKERS: usize = 1;

/// Default number of attempts per file.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default request timeout in seconds (30 minutes, archives are several hundred MB).
pub const DEFAULT_TIMEOUT_SECS: u64 = 1800;

/// Default base delay between attempts in milliseconds; doubled per attempt.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1000;

/// Default HTTP user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("ott-taxonomy/", env!("CARGO_PKG_VERSION"));

/// Configuration for [`HttpFetcher`](super::HttpFetcher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum concurrent downloads
    pub workers: usize,
    /// Attempts per file before giving up
    pub max_retries: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Base backoff in milliseconds; attempt `n` waits `base * 2^n`
    pub retry_backoff_ms: u64,
    /// HTTP user agent
    pub user_agent: String,
    /// Unpack `.tgz` archives after download
    pub extract_archives: bool,
    /// Show progress bars
    pub verbose: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            extract_archives: true,
            verbose: false,
        }
    }
}

impl FetchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables over the defaults
    ///
    /// - `OTT_FETCH_WORKERS`
    /// - `OTT_FETCH_RETRIES`
    /// - `OTT_FETCH_TIMEOUT_SECS`
    /// - `OTT_FETCH_USER_AGENT`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(workers) = env_number("OTT_FETCH_WORKERS")? {
            config.workers = workers;
        }

        if let Some(retries) = env_number("OTT_FETCH_RETRIES")? {
            config.max_retries = retries;
        }

        if let Some(timeout) = env_number("OTT_FETCH_TIMEOUT_SECS")? {
            config.timeout_secs = timeout;
        }

        if let Ok(agent) = std::env::var("OTT_FETCH_USER_AGENT") {
            config.user_agent = agent;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_retry_backoff_ms(mut self, backoff_ms: u64) -> Self {
        self.retry_backoff_ms = backoff_ms;
        self
    }

    pub fn with_extract_archives(mut self, extract: bool) -> Self {
        self.extract_archives = extract;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Delay before retrying after failed attempt number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(2u64.saturating_pow(attempt)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(OttError::config("workers must be greater than 0"));
        }

        if self.max_retries == 0 {
            return Err(OttError::config("max_retries must be greater than 0"));
        }

        if self.timeout_secs == 0 {
            return Err(OttError::config("timeout_secs must be greater than 0"));
        }

        Ok(())
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| OttError::config(format!("{key} must be a number, got '{value}'"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert_eq!(config.workers, 1);
        assert_eq!(config.max_retries, 3);
        assert!(config.extract_archives);
        assert!(config.user_agent.starts_with("ott-taxonomy/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = FetchConfig::new()
            .with_workers(4)
            .with_max_retries(5)
            .with_timeout(60)
            .with_extract_archives(false)
            .with_verbose(true);

        assert_eq!(config.workers, 4);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout_secs, 60);
        assert!(!config.extract_archives);
        assert!(config.verbose);
    }

    #[test]
    fn test_backoff_doubles() {
        let config = FetchConfig::new().with_retry_backoff_ms(10);
        assert_eq!(config.backoff(1), Duration::from_millis(20));
        assert_eq!(config.backoff(2), Duration::from_millis(40));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(FetchConfig::new().with_workers(0).validate().is_err());
        assert!(FetchConfig::new().with_max_retries(0).validate().is_err());
        assert!(FetchConfig::new().with_timeout(0).validate().is_err());
    }
}
