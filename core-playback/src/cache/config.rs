//! Cache configuration

use std::time::Duration;

/// Configuration for the audio cache manager.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Base directory for cache files (relative to the platform cache dir)
    pub cache_directory: String,

    /// Download timeout for an individual attempt (default: 30s)
    pub download_timeout: Duration,

    /// Download attempts before surfacing a failure (default: 3)
    pub max_retry_attempts: u32,

    /// First backoff delay; doubles per attempt, so the defaults give
    /// 1s/2s between the three attempts
    pub retry_backoff_base: Duration,

    /// File extension for cached audio files
    pub file_extension: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_directory: "audio_cache".to_string(),
            download_timeout: Duration::from_secs(30),
            max_retry_attempts: 3,
            retry_backoff_base: Duration::from_secs(1),
            file_extension: "audio".to_string(),
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cache directory name.
    pub fn with_cache_directory(mut self, dir: impl Into<String>) -> Self {
        self.cache_directory = dir.into();
        self
    }

    /// Set per-attempt download timeout.
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Set number of download attempts.
    pub fn with_max_retry_attempts(mut self, attempts: u32) -> Self {
        self.max_retry_attempts = attempts;
        self
    }

    /// Set base backoff delay between attempts.
    pub fn with_retry_backoff_base(mut self, base: Duration) -> Self {
        self.retry_backoff_base = base;
        self
    }

    /// Delay before retry attempt `attempt` (1-based): base * 2^(attempt-1).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.retry_backoff_base * 2u32.saturating_pow(attempt.saturating_sub(1).min(16))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_directory.is_empty() {
            return Err("cache_directory must not be empty".to_string());
        }
        if self.max_retry_attempts == 0 {
            return Err("max_retry_attempts must be at least 1".to_string());
        }
        if self.download_timeout.is_zero() {
            return Err("download_timeout must be non-zero".to_string());
        }
        Ok(())
    }
}
