//! # Player Configuration
//!
//! Every empirical timeout, threshold, and retry ceiling in the playback
//! orchestrator is a field here rather than a buried constant. The defaults
//! reproduce the tuned values observed on real mobile networks; none of them
//! is load-bearing for correctness.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the playback orchestrator and its timers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Base URL of the streaming API host. Tracks stream from
    /// `{api_base_url}/stream/{track_id}`.
    pub api_base_url: String,

    /// Bound on engine load+play during track setup (default: 15s).
    pub engine_setup_timeout: Duration,

    /// Interval of the buffer-stall sampling timer (default: 5s).
    pub stall_check_interval: Duration,

    /// Integer buffer percentage below which an unchanged sample counts as a
    /// stall (default: 10). Empirical; trades false positives for
    /// simplicity.
    pub stall_threshold_percent: u8,

    /// Pause duration of the stall pause/resume nudge (default: 300ms).
    pub stall_resume_delay: Duration,

    /// Force-clear timeout for a stuck skip guard (default: 3s).
    pub skip_guard_timeout: Duration,

    /// Deferred guard release after a successful skip, absorbing UI
    /// double-taps (default: 250ms).
    pub skip_settle_delay: Duration,

    /// Delay before skipping forward past a failed track (default: 1s).
    pub skip_retry_delay: Duration,

    /// Interval of the connectivity probe against the API host while the
    /// network-error flag is set (default: 60s).
    pub connectivity_probe_interval: Duration,

    /// Interval of the background watchdog that detects playback stuck at
    /// "completed" without auto-advance (default: 15s).
    pub watchdog_interval: Duration,

    /// Ceiling on playback retries after network errors (default: 5).
    /// Backoff doubles per attempt: 2/4/8/16/32s.
    pub max_play_retries: u32,

    /// Look-ahead pre-cache count while foregrounded (default: 2).
    pub lookahead_foreground: usize,

    /// Look-ahead pre-cache count while backgrounded (default: 5).
    pub lookahead_background: usize,

    /// Event bus buffer size (default: 100).
    pub event_buffer_size: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            engine_setup_timeout: Duration::from_secs(15),
            stall_check_interval: Duration::from_secs(5),
            stall_threshold_percent: 10,
            stall_resume_delay: Duration::from_millis(300),
            skip_guard_timeout: Duration::from_secs(3),
            skip_settle_delay: Duration::from_millis(250),
            skip_retry_delay: Duration::from_secs(1),
            connectivity_probe_interval: Duration::from_secs(60),
            watchdog_interval: Duration::from_secs(15),
            max_play_retries: 5,
            lookahead_foreground: 2,
            lookahead_background: 5,
            event_buffer_size: 100,
        }
    }
}

impl PlayerConfig {
    /// Create a configuration for the given API host with default tuning.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Set the engine setup timeout.
    pub fn with_engine_setup_timeout(mut self, timeout: Duration) -> Self {
        self.engine_setup_timeout = timeout;
        self
    }

    /// Set the stall sampling interval.
    pub fn with_stall_check_interval(mut self, interval: Duration) -> Self {
        self.stall_check_interval = interval;
        self
    }

    /// Set the skip-guard force-clear timeout.
    pub fn with_skip_guard_timeout(mut self, timeout: Duration) -> Self {
        self.skip_guard_timeout = timeout;
        self
    }

    /// Set the foreground/background look-ahead pre-cache counts.
    pub fn with_lookahead(mut self, foreground: usize, background: usize) -> Self {
        self.lookahead_foreground = foreground;
        self.lookahead_background = background;
        self
    }

    /// Backoff delay before playback retry `attempt` (0-based): 2, 4, 8,
    /// 16, 32 seconds.
    pub fn play_retry_backoff(&self, attempt: u32) -> Duration {
        Duration::from_secs(2u64 << attempt.min(10))
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.is_empty() {
            return Err(Error::Config("api_base_url cannot be empty".to_string()));
        }
        if self.stall_threshold_percent > 100 {
            return Err(Error::Config(
                "stall_threshold_percent must be at most 100".to_string(),
            ));
        }
        if self.engine_setup_timeout.is_zero() {
            return Err(Error::Config(
                "engine_setup_timeout must be greater than zero".to_string(),
            ));
        }
        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "event_buffer_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PlayerConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_base_url_rejected() {
        let config = PlayerConfig::new("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn retry_backoff_doubles() {
        let config = PlayerConfig::default();
        assert_eq!(config.play_retry_backoff(0), Duration::from_secs(2));
        assert_eq!(config.play_retry_backoff(1), Duration::from_secs(4));
        assert_eq!(config.play_retry_backoff(4), Duration::from_secs(32));
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = PlayerConfig::new("https://api.example.com")
            .with_lookahead(3, 8)
            .with_skip_guard_timeout(Duration::from_secs(2));
        let json = serde_json::to_string(&config).unwrap();
        let back: PlayerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.api_base_url, "https://api.example.com");
        assert_eq!(back.lookahead_background, 8);
        assert_eq!(back.skip_guard_timeout, Duration::from_secs(2));
    }
}
