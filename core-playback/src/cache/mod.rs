//! # Audio Cache Module
//!
//! Disk-backed cache for downloaded audio files.
//!
//! ## Overview
//!
//! Tracks are downloaded from the streaming host and stored as flat files
//! under the platform cache directory. Key properties:
//! - De-duplicated downloads: concurrent requests for the same track share
//!   one transfer via a pending-operation map
//! - Self-healing hint set: "known cached" is re-verified against the
//!   filesystem on every read, never trusted blindly
//! - Retry with exponential backoff on transient download failures
//! - Fail-fast while offline, with a distinct [`PlaybackError::NetworkUnavailable`]
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │     AudioCacheManager                  │
//! │  - download_and_cache()                │
//! │  - is_cached() / cache_file()          │
//! │  - preload_batch() / evict_all()       │
//! └────────┬───────────────────────────────┘
//!          │
//!          ├──> FileSystemAccess (backing store)
//!          ├──> HttpClient       (downloads)
//!          └──> NetworkMonitor   (fail-fast while offline)
//! ```
//!
//! [`PlaybackError::NetworkUnavailable`]: crate::error::PlaybackError::NetworkUnavailable

pub mod config;
pub mod manager;
pub mod stats;

pub use config::CacheConfig;
pub use manager::AudioCacheManager;
pub use stats::CacheStats;
