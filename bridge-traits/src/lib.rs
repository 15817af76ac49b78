//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the
//! platform-specific host application. Each trait represents a capability the
//! core requires but that must be implemented differently per platform
//! (desktop/emulator, iOS, Android).
//!
//! ## Traits
//!
//! ### Audio
//! - [`AudioEngine`](engine::AudioEngine) - Black-box decode/output engine
//!   (load, play, pause, seek, raw event stream)
//!
//! ### Networking & I/O
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with retry
//! - [`FileSystemAccess`](storage::FileSystemAccess) - File I/O for the audio cache
//! - [`NetworkMonitor`](network::NetworkMonitor) - Connectivity detection and
//!   host reachability probing
//!
//! ### Persistence
//! - [`KeyValueStore`](storage::KeyValueStore) - JSON key-value persistence
//!
//! ### Platform Integration
//! - [`WakeLock`](background::WakeLock) - Keep-alive during background playback
//! - [`LifecycleObserver`](background::LifecycleObserver) - Foreground/background
//!   transitions
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Platform implementations should convert platform-specific errors to
//! `BridgeError` and include actionable context (file paths, URLs, network
//! status).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so implementations can be
//! shared freely across async tasks behind `Arc`.

pub mod background;
pub mod engine;
pub mod error;
pub mod http;
pub mod network;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use background::{LifecycleObserver, LifecycleState, WakeLock};
pub use engine::{AudioEngine, AudioSource, EngineEvent, EngineState};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use network::{NetworkInfo, NetworkMonitor, NetworkStatus, NetworkType};
pub use storage::{FileMetadata, FileSystemAccess, KeyValueStore};
pub use time::{Clock, SystemClock};
