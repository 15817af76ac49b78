//! # Core Runtime
//!
//! Shared runtime infrastructure for the streaming client core:
//!
//! - [`events`] - typed event bus over `tokio::sync::broadcast`, the single
//!   publish/subscribe surface between the playback core and its observers
//!   (now-playing UI, media-session bridge, sync screens)
//! - [`config`] - player configuration with validation; every empirical
//!   timeout and threshold in the orchestrator is a tunable here
//! - [`logging`] - `tracing`/`tracing-subscriber` bootstrap

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::PlayerConfig;
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, PlaybackEvent, PlaybackMode, ProcessingState, SyncEvent};
