//! Audio engine bridge trait and supporting types.
//!
//! The decode/output engine is a black box owned by the host platform
//! (ExoPlayer, AVPlayer, a desktop shim). The core drives it through this
//! trait and observes it exclusively through the raw [`EngineEvent`] stream;
//! all state translation, buffering math, and recovery logic live above this
//! seam, never inside it.

use crate::error::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast;

/// High-level audio source descriptor handed to the engine.
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// Local file accessible to the host runtime (cache hit).
    LocalFile { path: PathBuf },
    /// Remote HTTP(S) stream fetched by the engine itself (cache miss).
    RemoteStream {
        url: String,
        headers: HashMap<String, String>,
    },
}

impl AudioSource {
    /// Determine whether the source represents remote content.
    pub fn is_remote(&self) -> bool {
        matches!(self, AudioSource::RemoteStream { .. })
    }
}

/// Native processing states reported by the engine, mapped 1:1 by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing loaded.
    Idle,
    /// A source is being opened.
    Loading,
    /// Playback is stalled waiting for data.
    Buffering,
    /// Enough data is buffered to play.
    Ready,
    /// The current source played to its end.
    Completed,
}

/// Raw events emitted by the engine.
///
/// Position ticks carry both the playback position and the buffered
/// high-water mark so the core can derive a buffering fraction without
/// polling.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Native processing state changed.
    StateChanged(EngineState),
    /// Play/pause flipped.
    PlayingChanged(bool),
    /// Periodic position report.
    PositionTick {
        position: Duration,
        buffered: Duration,
        duration: Option<Duration>,
    },
    /// The engine hit an unrecoverable (from its point of view) error.
    Error { message: String },
}

/// Trait for the platform audio engine.
///
/// Implementations own a single logical playback slot: `load` replaces
/// whatever was previously loaded. All methods are fire-and-forget commands;
/// outcomes are observed on the event stream.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::engine::{AudioEngine, AudioSource};
///
/// async fn restart(engine: &dyn AudioEngine) -> bridge_traits::error::Result<()> {
///     engine.seek(std::time::Duration::ZERO).await?;
///     engine.play().await
/// }
/// ```
#[async_trait::async_trait]
pub trait AudioEngine: Send + Sync {
    /// Load a new source, replacing the current one.
    async fn load(&self, source: AudioSource) -> Result<()>;

    /// Begin or resume playback.
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping the source loaded.
    async fn pause(&self) -> Result<()>;

    /// Stop playback and unload the current source.
    async fn stop(&self) -> Result<()>;

    /// Seek to an absolute position within the stream.
    async fn seek(&self, position: Duration) -> Result<()>;

    /// Enable or disable the engine's native single-track loop.
    async fn set_looping(&self, looping: bool) -> Result<()>;

    /// Subscribe to the raw event stream.
    ///
    /// Each call returns an independent receiver observing all future events.
    fn events(&self) -> broadcast::Receiver<EngineEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_source_detection() {
        let local = AudioSource::LocalFile {
            path: PathBuf::from("/tmp/a.audio"),
        };
        let remote = AudioSource::RemoteStream {
            url: "https://host/stream/a".to_string(),
            headers: HashMap::new(),
        };
        assert!(!local.is_remote());
        assert!(remote.is_remote());
    }
}
