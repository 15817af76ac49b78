//! # Event Bus System
//!
//! Event-driven architecture for the streaming client core using
//! `tokio::sync::broadcast`. The playback orchestrator and sync module emit
//! typed [`CoreEvent`]s; any number of independent subscribers (now-playing
//! bar, media-session bridge, sync progress screens) observe the same
//! stream.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, PlaybackMode};
//!
//! let bus = EventBus::new(100);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(CoreEvent::Playback(PlaybackEvent::ModeChanged {
//!     mode: PlaybackMode::Shuffle,
//! }))
//! .ok();
//! ```
//!
//! ## Error Handling
//!
//! The bus uses `tokio::sync::broadcast`, which can produce two receiver
//! errors:
//!
//! - **`RecvError::Lagged(n)`**: the subscriber was too slow and missed `n`
//!   events. Non-fatal; the subscriber keeps receiving new events.
//! - **`RecvError::Closed`**: all senders dropped. Treat as shutdown.
//!
//! Subscription is explicit and ends when the receiver is dropped, so
//! teardown never leaks listeners.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Shared playback vocabulary
// ============================================================================

/// Processing states published to subscribers, mapped 1:1 from the engine's
/// native states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    Idle,
    Loading,
    Buffering,
    Ready,
    Completed,
}

/// Playback ordering mode.
///
/// Cycles `Linear → Shuffle → Loop → Linear`. Loop mode bypasses queue
/// ordering entirely: next/previous/completion all replay the current track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    Linear,
    Shuffle,
    Loop,
}

impl PlaybackMode {
    /// The next mode in the toggle cycle.
    pub fn cycled(self) -> Self {
        match self {
            PlaybackMode::Linear => PlaybackMode::Shuffle,
            PlaybackMode::Shuffle => PlaybackMode::Loop,
            PlaybackMode::Loop => PlaybackMode::Linear,
        }
    }

    pub fn is_loop(self) -> bool {
        matches!(self, PlaybackMode::Loop)
    }
}

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playback-related events
    Playback(PlaybackEvent),
    /// Sync-related events
    Sync(SyncEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Sync(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Notice { .. }) => EventSeverity::Warning,
            CoreEvent::Sync(SyncEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::TrackChanged { .. }) => EventSeverity::Info,
            CoreEvent::Sync(SyncEvent::Completed { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events published by the playback orchestrator and engine adapter.
///
/// The four "topics" exposed to UI and media-session subscribers are the
/// state snapshot, the current track, the mode, and the position; failures
/// surface as `Notice` (user-facing, one line) or `Error` (diagnostic).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// Unified state snapshot, published on every underlying engine event.
    StateChanged {
        is_playing: bool,
        state: ProcessingState,
        /// Buffer fill fraction in `[0.0, 1.0]`.
        buffering: f32,
        position_ms: u64,
    },
    /// The current track was replaced.
    TrackChanged {
        track_id: String,
        title: String,
        artist: String,
    },
    /// Playback mode toggled.
    ModeChanged { mode: PlaybackMode },
    /// Periodic position report.
    PositionChanged {
        position_ms: u64,
        duration_ms: Option<u64>,
    },
    /// User-facing one-line notice after local recovery is exhausted.
    /// Never a raw error chain.
    Notice {
        track_id: Option<String>,
        message: String,
    },
    /// Diagnostic playback error (recoverable errors are retried silently
    /// before one of these is published).
    Error {
        track_id: Option<String>,
        message: String,
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::StateChanged { .. } => "Playback state changed",
            PlaybackEvent::TrackChanged { .. } => "Current track changed",
            PlaybackEvent::ModeChanged { .. } => "Playback mode changed",
            PlaybackEvent::PositionChanged { .. } => "Playback position changed",
            PlaybackEvent::Notice { .. } => "Playback notice",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Sync Events
// ============================================================================

/// Events related to playlist synchronization jobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// Sync job initiated.
    Started {
        job_id: String,
        source_url: String,
    },
    /// Incremental progress update.
    Progress {
        job_id: String,
        /// Progress percentage (0-100).
        percent: u8,
    },
    /// Sync finished successfully.
    Completed {
        job_id: String,
        track_count: u64,
    },
    /// Sync encountered an error and stopped.
    Failed {
        job_id: String,
        message: String,
    },
}

impl SyncEvent {
    fn description(&self) -> &str {
        match self {
            SyncEvent::Started { .. } => "Sync started",
            SyncEvent::Progress { .. } => "Sync in progress",
            SyncEvent::Completed { .. } => "Sync completed successfully",
            SyncEvent::Failed { .. } => "Sync failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel for publishing [`CoreEvent`]s.
///
/// Fully thread-safe; share across tasks with `Arc`.
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// When a subscriber falls behind by more than `capacity` events it
    /// receives `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when there are no active subscribers (which callers routinely
    /// ignore - an unobserved event is not a failure).
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver observing all future
    /// events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}
