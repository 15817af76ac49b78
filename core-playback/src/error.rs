//! # Playback Error Types
//!
//! Error taxonomy for the orchestrator and cache layer. Every variant here
//! is non-fatal to the orchestrator: each path either retries, skips
//! forward, or leaves the player idle with the last known state.

use thiserror::Error;

/// Errors that can occur during playback and cache operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// Requested track is absent from the active queue.
    #[error("Track not found in queue: {0}")]
    TrackNotFound(String),

    /// The active queue has no playable tracks.
    #[error("Playback queue is empty")]
    QueueEmpty,

    // ========================================================================
    // Network/Download Errors
    // ========================================================================
    /// No network connectivity at the time of the request.
    #[error("Network unavailable")]
    NetworkUnavailable,

    /// Download exhausted its retry budget.
    #[error("Download failed for track {track_id}: {reason}")]
    DownloadFailed { track_id: String, reason: String },

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// Engine load+play did not reach a playable state within the bound.
    #[error("Engine setup timed out after {0:?}")]
    EngineSetupTimeout(std::time::Duration),

    /// The engine reported a failure.
    #[error("Engine error: {0}")]
    EngineError(String),

    // ========================================================================
    // Cache Errors
    // ========================================================================
    /// Cache store operation failed.
    #[error("Cache error: {0}")]
    CacheError(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Bridge-layer failure (filesystem, HTTP, platform).
    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if this error is transient and the operation can be
    /// retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::NetworkUnavailable
                | PlaybackError::DownloadFailed { .. }
                | PlaybackError::EngineSetupTimeout(_)
        )
    }

    /// Returns `true` if this error is due to network issues.
    pub fn is_network_error(&self) -> bool {
        match self {
            PlaybackError::NetworkUnavailable => true,
            PlaybackError::DownloadFailed { reason, .. } => {
                message_looks_like_network_error(reason)
            }
            PlaybackError::EngineError(message) => message_looks_like_network_error(message),
            PlaybackError::Bridge(err) => message_looks_like_network_error(&err.to_string()),
            _ => false,
        }
    }

    /// One-line cause suitable for a user-facing notice.
    pub fn notice_message(&self) -> String {
        match self {
            PlaybackError::NetworkUnavailable => "No network connection".to_string(),
            PlaybackError::DownloadFailed { .. } => "Download failed".to_string(),
            PlaybackError::EngineSetupTimeout(_) => "Track took too long to start".to_string(),
            PlaybackError::TrackNotFound(_) => "Track is not in the current queue".to_string(),
            PlaybackError::QueueEmpty => "Nothing to play".to_string(),
            _ => "Playback failed".to_string(),
        }
    }
}

/// Heuristic match for connectivity-failure signatures in engine and HTTP
/// error messages.
pub fn message_looks_like_network_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    const SIGNATURES: &[&str] = &[
        "network",
        "connection",
        "unreachable",
        "timed out",
        "timeout",
        "dns ",
        "socket",
        "failed host lookup",
    ];
    SIGNATURES.iter().any(|sig| lower.contains(sig))
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
