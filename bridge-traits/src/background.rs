//! Background Execution and Lifecycle Abstractions
//!
//! Wake-lock control for background playback and app lifecycle observation.

use crate::error::Result;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Application is in the foreground and active
    Foreground,
    /// Application is in the background (screen off, switched away)
    Background,
}

/// Platform wake lock
///
/// A single toggle keeping the device awake while audio plays with the
/// screen off:
/// - **Android**: `PowerManager.WakeLock` / foreground service
/// - **iOS**: audio background mode (acquire/release become no-ops)
/// - **Desktop**: typically a logging shim
///
/// # Idempotency
///
/// `acquire` while already held and `release` while not held MUST be no-ops.
/// The core calls both liberally during playback transitions and relies on
/// this contract to avoid premature sleep.
#[async_trait::async_trait]
pub trait WakeLock: Send + Sync {
    /// Acquire the wake lock. No-op when already held.
    async fn acquire(&self) -> Result<()>;

    /// Release the wake lock. No-op when not held.
    async fn release(&self) -> Result<()>;

    /// Whether the lock is currently held.
    async fn is_held(&self) -> bool;
}

/// Lifecycle observer trait
///
/// Notifies the core about app lifecycle transitions so it can switch the
/// orchestrator into background mode (watchdog, wake lock, aggressive
/// pre-cache) and back.
///
/// # Platform Support
///
/// - **iOS**: UIApplication lifecycle notifications
/// - **Android**: Activity/Application lifecycle callbacks
/// - **Desktop**: window focus events (less critical)
#[async_trait::async_trait]
pub trait LifecycleObserver: Send + Sync {
    /// Get current lifecycle state
    async fn get_state(&self) -> Result<LifecycleState>;

    /// Subscribe to lifecycle state changes
    async fn subscribe_changes(&self) -> Result<Box<dyn LifecycleChangeStream>>;
}

/// Stream of lifecycle state changes
#[async_trait::async_trait]
pub trait LifecycleChangeStream: Send {
    /// Get the next lifecycle state update
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<LifecycleState>;
}
