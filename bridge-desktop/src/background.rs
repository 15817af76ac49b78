//! Wake Lock and Lifecycle Shims

use async_trait::async_trait;
use bridge_traits::{background::WakeLock, error::Result};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Wake-lock shim for desktop hosts.
///
/// Desktop machines don't sleep mid-playback the way phones do, so this
/// implementation only tracks the held flag and logs transitions. It still
/// honors the idempotency contract so orchestrator behavior matches mobile
/// hosts.
#[derive(Default)]
pub struct LoggingWakeLock {
    held: AtomicBool,
}

impl LoggingWakeLock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WakeLock for LoggingWakeLock {
    async fn acquire(&self) -> Result<()> {
        if !self.held.swap(true, Ordering::SeqCst) {
            debug!("Wake lock acquired");
        }
        Ok(())
    }

    async fn release(&self) -> Result<()> {
        if self.held.swap(false, Ordering::SeqCst) {
            debug!("Wake lock released");
        }
        Ok(())
    }

    async fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}
