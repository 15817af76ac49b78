//! Recovery primitives used by the orchestrator: the skip re-entrancy guard
//! and the buffer-stall detector.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Re-entrancy guard serializing skip operations.
///
/// First-call-wins: while engaged, further attempts are rejected rather
/// than queued. The engagement carries a timestamp and expires after a
/// bounded timeout, so an operation that never signals completion cannot
/// block skipping forever.
pub struct SkipGuard {
    timeout: Duration,
    engaged_at: Mutex<Option<Instant>>,
}

impl SkipGuard {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            engaged_at: Mutex::new(None),
        }
    }

    /// Engage the guard. Returns `false` when a non-expired engagement is
    /// already in place; an expired one is force-cleared and replaced.
    pub fn try_engage(&self) -> bool {
        let mut slot = self.engaged_at.lock();
        match *slot {
            Some(at) if at.elapsed() < self.timeout => false,
            _ => {
                *slot = Some(Instant::now());
                true
            }
        }
    }

    pub fn release(&self) {
        *self.engaged_at.lock() = None;
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged_at
            .lock()
            .map_or(false, |at| at.elapsed() < self.timeout)
    }
}

/// Samples the buffering fraction on a fixed interval and flags a stall
/// when the integer percentage is unchanged since the previous sample and
/// below the threshold.
///
/// Fires once per stall episode: a positive detection resets the window so
/// the next identical sample starts a new episode instead of re-firing.
/// The threshold is an empirical tunable, not a correctness requirement.
pub struct StallDetector {
    threshold_percent: u8,
    last_percent: Option<u8>,
}

impl StallDetector {
    pub fn new(threshold_percent: u8) -> Self {
        Self {
            threshold_percent,
            last_percent: None,
        }
    }

    /// Feed one sample. Returns `true` when a stall nudge should run.
    pub fn sample(&mut self, buffering: f32, is_playing: bool) -> bool {
        if !is_playing {
            self.last_percent = None;
            return false;
        }
        let percent = (buffering.clamp(0.0, 1.0) * 100.0) as u8;
        let stalled = percent < self.threshold_percent && self.last_percent == Some(percent);
        self.last_percent = if stalled { None } else { Some(percent) };
        stalled
    }

    /// Forget history, e.g. when a new track starts.
    pub fn reset(&mut self) {
        self.last_percent = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_first_call_wins() {
        let guard = SkipGuard::new(Duration::from_secs(3));
        assert!(guard.try_engage());
        assert!(!guard.try_engage());
        guard.release();
        assert!(guard.try_engage());
    }

    #[tokio::test(start_paused = true)]
    async fn guard_force_clears_after_timeout() {
        let guard = SkipGuard::new(Duration::from_secs(3));
        assert!(guard.try_engage());
        assert!(!guard.try_engage());

        tokio::time::advance(Duration::from_millis(3100)).await;
        assert!(!guard.is_engaged());
        assert!(guard.try_engage());
    }

    #[test]
    fn stall_fires_once_per_episode() {
        let mut detector = StallDetector::new(10);
        assert!(!detector.sample(0.05, true));
        assert!(detector.sample(0.05, true));
        // The window resets after firing; the next identical sample opens a
        // new episode instead of re-firing.
        assert!(!detector.sample(0.05, true));
        assert!(detector.sample(0.05, true));
    }

    #[test]
    fn stall_requires_low_and_unchanged_buffer() {
        let mut detector = StallDetector::new(10);
        assert!(!detector.sample(0.05, true));
        assert!(!detector.sample(0.07, true)); // progressing
        assert!(!detector.sample(0.50, true));
        assert!(!detector.sample(0.50, true)); // unchanged but healthy
    }

    #[test]
    fn stall_ignores_paused_playback() {
        let mut detector = StallDetector::new(10);
        assert!(!detector.sample(0.05, false));
        assert!(!detector.sample(0.05, false));
        // Pause cleared the window, so the first playing sample is fresh.
        assert!(!detector.sample(0.05, true));
        assert!(detector.sample(0.05, true));
    }
}
