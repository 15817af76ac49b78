//! # Playback Queue
//!
//! Maintains the source track list with two parallel orderings (linear and
//! shuffled) and a current-position pointer into whichever ordering the
//! active mode selects. Purely synchronous and lock-free; the orchestrator
//! wraps it in its own lock.

use core_library::models::{Track, TrackId};
use core_runtime::events::PlaybackMode;
use rand::Rng;
use tracing::debug;

/// Direction of a queue advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Mutable queue state: raw source list, derived orderings, mode, index.
///
/// Tracks flagged `ignored` are excluded from both orderings but retained in
/// the raw list for display. The shuffled ordering is a fresh Fisher-Yates
/// permutation recomputed on every [`PlaybackQueue::set_source`], never
/// patched incrementally.
pub struct PlaybackQueue {
    /// Raw source list as supplied, including ignored tracks.
    source: Vec<Track>,
    /// Source order with ignored tracks filtered out.
    linear: Vec<Track>,
    /// Uniform random permutation of `linear`.
    shuffled: Vec<Track>,
    mode: PlaybackMode,
    /// Index into the active ordering; `None` when no playable tracks.
    index: Option<usize>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self {
            source: Vec::new(),
            linear: Vec::new(),
            shuffled: Vec::new(),
            mode: PlaybackMode::Linear,
            index: None,
        }
    }

    /// Replace the source list and rebuild both orderings.
    ///
    /// The current index is set to the position of `start_track_id` in the
    /// active ordering when present, else 0 (or `None` when every track is
    /// ignored).
    pub fn set_source(&mut self, tracks: Vec<Track>, start_track_id: Option<&TrackId>) {
        self.linear = tracks.iter().filter(|t| t.is_playable()).cloned().collect();
        self.source = tracks;

        self.shuffled = self.linear.clone();
        fisher_yates(&mut self.shuffled, &mut rand::thread_rng());

        self.index = if self.linear.is_empty() {
            None
        } else {
            let found = start_track_id
                .and_then(|id| self.active_ordering().iter().position(|t| &t.id == id));
            Some(found.unwrap_or(0).min(self.linear.len() - 1))
        };

        debug!(
            total = self.source.len(),
            playable = self.linear.len(),
            "Queue source replaced"
        );
    }

    /// Step the index one position in `direction`, wrapping at both ends.
    ///
    /// Returns the track at the new position, or `None` when the active
    /// ordering is empty (the index is left untouched). Loop mode is handled
    /// above this layer; `advance` always moves.
    pub fn advance(&mut self, direction: Direction) -> Option<Track> {
        let len = self.active_ordering().len();
        if len == 0 {
            return None;
        }
        let current = self.index.unwrap_or(0);
        let next = match direction {
            Direction::Next => (current + 1) % len,
            Direction::Previous => (current + len - 1) % len,
        };
        self.index = Some(next);
        self.active_ordering().get(next).cloned()
    }

    /// Cycle the mode and relocate the current track in the newly active
    /// ordering so "now playing" identity is preserved.
    pub fn toggle_mode(&mut self) -> PlaybackMode {
        let current = self.current_track();
        self.mode = self.mode.cycled();
        if let Some(track) = current {
            if let Some(pos) = self.active_ordering().iter().position(|t| t.id == track.id) {
                self.index = Some(pos);
            }
        }
        self.mode
    }

    /// Point the index at `track_id` in the active ordering.
    pub fn select(&mut self, track_id: &TrackId) -> Option<Track> {
        let pos = self.active_ordering().iter().position(|t| &t.id == track_id)?;
        self.index = Some(pos);
        self.active_ordering().get(pos).cloned()
    }

    pub fn current_track(&self) -> Option<Track> {
        let index = self.index?;
        self.active_ordering().get(index).cloned()
    }

    /// Up to `count` tracks following the current position in the active
    /// ordering, wrapping, excluding the current track. Used for look-ahead
    /// pre-caching.
    pub fn peek_upcoming(&self, count: usize) -> Vec<Track> {
        let ordering = self.active_ordering();
        let len = ordering.len();
        if len < 2 {
            return Vec::new();
        }
        let start = self.index.unwrap_or(0);
        (1..=count.min(len - 1))
            .map(|offset| ordering[(start + offset) % len].clone())
            .collect()
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.active_ordering().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active_ordering().is_empty()
    }

    /// Raw source list including ignored tracks, for display.
    pub fn source_tracks(&self) -> &[Track] {
        &self.source
    }

    fn active_ordering(&self) -> &[Track] {
        match self.mode {
            PlaybackMode::Shuffle => &self.shuffled,
            // Loop replays the current track; ordering stays linear.
            PlaybackMode::Linear | PlaybackMode::Loop => &self.linear,
        }
    }
}

impl Default for PlaybackQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// In-place Fisher-Yates: for i from len-1 down to 1, swap element i with a
/// uniformly random element in [0, i]. Unbiased permutation.
fn fisher_yates<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
