//! # Playback Orchestrator
//!
//! Single logical owner of playback: every intent (play, skip, toggle)
//! funnels through one instance constructed at startup. Sequences queue
//! lookups, cache resolution, and engine commands, and runs the recovery
//! loops: stall nudging, network retry with backoff, connectivity-probe
//! resume, skip-forward past bad tracks, and the background watchdog.
//!
//! There is no cancellation token for superseded play requests; a
//! generation counter makes stale async results no-ops instead.

use bridge_traits::background::{LifecycleObserver, LifecycleState, WakeLock};
use bridge_traits::engine::AudioSource;
use bridge_traits::network::NetworkMonitor;
use core_library::models::{Track, TrackId};
use core_runtime::config::PlayerConfig;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, PlaybackMode, ProcessingState};
use core_sync::StreamLocator;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::AudioCacheManager;
use crate::engine::{AdapterEvent, EngineAdapter, PlayerState};
use crate::error::{message_looks_like_network_error, PlaybackError, Result};
use crate::queue::{Direction, PlaybackQueue};
use crate::recovery::{SkipGuard, StallDetector};

struct Inner {
    config: PlayerConfig,
    queue: Mutex<PlaybackQueue>,
    adapter: Arc<EngineAdapter>,
    cache: Arc<AudioCacheManager>,
    network: Arc<dyn NetworkMonitor>,
    wake_lock: Arc<dyn WakeLock>,
    bus: Arc<EventBus>,
    locator: StreamLocator,
    /// Now-playing track; overwritten by every play request.
    current: Mutex<Option<Track>>,
    /// Bumped on every play request; stale async results check it before
    /// applying state.
    generation: AtomicU64,
    skip_guard: SkipGuard,
    had_network_error: AtomicBool,
    retry_attempt: AtomicU32,
    background: AtomicBool,
    stall: Mutex<StallDetector>,
    watchdog: Mutex<Option<CancellationToken>>,
    shutdown: CancellationToken,
}

/// The playback coordinator. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct PlayerOrchestrator {
    inner: Arc<Inner>,
}

impl PlayerOrchestrator {
    /// Build the orchestrator and start its timers and event loop.
    pub fn new(
        config: PlayerConfig,
        adapter: Arc<EngineAdapter>,
        cache: Arc<AudioCacheManager>,
        network: Arc<dyn NetworkMonitor>,
        wake_lock: Arc<dyn WakeLock>,
        bus: Arc<EventBus>,
    ) -> Self {
        let locator = StreamLocator::new(config.api_base_url.clone());
        let inner = Arc::new(Inner {
            skip_guard: SkipGuard::new(config.skip_guard_timeout),
            stall: Mutex::new(StallDetector::new(config.stall_threshold_percent)),
            config,
            queue: Mutex::new(PlaybackQueue::new()),
            adapter,
            cache,
            network,
            wake_lock,
            bus,
            locator,
            current: Mutex::new(None),
            generation: AtomicU64::new(0),
            had_network_error: AtomicBool::new(false),
            retry_attempt: AtomicU32::new(0),
            background: AtomicBool::new(false),
            watchdog: Mutex::new(None),
            shutdown: CancellationToken::new(),
        });
        let this = Self { inner };
        this.spawn_event_loop();
        this.spawn_stall_timer();
        this.spawn_connectivity_probe();
        this
    }

    // ========================================================================
    // Intents
    // ========================================================================

    /// Replace the queue's source list.
    pub fn set_source(&self, tracks: Vec<Track>, start_track_id: Option<&TrackId>) {
        self.inner.queue.lock().set_source(tracks, start_track_id);
    }

    /// Play a specific track from the active queue.
    pub async fn play_track(&self, track_id: &TrackId) -> Result<()> {
        let selected = self.inner.queue.lock().select(track_id);
        let Some(track) = selected else {
            self.notice(Some(track_id.to_string()), "Track is not in the current queue");
            return Err(PlaybackError::TrackNotFound(track_id.to_string()));
        };
        self.start_track(track).await
    }

    /// Advance to the next track (replays current in loop mode).
    pub async fn next(&self) -> Result<()> {
        self.skip(Direction::Next).await
    }

    /// Step back to the previous track (replays current in loop mode).
    pub async fn previous(&self) -> Result<()> {
        self.skip(Direction::Previous).await
    }

    /// Pause if playing, resume if paused. No-op without a current track.
    pub async fn toggle_playback(&self) -> Result<()> {
        if self.inner.current.lock().is_none() {
            return Ok(());
        }
        if self.inner.adapter.state().is_playing {
            self.inner.adapter.pause().await
        } else {
            self.inner.adapter.play().await
        }
    }

    /// Restart the current track from position zero.
    pub async fn replay_current(&self) -> Result<()> {
        if self.inner.current.lock().is_none() {
            return Ok(());
        }
        self.inner.adapter.seek(Duration::ZERO).await?;
        self.inner.adapter.play().await
    }

    /// Cycle the playback mode and update the engine's native loop flag.
    pub async fn toggle_mode(&self) -> Result<PlaybackMode> {
        let mode = self.inner.queue.lock().toggle_mode();
        self.inner
            .bus
            .emit(CoreEvent::Playback(PlaybackEvent::ModeChanged { mode }))
            .ok();
        self.inner.adapter.set_looping(mode.is_loop()).await?;
        Ok(mode)
    }

    /// Seek within the current track.
    pub async fn seek(&self, position: Duration) -> Result<()> {
        self.inner.adapter.seek(position).await
    }

    /// Switch between foreground and background behavior.
    ///
    /// Backgrounding acquires the wake lock while playing, raises the
    /// pre-cache look-ahead, and starts the stuck-at-completed watchdog.
    /// Foregrounding undoes all three and re-publishes current state so UI
    /// that missed events resynchronizes.
    pub async fn set_background(&self, background: bool) -> Result<()> {
        self.inner.background.store(background, Ordering::SeqCst);
        if background {
            if self.inner.adapter.state().is_playing {
                self.inner.wake_lock.acquire().await.ok();
            }
            self.start_watchdog();
            debug!("Entered background mode");
        } else {
            if let Some(token) = self.inner.watchdog.lock().take() {
                token.cancel();
            }
            if !self.inner.adapter.state().is_playing {
                self.inner.wake_lock.release().await.ok();
            }
            self.republish_state();
            debug!("Returned to foreground");
        }
        Ok(())
    }

    /// Follow the host's lifecycle stream, switching background mode on
    /// every foreground/background transition until shutdown.
    pub fn drive_lifecycle(&self, observer: Arc<dyn LifecycleObserver>) {
        let this = self.clone();
        tokio::spawn(async move {
            let mut stream = match observer.subscribe_changes().await {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(error = %err, "Lifecycle stream unavailable");
                    return;
                }
            };
            loop {
                let state = tokio::select! {
                    _ = this.inner.shutdown.cancelled() => break,
                    state = stream.next() => match state {
                        Some(state) => state,
                        None => break,
                    },
                };
                this.set_background(state == LifecycleState::Background)
                    .await
                    .ok();
            }
        });
    }

    /// Stop timers, the adapter pump, and release the wake lock.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        if let Some(token) = self.inner.watchdog.lock().take() {
            token.cancel();
        }
        self.inner.adapter.shutdown();
        self.inner.wake_lock.release().await.ok();
        info!("Playback orchestrator shut down");
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn current_track(&self) -> Option<Track> {
        self.inner.current.lock().clone()
    }

    pub fn mode(&self) -> PlaybackMode {
        self.inner.queue.lock().mode()
    }

    pub fn state(&self) -> PlayerState {
        self.inner.adapter.state()
    }

    pub fn queue_len(&self) -> usize {
        self.inner.queue.lock().len()
    }

    /// Adapter event stream, mainly for tests and diagnostics.
    pub fn adapter_events(&self) -> broadcast::Receiver<AdapterEvent> {
        self.inner.adapter.subscribe()
    }

    // ========================================================================
    // Core sequencing
    // ========================================================================

    /// Resolve a source and drive the engine through load+play with a
    /// bounded setup timeout.
    async fn start_track(&self, track: Track) -> Result<()> {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.inner.current.lock() = Some(track.clone());
        self.inner.stall.lock().reset();
        self.inner
            .bus
            .emit(CoreEvent::Playback(PlaybackEvent::TrackChanged {
                track_id: track.id.to_string(),
                title: track.title.clone(),
                artist: track.artist.clone(),
            }))
            .ok();

        // Halt whatever is playing before swapping sources.
        self.inner.adapter.stop().await.ok();

        let source = self.resolve_source(&track).await;
        let setup = async {
            self.inner.adapter.load(source).await?;
            self.inner.adapter.play().await
        };

        match tokio::time::timeout(self.inner.config.engine_setup_timeout, setup).await {
            Ok(Ok(())) => {
                if self.is_stale(generation) {
                    return Ok(());
                }
                self.inner.retry_attempt.store(0, Ordering::SeqCst);
                self.inner.had_network_error.store(false, Ordering::SeqCst);
                info!(track_id = %track.id, "Playback started");
                self.spawn_lookahead();
                Ok(())
            }
            Ok(Err(err)) => {
                if self.is_stale(generation) {
                    return Ok(());
                }
                self.handle_track_failure(&track, err)
            }
            Err(_) => {
                if self.is_stale(generation) {
                    return Ok(());
                }
                let timeout = self.inner.config.engine_setup_timeout;
                warn!(track_id = %track.id, ?timeout, "Engine setup timed out");
                if self.inner.had_network_error.load(Ordering::SeqCst)
                    || !self.inner.network.is_connected().await
                {
                    self.schedule_network_retry();
                    Ok(())
                } else {
                    self.handle_track_failure(&track, PlaybackError::EngineSetupTimeout(timeout))
                }
            }
        }
    }

    /// Cache hit becomes a local-file source; a miss falls back to the
    /// streaming URL while a background download fills the cache.
    async fn resolve_source(&self, track: &Track) -> AudioSource {
        if let Some(path) = self.inner.cache.cache_file(&track.id).await {
            debug!(track_id = %track.id, "Cache hit");
            return AudioSource::LocalFile { path };
        }
        debug!(track_id = %track.id, "Cache miss, streaming");
        let cache = self.inner.cache.clone();
        let background_track = track.clone();
        tokio::spawn(async move {
            if let Err(err) = cache.download_and_cache(&background_track).await {
                debug!(track_id = %background_track.id, error = %err, "Background cache fill failed");
            }
        });
        AudioSource::RemoteStream {
            url: self.inner.locator.stream_url(&track.id),
            headers: HashMap::new(),
        }
    }

    async fn skip(&self, direction: Direction) -> Result<()> {
        if self.mode().is_loop() {
            return self.replay_current().await;
        }
        if !self.inner.skip_guard.try_engage() {
            debug!(?direction, "Skip dropped: another skip in flight");
            return Ok(());
        }

        let advanced = self.inner.queue.lock().advance(direction);
        let Some(track) = advanced else {
            self.inner.skip_guard.release();
            self.notice(None, "Nothing to play");
            return Err(PlaybackError::QueueEmpty);
        };

        match self.start_track(track).await {
            Ok(()) => {
                // Deferred release absorbs UI double-taps.
                let this = self.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(this.inner.config.skip_settle_delay).await;
                    this.inner.skip_guard.release();
                });
                Ok(())
            }
            Err(err) => {
                self.inner.skip_guard.release();
                debug!(error = %err, "Skip target failed, scheduling skip-forward");
                self.schedule_skip_forward();
                Ok(())
            }
        }
    }

    /// Route a failed track start: network errors go to the backoff retry
    /// path; anything else is reported once and propagated.
    fn handle_track_failure(&self, track: &Track, err: PlaybackError) -> Result<()> {
        if err.is_network_error() {
            self.inner.had_network_error.store(true, Ordering::SeqCst);
            self.schedule_network_retry();
            return Ok(());
        }
        self.inner
            .bus
            .emit(CoreEvent::Playback(PlaybackEvent::Error {
                track_id: Some(track.id.to_string()),
                message: err.to_string(),
                recoverable: err.is_transient(),
            }))
            .ok();
        self.notice(Some(track.id.to_string()), &err.notice_message());
        Err(err)
    }

    // ========================================================================
    // Recovery scheduling
    // ========================================================================

    /// Retry the current track after the attempt-indexed backoff, up to the
    /// retry ceiling. Beyond the ceiling the connectivity probe takes over.
    fn schedule_network_retry(&self) {
        self.inner.had_network_error.store(true, Ordering::SeqCst);
        let attempt = self.inner.retry_attempt.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.inner.config.max_play_retries {
            let current_id = self.current_track().map(|t| t.id.to_string());
            self.notice(current_id, "Playback paused: waiting for network");
            return;
        }
        let delay = self.inner.config.play_retry_backoff(attempt);
        info!(attempt = attempt + 1, ?delay, "Scheduling network retry");
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if this.inner.shutdown.is_cancelled() {
                return;
            }
            let track = this.inner.current.lock().clone();
            if let Some(track) = track {
                this.start_track(track).await.ok();
            }
        });
    }

    /// Advance past a failed track after a short delay instead of retrying
    /// the same one.
    fn schedule_skip_forward(&self) {
        let delay = self.inner.config.skip_retry_delay;
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if this.inner.shutdown.is_cancelled() {
                return;
            }
            this.next().await.ok();
        });
    }

    /// Pre-cache upcoming tracks; look-ahead widens in background mode.
    fn spawn_lookahead(&self) {
        let count = if self.inner.background.load(Ordering::SeqCst) {
            self.inner.config.lookahead_background
        } else {
            self.inner.config.lookahead_foreground
        };
        let upcoming = self.inner.queue.lock().peek_upcoming(count);
        if upcoming.is_empty() {
            return;
        }
        let cache = self.inner.cache.clone();
        tokio::spawn(async move {
            cache.preload_batch(&upcoming, count).await;
        });
    }

    // ========================================================================
    // Timers and event loop
    // ========================================================================

    fn spawn_event_loop(&self) {
        let this = self.clone();
        let mut events = self.inner.adapter.subscribe();
        tokio::spawn(async move {
            let mut was_playing = false;
            loop {
                let event = tokio::select! {
                    _ = this.inner.shutdown.cancelled() => break,
                    event = events.recv() => match event {
                        Ok(event) => event,
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                };
                match event {
                    AdapterEvent::Completed => {
                        if this.mode().is_loop() {
                            this.replay_current().await.ok();
                        } else {
                            this.next().await.ok();
                        }
                    }
                    AdapterEvent::EngineError { message } => {
                        this.handle_engine_error(message);
                    }
                    AdapterEvent::StateChanged(state) => {
                        // While backgrounded the wake lock follows the
                        // playing state, so playback started from
                        // notification controls or a recovery path holds
                        // the device awake too.
                        if state.is_playing != was_playing
                            && this.inner.background.load(Ordering::SeqCst)
                        {
                            if state.is_playing {
                                this.inner.wake_lock.acquire().await.ok();
                            } else {
                                this.inner.wake_lock.release().await.ok();
                            }
                        }
                        was_playing = state.is_playing;
                    }
                }
            }
        });
    }

    /// Engine error policy: connectivity signatures go to the network retry
    /// path; everything else skips forward, since most playback failures
    /// are track-specific.
    fn handle_engine_error(&self, message: String) {
        let current_id = self.current_track().map(|t| t.id.to_string());
        if message_looks_like_network_error(&message) {
            warn!(%message, "Engine error classified as network failure");
            self.inner
                .bus
                .emit(CoreEvent::Playback(PlaybackEvent::Error {
                    track_id: current_id,
                    message,
                    recoverable: true,
                }))
                .ok();
            self.schedule_network_retry();
        } else {
            warn!(%message, "Engine error, skipping forward");
            self.inner
                .bus
                .emit(CoreEvent::Playback(PlaybackEvent::Error {
                    track_id: current_id,
                    message,
                    recoverable: true,
                }))
                .ok();
            self.schedule_skip_forward();
        }
    }

    fn spawn_stall_timer(&self) {
        let this = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(this.inner.config.stall_check_interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = this.inner.shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let state = this.inner.adapter.state();
                let stalled = this
                    .inner
                    .stall
                    .lock()
                    .sample(state.buffering, state.is_playing);
                if stalled {
                    info!(
                        buffering = state.buffering,
                        "Buffer stalled, nudging playback"
                    );
                    this.inner.adapter.pause().await.ok();
                    tokio::time::sleep(this.inner.config.stall_resume_delay).await;
                    this.inner.adapter.play().await.ok();
                }
            }
        });
    }

    /// Low-frequency probe of the API host. OS connectivity signals are not
    /// trusted as proof the streaming host is reachable; only a successful
    /// probe clears the network-error flag and restarts playback.
    fn spawn_connectivity_probe(&self) {
        let this = self.clone();
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(this.inner.config.connectivity_probe_interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = this.inner.shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if !this.inner.had_network_error.load(Ordering::SeqCst) {
                    continue;
                }
                let reachable = this
                    .inner
                    .network
                    .probe_host(this.inner.locator.base_url())
                    .await;
                if reachable {
                    info!("Streaming host reachable again, resuming playback");
                    this.inner.had_network_error.store(false, Ordering::SeqCst);
                    this.inner.retry_attempt.store(0, Ordering::SeqCst);
                    let track = this.inner.current.lock().clone();
                    if let Some(track) = track {
                        this.start_track(track).await.ok();
                    }
                }
            }
        });
    }

    /// Background watchdog for the platform quirk where playback sits at
    /// "completed" without the completion event ever arriving.
    fn start_watchdog(&self) {
        let token = CancellationToken::new();
        if let Some(previous) = self.inner.watchdog.lock().replace(token.clone()) {
            previous.cancel();
        }
        let this = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(this.inner.config.watchdog_interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = this.inner.shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let state = this.inner.adapter.state();
                if state.processing == ProcessingState::Completed && !state.is_playing {
                    warn!("Watchdog: playback stuck at completed, forcing advance");
                    if this.mode().is_loop() {
                        this.replay_current().await.ok();
                    } else {
                        this.next().await.ok();
                    }
                }
            }
        });
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn is_stale(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) != generation
    }

    fn notice(&self, track_id: Option<String>, message: &str) {
        self.inner
            .bus
            .emit(CoreEvent::Playback(PlaybackEvent::Notice {
                track_id,
                message: message.to_string(),
            }))
            .ok();
    }

    /// Push the current snapshot, track, and mode onto the bus.
    fn republish_state(&self) {
        let state = self.inner.adapter.state();
        self.inner
            .bus
            .emit(CoreEvent::Playback(PlaybackEvent::StateChanged {
                is_playing: state.is_playing,
                state: state.processing,
                buffering: state.buffering,
                position_ms: state.position.as_millis() as u64,
            }))
            .ok();
        if let Some(track) = self.current_track() {
            self.inner
                .bus
                .emit(CoreEvent::Playback(PlaybackEvent::TrackChanged {
                    track_id: track.id.to_string(),
                    title: track.title,
                    artist: track.artist,
                }))
                .ok();
        }
        self.inner
            .bus
            .emit(CoreEvent::Playback(PlaybackEvent::ModeChanged {
                mode: self.mode(),
            }))
            .ok();
    }
}
