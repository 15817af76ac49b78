//! # Engine Adapter
//!
//! Translation layer between the raw platform engine event stream and the
//! published playback vocabulary. Computes the buffering fraction, maps the
//! engine's native states 1:1 to [`ProcessingState`], and publishes a
//! unified [`PlayerState`] snapshot on every underlying event.
//!
//! No retry or recovery logic lives here; failures are surfaced as
//! [`AdapterEvent`]s for the orchestrator to act on.

use bridge_traits::engine::{AudioEngine, AudioSource, EngineEvent, EngineState};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, ProcessingState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::Result;

/// Unified playback snapshot. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub is_playing: bool,
    pub processing: ProcessingState,
    pub position: Duration,
    pub duration: Option<Duration>,
    /// Buffer fill fraction in `[0.0, 1.0]`; held at its last value while
    /// the duration is unknown.
    pub buffering: f32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            is_playing: false,
            processing: ProcessingState::Idle,
            position: Duration::ZERO,
            duration: None,
            buffering: 0.0,
        }
    }
}

/// Edge-triggered events the orchestrator reacts to.
#[derive(Debug, Clone)]
pub enum AdapterEvent {
    /// Snapshot changed (any field).
    StateChanged(PlayerState),
    /// The current source played to its end. Emitted once per completion.
    Completed,
    /// The engine reported an error.
    EngineError { message: String },
}

/// Wraps the black-box engine; commands pass through, events are translated.
pub struct EngineAdapter {
    engine: Arc<dyn AudioEngine>,
    state_rx: watch::Receiver<PlayerState>,
    events_tx: broadcast::Sender<AdapterEvent>,
    shutdown: CancellationToken,
}

impl EngineAdapter {
    /// Wrap an engine and start the translation pump.
    ///
    /// When `bus` is provided, every snapshot is mirrored onto it as
    /// [`PlaybackEvent::StateChanged`] / [`PlaybackEvent::PositionChanged`].
    pub fn new(engine: Arc<dyn AudioEngine>, bus: Option<Arc<EventBus>>) -> Self {
        let (state_tx, state_rx) = watch::channel(PlayerState::default());
        let (events_tx, _) = broadcast::channel(64);
        let shutdown = CancellationToken::new();

        tokio::spawn(Self::pump(
            engine.events(),
            state_tx,
            events_tx.clone(),
            bus,
            shutdown.clone(),
        ));

        Self {
            engine,
            state_rx,
            events_tx,
            shutdown,
        }
    }

    /// Latest published snapshot.
    pub fn state(&self) -> PlayerState {
        self.state_rx.borrow().clone()
    }

    /// Watch channel of snapshots, for timers that poll current state.
    pub fn watch_state(&self) -> watch::Receiver<PlayerState> {
        self.state_rx.clone()
    }

    /// Subscribe to edge-triggered adapter events.
    pub fn subscribe(&self) -> broadcast::Receiver<AdapterEvent> {
        self.events_tx.subscribe()
    }

    pub async fn load(&self, source: AudioSource) -> Result<()> {
        debug!(remote = source.is_remote(), "Loading source");
        Ok(self.engine.load(source).await?)
    }

    pub async fn play(&self) -> Result<()> {
        Ok(self.engine.play().await?)
    }

    pub async fn pause(&self) -> Result<()> {
        Ok(self.engine.pause().await?)
    }

    pub async fn stop(&self) -> Result<()> {
        Ok(self.engine.stop().await?)
    }

    pub async fn seek(&self, position: Duration) -> Result<()> {
        Ok(self.engine.seek(position).await?)
    }

    pub async fn set_looping(&self, looping: bool) -> Result<()> {
        Ok(self.engine.set_looping(looping).await?)
    }

    /// Stop the translation pump.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    async fn pump(
        mut events: broadcast::Receiver<EngineEvent>,
        state_tx: watch::Sender<PlayerState>,
        events_tx: broadcast::Sender<AdapterEvent>,
        bus: Option<Arc<EventBus>>,
        shutdown: CancellationToken,
    ) {
        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        debug!(missed = n, "Engine event stream lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };

            let mut state = state_tx.borrow().clone();
            let previous_processing = state.processing;
            let mut position_tick = None;

            match event {
                EngineEvent::StateChanged(native) => {
                    state.processing = translate_state(native);
                }
                EngineEvent::PlayingChanged(playing) => {
                    state.is_playing = playing;
                }
                EngineEvent::PositionTick {
                    position,
                    buffered,
                    duration,
                } => {
                    state.position = position;
                    state.duration = duration;
                    state.buffering = buffering_fraction(buffered, duration, state.buffering);
                    position_tick = Some((position, duration));
                }
                EngineEvent::Error { message } => {
                    trace!(%message, "Engine error event");
                    events_tx.send(AdapterEvent::EngineError { message }).ok();
                    continue;
                }
            }

            state_tx.send_replace(state.clone());
            events_tx
                .send(AdapterEvent::StateChanged(state.clone()))
                .ok();

            // Completion is edge-triggered so the orchestrator advances once
            // per finished source, not once per duplicate state report.
            if state.processing == ProcessingState::Completed
                && previous_processing != ProcessingState::Completed
            {
                events_tx.send(AdapterEvent::Completed).ok();
            }

            if let Some(bus) = &bus {
                if let Some((position, duration)) = position_tick {
                    bus.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                        position_ms: position.as_millis() as u64,
                        duration_ms: duration.map(|d| d.as_millis() as u64),
                    }))
                    .ok();
                }
                bus.emit(CoreEvent::Playback(PlaybackEvent::StateChanged {
                    is_playing: state.is_playing,
                    state: state.processing,
                    buffering: state.buffering,
                    position_ms: state.position.as_millis() as u64,
                }))
                .ok();
            }
        }
    }
}

/// 1:1 mapping from the engine's native states.
fn translate_state(native: EngineState) -> ProcessingState {
    match native {
        EngineState::Idle => ProcessingState::Idle,
        EngineState::Loading => ProcessingState::Loading,
        EngineState::Buffering => ProcessingState::Buffering,
        EngineState::Ready => ProcessingState::Ready,
        EngineState::Completed => ProcessingState::Completed,
    }
}

/// `buffered / duration` when the duration is known and positive, else the
/// previous value. Clamped to `[0.0, 1.0]`.
fn buffering_fraction(buffered: Duration, duration: Option<Duration>, previous: f32) -> f32 {
    match duration {
        Some(total) if !total.is_zero() => {
            (buffered.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
        }
        _ => previous,
    }
}
