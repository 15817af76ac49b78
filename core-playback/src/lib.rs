//! # Playback Module
//!
//! Playback orchestration and the disk-backed audio cache.
//!
//! ## Overview
//!
//! This module handles:
//! - The playback queue with linear/shuffled orderings and loop mode
//! - Disk caching of downloaded audio with de-duplicated, retried transfers
//! - The engine adapter translating raw engine events into published state
//! - The orchestrator: play/skip/toggle intents, stall recovery, network
//!   retry, skip-forward past bad tracks, background watchdog

pub mod cache;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod queue;
pub mod recovery;

pub use cache::{AudioCacheManager, CacheConfig, CacheStats};
pub use engine::{AdapterEvent, EngineAdapter, PlayerState};
pub use error::{PlaybackError, Result};
pub use orchestrator::PlayerOrchestrator;
pub use queue::{Direction, PlaybackQueue};
pub use recovery::{SkipGuard, StallDetector};
