//! # Core Library
//!
//! Domain models for the streaming client (tracks, playlists) and thin
//! persistence wrappers over the host's key-value JSON store.
//!
//! Tracks are immutable values: status changes (`error`, `ignored`) produce
//! new values that supersede the old record in the persisted collection;
//! records are never deleted in place.

pub mod error;
pub mod models;
pub mod store;

pub use error::{LibraryError, Result};
pub use models::{Playlist, Track, TrackId};
pub use store::LibraryStore;
