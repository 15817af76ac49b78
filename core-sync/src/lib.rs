//! # Core Sync
//!
//! Client-side collaborator for the remote playlist-sync API. The API
//! itself is a black box; this crate owns the [`SyncClient`] contract, the
//! [`SyncJob`](job::SyncJob) model, a REST implementation over the bridge
//! [`HttpClient`](bridge_traits::http::HttpClient), and the stream
//! addressing contract ([`StreamLocator`]) shared with the playback cache.

pub mod client;
pub mod error;
pub mod history;
pub mod job;

pub use client::{
    poll_until_terminal, RestSyncClient, ResyncOutcome, StreamLocator, SyncClient,
    TrackErrorEntry, TrackErrorReport,
};
pub use error::{Result, SyncError};
pub use history::SyncHistoryStore;
pub use job::{SyncJob, SyncJobId, SyncStatus};
