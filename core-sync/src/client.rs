//! Sync API client contract and REST implementation.
//!
//! The remote service is a black box reached over the bridge
//! [`HttpClient`]; hosts may substitute their own [`SyncClient`] (tests use
//! in-memory fakes). [`StreamLocator`] owns the one addressing rule the
//! playback side depends on: every track streams from
//! `{base_url}/stream/{track_id}`.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use core_library::models::{Track, TrackId};
use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, SyncError};
use crate::job::{SyncJob, SyncJobId};

/// One track-level failure reported by the sync service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackErrorEntry {
    pub id: TrackId,
    pub error_message: String,
}

/// Aggregate error report for a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TrackErrorReport {
    pub error_count: usize,
    #[serde(default)]
    pub tracks: Vec<TrackErrorEntry>,
}

/// Result of asking the service to re-fetch a single track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResyncOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Owns the per-track streaming URL pattern.
///
/// Both the cache manager (download source) and the orchestrator's network
/// fallback source rely on this contract staying stable.
#[derive(Debug, Clone)]
pub struct StreamLocator {
    base_url: String,
}

impl StreamLocator {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Streaming URL for a track: `{base_url}/stream/{track_id}`.
    pub fn stream_url(&self, id: &TrackId) -> String {
        format!("{}/stream/{}", self.base_url, id)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Client contract for the playlist-sync API.
#[async_trait]
pub trait SyncClient: Send + Sync {
    /// Fetch the authoritative track list of a playlist.
    async fn fetch_tracks(&self, playlist_id: &str) -> Result<Vec<Track>>;

    /// Kick off a server-side playlist import.
    async fn start_sync(&self, source_url: &str) -> Result<SyncJob>;

    /// Poll the status of a running import.
    async fn poll_sync_status(&self, job_id: &SyncJobId) -> Result<SyncJob>;

    /// Fetch per-track failures recorded during the last sync.
    async fn fetch_track_errors(&self, playlist_id: &str) -> Result<TrackErrorReport>;

    /// Ask the service to re-fetch one failed track.
    async fn resync_track(&self, track_id: &TrackId) -> Result<ResyncOutcome>;
}

#[derive(Serialize)]
struct StartSyncBody<'a> {
    source_url: &'a str,
}

/// REST implementation of [`SyncClient`] over the bridge HTTP client.
pub struct RestSyncClient {
    http: Arc<dyn HttpClient>,
    locator: StreamLocator,
}

impl RestSyncClient {
    pub fn new(http: Arc<dyn HttpClient>, locator: StreamLocator) -> Self {
        Self { http, locator }
    }

    pub fn locator(&self) -> &StreamLocator {
        &self.locator
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.locator.base_url(), path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = HttpRequest::new(HttpMethod::Get, self.url(path));
        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(SyncError::Http(format!(
                "GET {} returned {}",
                path, response.status
            )));
        }
        response
            .json()
            .map_err(|e| SyncError::InvalidResponse(e.to_string()))
    }

    async fn post_json<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = HttpRequest::new(HttpMethod::Post, self.url(path))
            .json(body)
            .map_err(|e| SyncError::InvalidResponse(e.to_string()))?;
        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(SyncError::Http(format!(
                "POST {} returned {}",
                path, response.status
            )));
        }
        response
            .json()
            .map_err(|e| SyncError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl SyncClient for RestSyncClient {
    async fn fetch_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        let tracks: Vec<Track> = self
            .get_json(&format!("/playlists/{}/tracks", playlist_id))
            .await?;
        debug!(playlist_id, count = tracks.len(), "Fetched track list");
        Ok(tracks)
    }

    async fn start_sync(&self, source_url: &str) -> Result<SyncJob> {
        let job: SyncJob = self
            .post_json("/sync", &StartSyncBody { source_url })
            .await?;
        info!(job_id = %job.id, source_url, "Started sync job");
        Ok(job)
    }

    async fn poll_sync_status(&self, job_id: &SyncJobId) -> Result<SyncJob> {
        let path = format!("/sync/{}", job_id);
        let request = HttpRequest::new(HttpMethod::Get, self.url(&path));
        let response = self.http.execute(request).await?;
        // Jobs expire server-side; a 404 is a distinct condition callers
        // stop polling on rather than a generic HTTP failure.
        if response.status == 404 {
            return Err(SyncError::JobNotFound(job_id.to_string()));
        }
        if !response.is_success() {
            return Err(SyncError::Http(format!(
                "GET {} returned {}",
                path, response.status
            )));
        }
        response
            .json()
            .map_err(|e| SyncError::InvalidResponse(e.to_string()))
    }

    async fn fetch_track_errors(&self, playlist_id: &str) -> Result<TrackErrorReport> {
        self.get_json(&format!("/playlists/{}/errors", playlist_id))
            .await
    }

    async fn resync_track(&self, track_id: &TrackId) -> Result<ResyncOutcome> {
        self.post_json(&format!("/tracks/{}/resync", track_id), &serde_json::json!({}))
            .await
    }
}

/// Poll a sync job until it reaches a terminal state, mirroring progress to
/// the event bus.
pub async fn poll_until_terminal(
    client: &dyn SyncClient,
    job_id: &SyncJobId,
    interval: Duration,
    bus: Option<&EventBus>,
) -> Result<SyncJob> {
    let mut last_percent = None;
    loop {
        let job = client.poll_sync_status(job_id).await?;

        if let Some(bus) = bus {
            let event = if job.status.is_terminal() {
                match job.status {
                    crate::job::SyncStatus::Completed => SyncEvent::Completed {
                        job_id: job.id.as_str().to_string(),
                        track_count: 0,
                    },
                    _ => SyncEvent::Failed {
                        job_id: job.id.as_str().to_string(),
                        message: job
                            .message
                            .clone()
                            .unwrap_or_else(|| "Sync failed".to_string()),
                    },
                }
            } else {
                SyncEvent::Progress {
                    job_id: job.id.as_str().to_string(),
                    percent: job.percent(),
                }
            };
            // Skip duplicate progress emissions.
            if !job.status.is_terminal() && last_percent == Some(job.percent()) {
                // fall through without emitting
            } else {
                bus.emit(CoreEvent::Sync(event)).ok();
            }
            last_percent = Some(job.percent());
        }

        if job.status.is_terminal() {
            if job.status == crate::job::SyncStatus::Failed {
                warn!(job_id = %job.id, message = ?job.message, "Sync job failed");
            }
            return Ok(job);
        }
        tokio::time::sleep(interval).await;
    }
}
