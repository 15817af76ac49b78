//! # Audio Cache Manager
//!
//! Downloads tracks from the streaming host and stores them as flat files
//! under the platform cache directory.
//!
//! The in-memory hint set is exactly that, a hint: every read re-verifies
//! existence and size against the filesystem and silently demotes stale
//! entries. Concurrent downloads of the same track are collapsed onto a
//! single shared transfer.

use crate::cache::config::CacheConfig;
use crate::cache::stats::CacheStats;
use crate::error::{PlaybackError, Result};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bridge_traits::network::NetworkMonitor;
use bridge_traits::storage::FileSystemAccess;
use core_library::models::{Track, TrackId};
use core_sync::StreamLocator;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

/// Output of a shared download; the error side is `Arc` so every waiter can
/// clone the same failure.
type DownloadResult = std::result::Result<PathBuf, Arc<PlaybackError>>;
type SharedDownload = Shared<BoxFuture<'static, DownloadResult>>;

/// Disk-backed audio cache with de-duplicated, retried downloads.
pub struct AudioCacheManager {
    config: Arc<CacheConfig>,
    fs: Arc<dyn FileSystemAccess>,
    http: Arc<dyn HttpClient>,
    network: Arc<dyn NetworkMonitor>,
    locator: StreamLocator,
    /// Ids believed cached; re-verified on every read.
    hints: Arc<Mutex<HashSet<TrackId>>>,
    /// In-flight downloads keyed by track id.
    pending: Arc<AsyncMutex<HashMap<TrackId, SharedDownload>>>,
}

impl AudioCacheManager {
    pub fn new(
        config: CacheConfig,
        fs: Arc<dyn FileSystemAccess>,
        http: Arc<dyn HttpClient>,
        network: Arc<dyn NetworkMonitor>,
        locator: StreamLocator,
    ) -> Self {
        Self {
            config: Arc::new(config),
            fs,
            http,
            network,
            locator,
            hints: Arc::new(Mutex::new(HashSet::new())),
            pending: Arc::new(AsyncMutex::new(HashMap::new())),
        }
    }

    /// Create the cache directory and rebuild the hint set from what is
    /// already on disk.
    pub async fn initialize(&self) -> Result<()> {
        let root = self.cache_root().await?;
        self.fs.create_dir_all(&root).await?;

        let suffix = format!(".{}", self.config.file_extension);
        let entries = self.fs.list_directory(&root).await?;
        let mut hints = HashSet::new();
        for path in &entries {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if let Some(id) = name
                    .strip_suffix(suffix.as_str())
                    .and_then(decode_file_stem)
                {
                    hints.insert(id);
                }
            }
        }
        let count = hints.len();
        *self.hints.lock() = hints;
        info!(cache_root = %root.display(), count, "Audio cache initialized");
        Ok(())
    }

    /// Whether a verified cached copy of the track exists right now.
    ///
    /// A hint whose backing file is missing or empty is dropped and the
    /// answer is `false` (self-healing against out-of-band deletion).
    pub async fn is_cached(&self, track_id: &TrackId) -> bool {
        if !self.hints.lock().contains(track_id) {
            return false;
        }
        match self.verified_path(track_id).await {
            Some(_) => true,
            None => {
                debug!(%track_id, "Stale cache hint dropped");
                self.hints.lock().remove(track_id);
                false
            }
        }
    }

    /// Path of the cached file, when a verified copy exists.
    pub async fn cache_file(&self, track_id: &TrackId) -> Option<PathBuf> {
        if self.is_cached(track_id).await {
            self.path_for(track_id).await.ok()
        } else {
            None
        }
    }

    /// Download a track into the cache, de-duplicating concurrent requests.
    ///
    /// Fails fast with [`PlaybackError::NetworkUnavailable`] while offline;
    /// otherwise retries with exponential backoff before surfacing
    /// [`PlaybackError::DownloadFailed`].
    pub async fn download_and_cache(&self, track: &Track) -> Result<PathBuf> {
        let id = track.id.clone();
        if let Some(path) = self.cache_file(&id).await {
            return Ok(path);
        }

        let shared = {
            let mut pending = self.pending.lock().await;
            match pending.get(&id) {
                Some(existing) => existing.clone(),
                None => {
                    let fut = Self::download_task(
                        self.config.clone(),
                        self.fs.clone(),
                        self.http.clone(),
                        self.network.clone(),
                        self.locator.clone(),
                        self.hints.clone(),
                        id.clone(),
                    )
                    .boxed()
                    .shared();
                    pending.insert(id.clone(), fut.clone());
                    fut
                }
            }
        };

        let result = shared.await;
        self.pending.lock().await.remove(&id);
        result.map_err(|err| clone_for_caller(&err))
    }

    /// Sequentially download up to `limit` uncached tracks, aborting the
    /// rest of the batch as soon as connectivity is lost.
    pub async fn preload_batch(&self, tracks: &[Track], limit: usize) {
        let mut started = 0usize;
        for track in tracks {
            if started >= limit {
                break;
            }
            if self.is_cached(&track.id).await {
                continue;
            }
            if !self.network.is_connected().await {
                debug!("Pre-cache batch aborted: offline");
                break;
            }
            started += 1;
            match self.download_and_cache(track).await {
                Ok(_) => {}
                Err(PlaybackError::NetworkUnavailable) => {
                    debug!("Pre-cache batch aborted: offline");
                    break;
                }
                Err(err) => {
                    warn!(track_id = %track.id, error = %err, "Pre-cache download failed");
                }
            }
        }
    }

    /// Delete every cached file and clear the hint set.
    pub async fn evict_all(&self) -> Result<()> {
        let root = self.cache_root().await?;
        if self.fs.exists(&root).await? {
            self.fs.delete_dir_all(&root).await?;
        }
        self.fs.create_dir_all(&root).await?;
        self.hints.lock().clear();
        info!("Audio cache evicted");
        Ok(())
    }

    /// Total bytes under the cache root. Per-file errors are skipped.
    pub async fn total_size(&self) -> Result<u64> {
        Ok(self.stats().await?.total_bytes)
    }

    /// Disk usage snapshot.
    pub async fn stats(&self) -> Result<CacheStats> {
        let root = self.cache_root().await?;
        if !self.fs.exists(&root).await? {
            return Ok(CacheStats::default());
        }
        let mut stats = CacheStats::default();
        for path in self.fs.list_directory(&root).await? {
            match self.fs.metadata(&path).await {
                Ok(meta) if !meta.is_directory => {
                    stats.cached_files += 1;
                    stats.total_bytes += meta.size;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Skipping unreadable cache entry");
                    stats.unreadable_files += 1;
                }
            }
        }
        Ok(stats)
    }

    async fn cache_root(&self) -> Result<PathBuf> {
        let base = self.fs.get_cache_directory().await?;
        Ok(base.join(&self.config.cache_directory))
    }

    async fn path_for(&self, track_id: &TrackId) -> Result<PathBuf> {
        let root = self.cache_root().await?;
        Ok(root.join(file_name(track_id, &self.config.file_extension)))
    }

    async fn verified_path(&self, track_id: &TrackId) -> Option<PathBuf> {
        let path = self.path_for(track_id).await.ok()?;
        if !self.fs.exists(&path).await.ok()? {
            return None;
        }
        let meta = self.fs.metadata(&path).await.ok()?;
        (meta.size > 0).then_some(path)
    }

    /// The actual transfer. Owns clones of everything it touches so the
    /// future is `'static` and can be shared between waiters.
    async fn download_task(
        config: Arc<CacheConfig>,
        fs: Arc<dyn FileSystemAccess>,
        http: Arc<dyn HttpClient>,
        network: Arc<dyn NetworkMonitor>,
        locator: StreamLocator,
        hints: Arc<Mutex<HashSet<TrackId>>>,
        id: TrackId,
    ) -> DownloadResult {
        if !network.is_connected().await {
            return Err(Arc::new(PlaybackError::NetworkUnavailable));
        }

        let root = fs
            .get_cache_directory()
            .await
            .map(|base| base.join(&config.cache_directory))
            .map_err(|e| Arc::new(PlaybackError::from(e)))?;
        fs.create_dir_all(&root)
            .await
            .map_err(|e| Arc::new(PlaybackError::from(e)))?;

        let url = locator.stream_url(&id);
        let path = root.join(file_name(&id, &config.file_extension));
        let mut last_error = String::new();

        for attempt in 1..=config.max_retry_attempts {
            debug!(
                track_id = %id,
                attempt,
                max = config.max_retry_attempts,
                "Downloading track"
            );
            let request =
                HttpRequest::new(HttpMethod::Get, url.clone()).timeout(config.download_timeout);
            match http.execute(request).await {
                Ok(response) if response.is_success() && !response.body.is_empty() => {
                    fs.write_file(&path, response.body.clone())
                        .await
                        .map_err(|e| Arc::new(PlaybackError::from(e)))?;
                    hints.lock().insert(id.clone());
                    info!(track_id = %id, bytes = response.body.len(), "Track cached");
                    return Ok(path);
                }
                Ok(response) => {
                    last_error = if response.body.is_empty() && response.is_success() {
                        "empty response body".to_string()
                    } else {
                        format!("HTTP status {}", response.status)
                    };
                    warn!(track_id = %id, attempt, error = %last_error, "Download attempt failed");
                }
                Err(err) => {
                    last_error = err.to_string();
                    warn!(track_id = %id, attempt, error = %last_error, "Download attempt failed");
                }
            }
            if attempt < config.max_retry_attempts {
                tokio::time::sleep(config.backoff_delay(attempt)).await;
            }
        }

        Err(Arc::new(PlaybackError::DownloadFailed {
            track_id: id.to_string(),
            reason: last_error,
        }))
    }
}

/// Flat file name for a cached track: `{encoded id}.{ext}`.
///
/// ASCII alphanumerics and `-` pass through; every other byte is escaped
/// as `_xx` hex, so distinct ids never share a file.
fn file_name(id: &TrackId, extension: &str) -> String {
    use std::fmt::Write;

    let mut name = String::with_capacity(id.as_str().len() + extension.len() + 1);
    for byte in id.as_str().bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' => name.push(byte as char),
            other => {
                let _ = write!(name, "_{other:02x}");
            }
        }
    }
    name.push('.');
    name.push_str(extension);
    name
}

/// Inverse of the [`file_name`] encoding. `None` for stems that are not a
/// well-formed encoding (foreign files in the cache directory).
fn decode_file_stem(stem: &str) -> Option<TrackId> {
    let mut bytes = Vec::with_capacity(stem.len());
    let mut input = stem.bytes();
    while let Some(byte) = input.next() {
        if byte == b'_' {
            let pair = [input.next()?, input.next()?];
            let pair = std::str::from_utf8(&pair).ok()?;
            bytes.push(u8::from_str_radix(pair, 16).ok()?);
        } else {
            bytes.push(byte);
        }
    }
    String::from_utf8(bytes).ok().map(TrackId::from)
}

/// Rebuild a caller-owned error from the shared `Arc` one, keeping the
/// variants recovery logic dispatches on.
fn clone_for_caller(err: &PlaybackError) -> PlaybackError {
    match err {
        PlaybackError::NetworkUnavailable => PlaybackError::NetworkUnavailable,
        PlaybackError::DownloadFailed { track_id, reason } => PlaybackError::DownloadFailed {
            track_id: track_id.clone(),
            reason: reason.clone(),
        },
        other => PlaybackError::CacheError(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_escapes_path_hostile_ids() {
        let id = TrackId::from("a/b..c");
        assert_eq!(file_name(&id, "audio"), "a_2fb_2e_2ec.audio");
    }

    #[test]
    fn file_name_keeps_distinct_ids_distinct() {
        // "a/b" and "a_b" must not share one cache entry.
        assert_ne!(
            file_name(&TrackId::from("a/b"), "audio"),
            file_name(&TrackId::from("a_b"), "audio")
        );
    }

    #[test]
    fn file_stem_decodes_back_to_the_id() {
        for raw in ["plain-id", "a/b..c", "sp ace", "under_score", "ünïcode"] {
            let id = TrackId::from(raw);
            let name = file_name(&id, "audio");
            let stem = name.strip_suffix(".audio").unwrap();
            assert_eq!(decode_file_stem(stem), Some(id));
        }
    }

    #[test]
    fn foreign_file_stems_are_ignored() {
        assert_eq!(decode_file_stem("trailing_"), None);
        assert_eq!(decode_file_stem("bad_zz"), None);
    }

    #[test]
    fn shared_error_clone_keeps_variant() {
        let cloned = clone_for_caller(&PlaybackError::NetworkUnavailable);
        assert!(matches!(cloned, PlaybackError::NetworkUnavailable));

        let cloned = clone_for_caller(&PlaybackError::DownloadFailed {
            track_id: "t1".to_string(),
            reason: "HTTP status 503".to_string(),
        });
        assert!(matches!(cloned, PlaybackError::DownloadFailed { .. }));
    }
}
