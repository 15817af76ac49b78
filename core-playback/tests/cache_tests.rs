//! Cache manager behavior: self-healing hints, download de-duplication,
//! retry/backoff, offline fail-fast, batch pre-caching, eviction.

mod common;

use common::{CannedResponse, FakeNetwork, MemoryFs, ScriptedHttp};
use core_library::models::Track;
use core_playback::cache::{AudioCacheManager, CacheConfig};
use core_playback::error::PlaybackError;
use core_sync::StreamLocator;
use std::path::Path;
use std::sync::Arc;

fn manager(
    fs: Arc<MemoryFs>,
    http: Arc<ScriptedHttp>,
    network: Arc<FakeNetwork>,
) -> AudioCacheManager {
    AudioCacheManager::new(
        CacheConfig::default().with_cache_directory("audio"),
        fs,
        http,
        network,
        StreamLocator::new("https://api.example.com"),
    )
}

fn track(id: &str) -> Track {
    Track::new(id, format!("Title {id}"), "Artist")
}

#[tokio::test]
async fn initialize_rebuilds_hints_from_disk() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_file("/cache/audio/t1.audio", b"bytes");
    let cache = manager(fs, Arc::new(ScriptedHttp::new()), Arc::new(FakeNetwork::online()));

    cache.initialize().await.unwrap();
    assert!(cache.is_cached(&"t1".into()).await);
    assert!(!cache.is_cached(&"t2".into()).await);
}

#[tokio::test]
async fn is_cached_self_heals_after_out_of_band_deletion() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_file("/cache/audio/t1.audio", b"bytes");
    let cache = manager(
        fs.clone(),
        Arc::new(ScriptedHttp::new()),
        Arc::new(FakeNetwork::online()),
    );
    cache.initialize().await.unwrap();
    assert!(cache.is_cached(&"t1".into()).await);

    fs.remove_file(Path::new("/cache/audio/t1.audio"));
    assert!(!cache.is_cached(&"t1".into()).await);
    // The hint is gone too, not just the answer.
    assert!(cache.cache_file(&"t1".into()).await.is_none());
}

#[tokio::test]
async fn empty_file_is_not_trusted() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_file("/cache/audio/t1.audio", b"");
    let cache = manager(fs, Arc::new(ScriptedHttp::new()), Arc::new(FakeNetwork::online()));
    cache.initialize().await.unwrap();

    assert!(!cache.is_cached(&"t1".into()).await);
}

#[tokio::test(start_paused = true)]
async fn concurrent_downloads_share_one_transfer() {
    let http = Arc::new(ScriptedHttp::new());
    let cache = Arc::new(manager(
        Arc::new(MemoryFs::new()),
        http.clone(),
        Arc::new(FakeNetwork::online()),
    ));
    cache.initialize().await.unwrap();

    let t = track("t1");
    let (a, b) = tokio::join!(cache.download_and_cache(&t), cache.download_and_cache(&t));
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(http.call_count(), 1);
    assert!(cache.is_cached(&"t1".into()).await);
}

#[tokio::test]
async fn offline_download_fails_fast() {
    let http = Arc::new(ScriptedHttp::new());
    let cache = manager(
        Arc::new(MemoryFs::new()),
        http.clone(),
        Arc::new(FakeNetwork::offline()),
    );
    cache.initialize().await.unwrap();

    let err = cache.download_and_cache(&track("t1")).await.unwrap_err();
    assert!(matches!(err, PlaybackError::NetworkUnavailable));
    assert_eq!(http.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn download_retries_then_succeeds() {
    let http = Arc::new(ScriptedHttp::new());
    http.push(CannedResponse::Error("connection reset".to_string()));
    http.push(CannedResponse::Status(503, bytes::Bytes::new()));
    let cache = manager(
        Arc::new(MemoryFs::new()),
        http.clone(),
        Arc::new(FakeNetwork::online()),
    );
    cache.initialize().await.unwrap();

    cache.download_and_cache(&track("t1")).await.unwrap();
    assert_eq!(http.call_count(), 3);
    assert!(cache.is_cached(&"t1".into()).await);
}

#[tokio::test(start_paused = true)]
async fn download_surfaces_failure_after_exhausted_retries() {
    let http = Arc::new(ScriptedHttp::new());
    for _ in 0..3 {
        http.push(CannedResponse::Status(500, bytes::Bytes::new()));
    }
    let cache = manager(
        Arc::new(MemoryFs::new()),
        http.clone(),
        Arc::new(FakeNetwork::online()),
    );
    cache.initialize().await.unwrap();

    let err = cache.download_and_cache(&track("t1")).await.unwrap_err();
    assert!(matches!(err, PlaybackError::DownloadFailed { .. }));
    assert_eq!(http.call_count(), 3);
    assert!(!cache.is_cached(&"t1".into()).await);
}

#[tokio::test(start_paused = true)]
async fn preload_batch_aborts_when_connectivity_drops() {
    let http = Arc::new(ScriptedHttp::new());
    let network = Arc::new(FakeNetwork::online());
    // First track: pre-check and in-download check pass; second track's
    // pre-check sees the link gone.
    network.script_connectivity(&[true, true, false]);
    let cache = manager(Arc::new(MemoryFs::new()), http.clone(), network);
    cache.initialize().await.unwrap();

    let tracks = vec![track("a"), track("b"), track("c")];
    cache.preload_batch(&tracks, 3).await;

    assert_eq!(http.call_count(), 1);
    assert!(cache.is_cached(&"a".into()).await);
    assert!(!cache.is_cached(&"b".into()).await);
}

#[tokio::test(start_paused = true)]
async fn preload_batch_respects_limit_and_skips_cached() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_file("/cache/audio/a.audio", b"bytes");
    let http = Arc::new(ScriptedHttp::new());
    let cache = manager(fs, http.clone(), Arc::new(FakeNetwork::online()));
    cache.initialize().await.unwrap();

    let tracks = vec![track("a"), track("b"), track("c"), track("d")];
    cache.preload_batch(&tracks, 2).await;

    // "a" was already cached; only two downloads run.
    assert_eq!(http.call_count(), 2);
    assert!(cache.is_cached(&"b".into()).await);
    assert!(cache.is_cached(&"c".into()).await);
    assert!(!cache.is_cached(&"d".into()).await);
}

#[tokio::test]
async fn evict_all_clears_store_and_hints() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_file("/cache/audio/a.audio", b"bytes");
    fs.insert_file("/cache/audio/b.audio", b"bytes");
    let cache = manager(
        fs.clone(),
        Arc::new(ScriptedHttp::new()),
        Arc::new(FakeNetwork::online()),
    );
    cache.initialize().await.unwrap();

    cache.evict_all().await.unwrap();
    assert!(!cache.is_cached(&"a".into()).await);
    assert_eq!(fs.file_count(), 0);
    assert_eq!(cache.total_size().await.unwrap(), 0);
}

#[tokio::test]
async fn total_size_skips_unreadable_entries() {
    let fs = Arc::new(MemoryFs::new());
    fs.insert_file("/cache/audio/a.audio", b"12345");
    fs.insert_file("/cache/audio/b.audio", b"123");
    fs.insert_file("/cache/audio/c.audio", b"1");
    fs.break_metadata("/cache/audio/c.audio");
    let cache = manager(fs, Arc::new(ScriptedHttp::new()), Arc::new(FakeNetwork::online()));
    cache.initialize().await.unwrap();

    assert_eq!(cache.total_size().await.unwrap(), 8);
    let stats = cache.stats().await.unwrap();
    assert_eq!(stats.cached_files, 2);
    assert_eq!(stats.unreadable_files, 1);
}
