//! Hand-rolled in-memory fakes for the bridge seams.
//!
//! No mocking framework; each fake records the calls the assertions need
//! and nothing more.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::background::WakeLock;
use bridge_traits::engine::{AudioEngine, AudioSource, EngineEvent};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::network::{NetworkInfo, NetworkMonitor, NetworkStatus, NetworkType};
use bridge_traits::storage::{FileMetadata, FileSystemAccess};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;

// ============================================================================
// Filesystem
// ============================================================================

/// In-memory filesystem rooted at `/cache`.
#[derive(Default)]
pub struct MemoryFs {
    files: Mutex<HashMap<PathBuf, Bytes>>,
    dirs: Mutex<HashSet<PathBuf>>,
    /// Paths whose metadata reads fail, for per-file error handling tests.
    broken: Mutex<HashSet<PathBuf>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_file(&self, path: impl Into<PathBuf>, data: &[u8]) {
        self.files
            .lock()
            .insert(path.into(), Bytes::copy_from_slice(data));
    }

    pub fn remove_file(&self, path: &Path) {
        self.files.lock().remove(path);
    }

    pub fn break_metadata(&self, path: impl Into<PathBuf>) {
        self.broken.lock().insert(path.into());
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().len()
    }
}

#[async_trait]
impl FileSystemAccess for MemoryFs {
    async fn get_cache_directory(&self) -> BridgeResult<PathBuf> {
        Ok(PathBuf::from("/cache"))
    }

    async fn exists(&self, path: &Path) -> BridgeResult<bool> {
        let files = self.files.lock();
        Ok(files.contains_key(path)
            || self.dirs.lock().contains(path)
            || files.keys().any(|p| p.starts_with(path)))
    }

    async fn metadata(&self, path: &Path) -> BridgeResult<FileMetadata> {
        if self.broken.lock().contains(path) {
            return Err(BridgeError::OperationFailed("metadata failed".to_string()));
        }
        if let Some(data) = self.files.lock().get(path) {
            return Ok(FileMetadata {
                size: data.len() as u64,
                modified_at: None,
                is_directory: false,
            });
        }
        if self.dirs.lock().contains(path) {
            return Ok(FileMetadata {
                size: 0,
                modified_at: None,
                is_directory: true,
            });
        }
        Err(BridgeError::NotAvailable(format!(
            "no such path: {}",
            path.display()
        )))
    }

    async fn create_dir_all(&self, path: &Path) -> BridgeResult<()> {
        self.dirs.lock().insert(path.to_path_buf());
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> BridgeResult<Bytes> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| BridgeError::NotAvailable(format!("no such file: {}", path.display())))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> BridgeResult<()> {
        self.files.lock().insert(path.to_path_buf(), data);
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> BridgeResult<()> {
        self.files.lock().remove(path);
        Ok(())
    }

    async fn delete_dir_all(&self, path: &Path) -> BridgeResult<()> {
        self.dirs.lock().remove(path);
        self.files.lock().retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    async fn list_directory(&self, path: &Path) -> BridgeResult<Vec<PathBuf>> {
        Ok(self
            .files
            .lock()
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect())
    }
}

// ============================================================================
// HTTP
// ============================================================================

pub enum CannedResponse {
    Status(u16, Bytes),
    Error(String),
}

/// Scripted HTTP client; when the script runs out, every request gets the
/// default response.
pub struct ScriptedHttp {
    script: Mutex<VecDeque<CannedResponse>>,
    default_body: Bytes,
    calls: AtomicUsize,
}

impl ScriptedHttp {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_body: Bytes::from_static(b"audio-bytes"),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, response: CannedResponse) {
        self.script.lock().push_back(response);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedHttp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().pop_front() {
            Some(CannedResponse::Status(status, body)) => Ok(HttpResponse {
                status,
                headers: HashMap::new(),
                body,
            }),
            Some(CannedResponse::Error(message)) => {
                Err(BridgeError::OperationFailed(message))
            }
            None => Ok(HttpResponse {
                status: 200,
                headers: HashMap::new(),
                body: self.default_body.clone(),
            }),
        }
    }
}

// ============================================================================
// Network
// ============================================================================

/// Network monitor with a settable flag and an optional per-call script
/// that overrides the flag until exhausted.
pub struct FakeNetwork {
    connected: AtomicBool,
    script: Mutex<VecDeque<bool>>,
    probe_result: AtomicBool,
}

impl FakeNetwork {
    pub fn online() -> Self {
        Self {
            connected: AtomicBool::new(true),
            script: Mutex::new(VecDeque::new()),
            probe_result: AtomicBool::new(true),
        }
    }

    pub fn offline() -> Self {
        let network = Self::online();
        network.connected.store(false, Ordering::SeqCst);
        network.probe_result.store(false, Ordering::SeqCst);
        network
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn set_probe_result(&self, reachable: bool) {
        self.probe_result.store(reachable, Ordering::SeqCst);
    }

    /// Queue connectivity answers consumed one per check.
    pub fn script_connectivity(&self, answers: &[bool]) {
        self.script.lock().extend(answers.iter().copied());
    }
}

#[async_trait]
impl NetworkMonitor for FakeNetwork {
    async fn get_network_info(&self) -> BridgeResult<NetworkInfo> {
        let connected = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.connected.load(Ordering::SeqCst));
        Ok(NetworkInfo {
            status: if connected {
                NetworkStatus::Connected
            } else {
                NetworkStatus::Disconnected
            },
            network_type: Some(NetworkType::WiFi),
            is_metered: false,
        })
    }

    async fn probe_host(&self, _url: &str) -> bool {
        self.probe_result.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Wake lock
// ============================================================================

#[derive(Default)]
pub struct FakeWakeLock {
    held: AtomicBool,
    acquires: AtomicUsize,
    releases: AtomicUsize,
}

impl FakeWakeLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire_count(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WakeLock for FakeWakeLock {
    async fn acquire(&self) -> BridgeResult<()> {
        if !self.held.swap(true, Ordering::SeqCst) {
            self.acquires.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn release(&self) -> BridgeResult<()> {
        if self.held.swap(false, Ordering::SeqCst) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Engine
// ============================================================================

#[derive(Debug, Clone)]
pub enum EngineCommand {
    Load(AudioSource),
    Play,
    Pause,
    Stop,
    Seek(Duration),
    SetLooping(bool),
}

/// Records every command and lets tests inject raw engine events.
pub struct FakeEngine {
    commands: Mutex<Vec<EngineCommand>>,
    events: broadcast::Sender<EngineEvent>,
    /// Error messages consumed by upcoming `load` calls.
    load_failures: Mutex<VecDeque<String>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            commands: Mutex::new(Vec::new()),
            events,
            load_failures: Mutex::new(VecDeque::new()),
        }
    }

    pub fn fail_next_load(&self, message: impl Into<String>) {
        self.load_failures.lock().push_back(message.into());
    }

    pub fn push_event(&self, event: EngineEvent) {
        self.events.send(event).ok();
    }

    pub fn commands(&self) -> Vec<EngineCommand> {
        self.commands.lock().clone()
    }

    pub fn last_load(&self) -> Option<AudioSource> {
        self.commands
            .lock()
            .iter()
            .rev()
            .find_map(|c| match c {
                EngineCommand::Load(source) => Some(source.clone()),
                _ => None,
            })
    }

    pub fn count_loads(&self) -> usize {
        self.commands
            .lock()
            .iter()
            .filter(|c| matches!(c, EngineCommand::Load(_)))
            .count()
    }
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioEngine for FakeEngine {
    async fn load(&self, source: AudioSource) -> BridgeResult<()> {
        self.commands.lock().push(EngineCommand::Load(source));
        if let Some(message) = self.load_failures.lock().pop_front() {
            return Err(BridgeError::EngineError(message));
        }
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        self.commands.lock().push(EngineCommand::Play);
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.commands.lock().push(EngineCommand::Pause);
        Ok(())
    }

    async fn stop(&self) -> BridgeResult<()> {
        self.commands.lock().push(EngineCommand::Stop);
        Ok(())
    }

    async fn seek(&self, position: Duration) -> BridgeResult<()> {
        self.commands.lock().push(EngineCommand::Seek(position));
        Ok(())
    }

    async fn set_looping(&self, looping: bool) -> BridgeResult<()> {
        self.commands.lock().push(EngineCommand::SetLooping(looping));
        Ok(())
    }

    fn events(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}
