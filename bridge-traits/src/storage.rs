//! Storage and File System Abstractions
//!
//! Platform-agnostic traits for file I/O (the audio cache's backing store)
//! and JSON key-value persistence (the app-level record store).

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File metadata information
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub modified_at: Option<i64>,
    pub is_directory: bool,
}

/// File system access trait
///
/// Abstracts file I/O operations to support different platforms:
/// - Desktop: direct filesystem access
/// - iOS/Android: sandboxed app directories
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn cache_data(fs: &dyn FileSystemAccess, data: &[u8]) -> Result<()> {
///     let cache_dir = fs.get_cache_directory().await?;
///     let file_path = cache_dir.join("data.bin");
///     fs.write_file(&file_path, data.into()).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Get the application's cache directory
    ///
    /// This directory is suitable for files that may be deleted by the
    /// system when storage is low; the core never assumes its contents
    /// survive between runs.
    async fn get_cache_directory(&self) -> Result<PathBuf>;

    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Get metadata for a file or directory
    async fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    /// Create a directory and all parent directories if they don't exist
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Read entire file contents into memory
    async fn read_file(&self, path: &Path) -> Result<Bytes>;

    /// Write data to a file, creating it if it doesn't exist
    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()>;

    /// Delete a file
    async fn delete_file(&self, path: &Path) -> Result<()>;

    /// Delete a directory and all its contents
    async fn delete_dir_all(&self, path: &Path) -> Result<()>;

    /// List all entries in a directory
    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// JSON key-value persistence trait
///
/// The app-level record store (track collection, playlists, sync history) is
/// a black box behind this trait:
/// - Desktop: a JSON file per namespace
/// - iOS/Android: SharedPreferences/UserDefaults-backed stores or an
///   embedded database
///
/// Values are `serde_json::Value` so callers own their schemas; higher-level
/// typed wrappers live in `core-library`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value, `None` when absent
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Store a value, replacing any previous one
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<()>;

    /// Delete a key; absent keys are not an error
    async fn remove(&self, key: &str) -> Result<()>;

    /// List all present keys
    async fn keys(&self) -> Result<Vec<String>>;

    /// Remove every key
    async fn clear(&self) -> Result<()>;
}
