//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{FileMetadata, FileSystemAccess},
};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::fs;
use tracing::debug;

/// Tokio-based file system implementation
///
/// Provides async file I/O rooted at a platform cache directory.
pub struct TokioFileSystem {
    cache_dir: PathBuf,
}

impl TokioFileSystem {
    /// Create a new file system accessor with the default cache directory
    pub fn new() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("streaming-client-core");
        Self { cache_dir }
    }

    /// Create a new file system accessor rooted at a custom directory
    pub fn with_cache_directory(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }
}

impl Default for TokioFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn get_cache_directory(&self) -> Result<PathBuf> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir).await?;
            debug!(path = ?self.cache_dir, "Created cache directory");
        }
        Ok(self.cache_dir.clone())
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(fs::try_exists(path).await.unwrap_or(false))
    }

    async fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let meta = fs::metadata(path).await?;
        let modified_at = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64);
        Ok(FileMetadata {
            size: meta.len(),
            modified_at,
            is_directory: meta.is_dir(),
        })
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).await.map_err(BridgeError::Io)
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        let data = fs::read(path).await?;
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, &data).await.map_err(BridgeError::Io)
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.map_err(BridgeError::Io)
    }

    async fn delete_dir_all(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path).await.map_err(BridgeError::Io)
    }

    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(path).await?;
        let mut result = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            result.push(entry.path());
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_read_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::with_cache_directory(dir.path().to_path_buf());
        let path = dir.path().join("track.audio");

        fs.write_file(&path, Bytes::from_static(b"pcm")).await.unwrap();
        assert!(fs.exists(&path).await.unwrap());
        assert_eq!(fs.metadata(&path).await.unwrap().size, 3);
        assert_eq!(fs.read_file(&path).await.unwrap(), Bytes::from_static(b"pcm"));

        fs.delete_file(&path).await.unwrap();
        assert!(!fs.exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn list_directory_sees_new_files() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::with_cache_directory(dir.path().to_path_buf());
        fs.write_file(&dir.path().join("a.audio"), Bytes::from_static(b"a"))
            .await
            .unwrap();
        fs.write_file(&dir.path().join("b.audio"), Bytes::from_static(b"b"))
            .await
            .unwrap();

        let entries = fs.list_directory(dir.path()).await.unwrap();
        assert_eq!(entries.len(), 2);
    }
}
