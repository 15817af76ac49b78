//! JSON File Key-Value Store

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::KeyValueStore,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

/// Key-value store persisted as a single JSON file.
///
/// The whole map is rewritten on every mutation. That is fine at the scale
/// of a track collection and keeps the on-disk format trivially inspectable;
/// mobile hosts replace this with their platform stores.
pub struct JsonFileStore {
    path: PathBuf,
    // Guards the read-modify-write cycle on the backing file.
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store backed by the given file. The file is created lazily
    /// on first write.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    async fn load_map(&self) -> Result<BTreeMap<String, Value>> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => serde_json::from_slice(&data).map_err(|e| {
                BridgeError::OperationFailed(format!("Corrupt store file: {}", e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    async fn save_map(&self, map: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(map)
            .map_err(|e| BridgeError::OperationFailed(format!("Serialize failed: {}", e)))?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        Ok(self.load_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.load_map().await?;
        map.insert(key.to_string(), value);
        self.save_map(&map).await?;
        debug!(key, "Stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.load_map().await?;
        if map.remove(key).is_some() {
            self.save_map(&map).await?;
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load_map().await?.into_keys().collect())
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.save_map(&BTreeMap::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_get_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("library.json"));

        assert!(store.get("tracks").await.unwrap().is_none());
        store.set("tracks", json!([{"id": "t1"}])).await.unwrap();
        assert_eq!(
            store.get("tracks").await.unwrap().unwrap(),
            json!([{"id": "t1"}])
        );

        store.remove("tracks").await.unwrap();
        assert!(store.get("tracks").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        {
            let store = JsonFileStore::new(path.clone());
            store.set("playlists", json!({"count": 2})).await.unwrap();
        }
        let reopened = JsonFileStore::new(path);
        assert_eq!(
            reopened.get("playlists").await.unwrap().unwrap(),
            json!({"count": 2})
        );
    }
}
