//! Persistence wrappers over the key-value JSON store.
//!
//! The host's [`KeyValueStore`] is the single black-box persistence surface;
//! this module owns the record schemas and keys. The ignored-track index is
//! deliberately NOT stored: it is rebuilt from the `ignored` flag on every
//! load, so the flag on the record stays the only source of truth.

use crate::error::{LibraryError, Result};
use crate::models::{Playlist, Track, TrackId};
use bridge_traits::storage::KeyValueStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

const TRACKS_KEY: &str = "library.tracks";
const PLAYLISTS_KEY: &str = "library.playlists";

/// Typed persistence for the track and playlist collections.
pub struct LibraryStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LibraryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load the persisted track collection. Missing key means empty library.
    pub async fn load_tracks(&self) -> Result<Vec<Track>> {
        match self.kv.get(TRACKS_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the persisted track collection.
    pub async fn save_tracks(&self, tracks: &[Track]) -> Result<()> {
        let value = serde_json::to_value(tracks)?;
        self.kv.set(TRACKS_KEY, value).await?;
        debug!(count = tracks.len(), "Saved track collection");
        Ok(())
    }

    /// Supersede a single track by id, appending when absent.
    pub async fn upsert_track(&self, track: Track) -> Result<()> {
        let mut tracks = self.load_tracks().await?;
        match tracks.iter_mut().find(|t| t.id == track.id) {
            Some(slot) => *slot = track,
            None => tracks.push(track),
        }
        self.save_tracks(&tracks).await
    }

    /// Derived index of ignored track ids, rebuilt from the flags.
    ///
    /// Never persisted and never independently authoritative.
    pub fn ignored_index(tracks: &[Track]) -> HashSet<TrackId> {
        tracks
            .iter()
            .filter(|t| t.ignored)
            .map(|t| t.id.clone())
            .collect()
    }

    /// Load the persisted playlist collection.
    pub async fn load_playlists(&self) -> Result<Vec<Playlist>> {
        match self.kv.get(PLAYLISTS_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the persisted playlist collection.
    pub async fn save_playlists(&self, playlists: &[Playlist]) -> Result<()> {
        let value = serde_json::to_value(playlists)?;
        self.kv.set(PLAYLISTS_KEY, value).await?;
        Ok(())
    }

    /// Drop every persisted record.
    pub async fn clear(&self) -> Result<()> {
        self.kv
            .clear()
            .await
            .map_err(|e| LibraryError::Store(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MemoryKv {
        map: Mutex<HashMap<String, Value>>,
    }

    #[async_trait]
    impl KeyValueStore for MemoryKv {
        async fn get(&self, key: &str) -> bridge_traits::error::Result<Option<Value>> {
            Ok(self.map.lock().await.get(key).cloned())
        }

        async fn set(&self, key: &str, value: Value) -> bridge_traits::error::Result<()> {
            self.map.lock().await.insert(key.to_string(), value);
            Ok(())
        }

        async fn remove(&self, key: &str) -> bridge_traits::error::Result<()> {
            self.map.lock().await.remove(key);
            Ok(())
        }

        async fn keys(&self) -> bridge_traits::error::Result<Vec<String>> {
            Ok(self.map.lock().await.keys().cloned().collect())
        }

        async fn clear(&self) -> bridge_traits::error::Result<()> {
            self.map.lock().await.clear();
            Ok(())
        }
    }

    fn store() -> LibraryStore {
        LibraryStore::new(Arc::new(MemoryKv::default()))
    }

    #[tokio::test]
    async fn empty_store_loads_empty_collections() {
        let store = store();
        assert!(store.load_tracks().await.unwrap().is_empty());
        assert!(store.load_playlists().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_supersedes_by_id() {
        let store = store();
        store
            .save_tracks(&[Track::new("t1", "Old Title", "Artist")])
            .await
            .unwrap();

        store
            .upsert_track(Track::new("t1", "New Title", "Artist").with_error("bad stream"))
            .await
            .unwrap();
        store
            .upsert_track(Track::new("t2", "Other", "Artist"))
            .await
            .unwrap();

        let tracks = store.load_tracks().await.unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "New Title");
        assert!(tracks[0].has_error);
    }

    #[tokio::test]
    async fn ignored_index_is_rebuilt_from_flags() {
        let tracks = vec![
            Track::new("t1", "A", "X"),
            Track::new("t2", "B", "X").with_ignored(true),
            Track::new("t3", "C", "X").with_ignored(true),
        ];
        let index = LibraryStore::ignored_index(&tracks);
        assert_eq!(index.len(), 2);
        assert!(index.contains(&TrackId::from("t2")));
        assert!(!index.contains(&TrackId::from("t1")));
    }
}
