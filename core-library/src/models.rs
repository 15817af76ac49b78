//! Domain models shared across the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, unique track identifier issued by the sync API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TrackId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A playable audio item with identity, display metadata, and status flags.
///
/// Immutable value: the `with_*` methods return a new value to substitute
/// for the old one in the persisted collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub has_error: bool,
    /// User-excluded from playback. Authoritative; any ignored-id index is
    /// derived from this flag, never the other way around.
    #[serde(default)]
    pub ignored: bool,
}

impl Track {
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            artwork_url: None,
            error_message: None,
            has_error: false,
            ignored: false,
        }
    }

    pub fn with_artwork(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    /// New value carrying an error status.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self.has_error = true;
        self
    }

    /// New value with the error status cleared.
    pub fn with_error_cleared(mut self) -> Self {
        self.error_message = None;
        self.has_error = false;
        self
    }

    /// New value with the ignored flag set or cleared.
    pub fn with_ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    /// Whether this track participates in playback orderings.
    pub fn is_playable(&self) -> bool {
        !self.ignored
    }
}

/// A named, ordered collection of tracks synced from a remote source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub track_ids: Vec<TrackId>,
}

impl Playlist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source_url: None,
            track_ids: Vec::new(),
        }
    }
}
