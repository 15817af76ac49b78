//! Sync job model.
//!
//! A sync job is created server-side when a playlist import starts; the
//! client only ever polls its status. Job ids are opaque server-issued
//! strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SyncError;

/// Opaque, server-issued identifier for a sync job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncJobId(String);

impl SyncJobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SyncJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SyncJobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The current status of a sync job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Job has been accepted but not yet started
    Queued,
    /// Job is currently running
    Running,
    /// Job completed successfully
    Completed,
    /// Job failed with an error
    Failed,
}

impl SyncStatus {
    /// Check if this status represents a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncStatus::Completed | SyncStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Queued => "queued",
            SyncStatus::Running => "running",
            SyncStatus::Completed => "completed",
            SyncStatus::Failed => "failed",
        }
    }
}

impl FromStr for SyncStatus {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queued" | "pending" => Ok(SyncStatus::Queued),
            "running" => Ok(SyncStatus::Running),
            "completed" => Ok(SyncStatus::Completed),
            "failed" => Ok(SyncStatus::Failed),
            other => Err(SyncError::InvalidResponse(format!(
                "Unknown sync status: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A playlist sync job as reported by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncJob {
    pub id: SyncJobId,
    pub status: SyncStatus,
    /// Progress fraction in `[0.0, 1.0]`.
    #[serde(default)]
    pub progress: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

impl SyncJob {
    /// Progress as an integer percentage clamped to `0..=100`.
    pub fn percent(&self) -> u8 {
        (self.progress.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(SyncStatus::Completed.is_terminal());
        assert!(SyncStatus::Failed.is_terminal());
        assert!(!SyncStatus::Queued.is_terminal());
        assert!(!SyncStatus::Running.is_terminal());
    }

    #[test]
    fn status_parses_api_spellings() {
        assert_eq!("pending".parse::<SyncStatus>().unwrap(), SyncStatus::Queued);
        assert_eq!(
            "Completed".parse::<SyncStatus>().unwrap(),
            SyncStatus::Completed
        );
        assert!("exploded".parse::<SyncStatus>().is_err());
    }

    #[test]
    fn percent_is_clamped() {
        let mut job = SyncJob {
            id: SyncJobId::from("j1"),
            status: SyncStatus::Running,
            progress: 0.42,
            message: None,
            source_url: None,
            started_at: None,
        };
        assert_eq!(job.percent(), 42);
        job.progress = 1.7;
        assert_eq!(job.percent(), 100);
        job.progress = -0.3;
        assert_eq!(job.percent(), 0);
    }
}
