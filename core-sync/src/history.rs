//! Persistence for past sync jobs.

use bridge_traits::storage::KeyValueStore;
use bridge_traits::time::{Clock, SystemClock};
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, SyncError};
use crate::job::{SyncJob, SyncJobId};

const HISTORY_KEY: &str = "sync.history";

/// Most recent jobs kept in the history list.
const HISTORY_LIMIT: usize = 50;

/// Stores recent sync jobs in the host key-value store, newest first.
pub struct SyncHistoryStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl SyncHistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Substitute the time source, mainly for tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn load(&self) -> Result<Vec<SyncJob>> {
        match self.store.get(HISTORY_KEY).await? {
            Some(value) => {
                serde_json::from_value(value).map_err(|e| SyncError::Store(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    /// Insert or update a job, keeping the list capped and newest first.
    ///
    /// Jobs the server returned without a start time are stamped locally so
    /// the history stays sortable.
    pub async fn record(&self, job: &SyncJob) -> Result<()> {
        let mut stamped = job.clone();
        if stamped.started_at.is_none() {
            stamped.started_at = Some(self.clock.now());
        }
        let mut jobs = self.load().await?;
        jobs.retain(|existing| existing.id != stamped.id);
        jobs.insert(0, stamped);
        jobs.truncate(HISTORY_LIMIT);
        self.save(&jobs).await
    }

    pub async fn find(&self, id: &SyncJobId) -> Result<Option<SyncJob>> {
        Ok(self.load().await?.into_iter().find(|job| &job.id == id))
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(HISTORY_KEY).await?;
        debug!("Cleared sync history");
        Ok(())
    }

    async fn save(&self, jobs: &[SyncJob]) -> Result<()> {
        let value = serde_json::to_value(jobs).map_err(|e| SyncError::Store(e.to_string()))?;
        self.store.set(HISTORY_KEY, value).await?;
        Ok(())
    }
}
