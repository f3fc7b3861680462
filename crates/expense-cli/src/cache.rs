//! Single-slot snapshot cache in front of the backend.
//!
//! There is no expiry. Commands that need fresh data ask for a forced
//! refresh, everything else reuses whatever was fetched last. Failed fetches
//! are never stored.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Local};
use expense_engine::{ExpenseRecord, ReportError};
use tokio::sync::Mutex;
use tracing::debug;

/// Anything that can produce the full record list.
pub trait RecordSource: Send + Sync {
    fn fetch_records(&self) -> impl Future<Output = Result<Vec<ExpenseRecord>, ReportError>> + Send;
}

/// One fetched record list and when it was fetched.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Arc<Vec<ExpenseRecord>>,
    pub fetched_at: DateTime<Local>,
}

pub struct SnapshotCache<S> {
    source: S,
    slot: Mutex<Option<Snapshot>>,
}

impl<S: RecordSource> SnapshotCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            slot: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The cached snapshot, or a fresh one when empty or `force_refresh` is set.
    ///
    /// The slot stays locked for the duration of a fetch, so callers queue
    /// behind an in-flight refresh instead of issuing their own. A failed
    /// refresh leaves the previous snapshot in place.
    pub async fn get(&self, force_refresh: bool) -> Result<Snapshot, ReportError> {
        let mut slot = self.slot.lock().await;
        if !force_refresh && let Some(snapshot) = slot.as_ref() {
            debug!(fetched_at = %snapshot.fetched_at, "serving cached snapshot");
            return Ok(snapshot.clone());
        }

        let records = self.source.fetch_records().await?;
        let snapshot = Snapshot {
            records: Arc::new(records),
            fetched_at: Local::now(),
        };
        debug!(count = snapshot.records.len(), force_refresh, "snapshot refreshed");
        *slot = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Drop the cached snapshot; the next `get` fetches.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }

    pub async fn is_cached(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}
