use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use expense_cli::cache::{RecordSource, SnapshotCache};
use expense_engine::{ExpenseRecord, ReportError};

/// Counts fetches and can be switched into a failing mode.
#[derive(Default)]
struct SourceState {
    calls: AtomicUsize,
    failing: AtomicBool,
}

struct FakeSource(Arc<SourceState>);

impl RecordSource for FakeSource {
    async fn fetch_records(&self) -> Result<Vec<ExpenseRecord>, ReportError> {
        let n = self.0.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.0.failing.load(Ordering::SeqCst) {
            return Err(ReportError::Timeout);
        }
        Ok(vec![ExpenseRecord::new("05-04-2025", "Makanan", &n.to_string(), "")])
    }
}

fn setup() -> (Arc<SourceState>, SnapshotCache<FakeSource>) {
    let state = Arc::new(SourceState::default());
    let cache = SnapshotCache::new(FakeSource(state.clone()));
    (state, cache)
}

#[tokio::test]
async fn test_first_get_fetches_then_serves_cache() {
    let (source, cache) = setup();
    assert!(!cache.is_cached().await);

    let a = cache.get(false).await.unwrap();
    let b = cache.get(false).await.unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&a.records, &b.records));
    assert_eq!(a.fetched_at, b.fetched_at);
}

#[tokio::test]
async fn test_force_refresh_always_fetches() {
    let (source, cache) = setup();
    cache.get(false).await.unwrap();
    let fresh = cache.get(true).await.unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(fresh.records[0].amount.as_deref(), Some("2"));

    // the refreshed snapshot is what later readers see
    let cached = cache.get(false).await.unwrap();
    assert_eq!(cached.records[0].amount.as_deref(), Some("2"));
}

#[tokio::test]
async fn test_invalidate_empties_the_slot() {
    let (source, cache) = setup();
    cache.get(false).await.unwrap();
    cache.invalidate().await;
    assert!(!cache.is_cached().await);
    cache.get(false).await.unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let (source, cache) = setup();
    source.failing.store(true, Ordering::SeqCst);
    assert!(matches!(cache.get(false).await, Err(ReportError::Timeout)));
    assert!(!cache.is_cached().await);

    source.failing.store(false, Ordering::SeqCst);
    assert!(cache.get(false).await.is_ok());
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let (source, cache) = setup();
    cache.get(false).await.unwrap();
    source.failing.store(true, Ordering::SeqCst);
    assert!(cache.get(true).await.is_err());

    let still = cache.get(false).await.unwrap();
    assert_eq!(still.records[0].amount.as_deref(), Some("1"));
}
