//! Periodic backup job on a tokio interval.

use std::future::Future;
use std::time::Duration;

use tracing::{error, info, warn};

/// Run `job` immediately, then every `every`, forever.
///
/// A failed run is logged and the schedule continues.
pub async fn run_every<F, Fut>(every: Duration, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    info!(every_secs = every.as_secs(), "starting periodic backup");

    let mut interval = tokio::time::interval(every);
    // no catch-up bursts after a slow run
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        // the first tick completes immediately
        interval.tick().await;
        match job().await {
            Ok(()) => info!("backup completed"),
            Err(e) => error!(error = %format!("{e:#}"), "backup failed"),
        }
    }
}

pub fn hours(n: u64) -> Duration {
    if n == 0 {
        warn!("backup interval of 0 hours requested, using 1");
    }
    Duration::from_secs(n.max(1) * 3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_on_interval() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let task = tokio::spawn(run_every(Duration::from_secs(3600), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(anyhow::anyhow!("keep going after failures"))
            }
        }));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(2 * 3600)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        task.abort();
    }

    #[test]
    fn test_zero_hours_is_clamped() {
        assert_eq!(hours(0), Duration::from_secs(3600));
        assert_eq!(hours(24), Duration::from_secs(86_400));
    }
}
