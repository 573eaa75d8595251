//! Periodic store refresh.
//!
//! Re-reads the storage backend on a fixed interval so edits made outside
//! the service (another instance, a manual file edit, a commit to the data
//! repository) show up without a restart.
//!
//! A reload makes storage authoritative: a record whose persist failed is
//! dropped from memory on the next tick. The store logs each dropped date.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::records::store::RecordStore;

pub struct RefreshTask {
    store: Arc<RecordStore>,
    interval: Duration,
}

impl RefreshTask {
    pub fn new(store: Arc<RecordStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if self.interval.is_zero() {
            tracing::info!("Periodic refresh disabled");
            return;
        }

        tracing::info!(interval_secs = self.interval.as_secs(), "Refresh task starting");

        // The store is loaded at startup, so the first tick waits a full period.
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.store.reload().await {
                        tracing::warn!(error = %e, "Periodic refresh failed; keeping current records");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Refresh task received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::FitnessRecord;
    use crate::storage::memory::MemoryBackend;
    use crate::lifecycle::Shutdown;

    #[tokio::test]
    async fn test_refresh_picks_up_backend_records() {
        let backend = MemoryBackend::with_records(vec![FitnessRecord::new("2024-03-15")]);
        let store = Arc::new(RecordStore::new(Arc::new(backend)));
        let shutdown = Shutdown::new();

        let task = RefreshTask::new(store.clone(), Duration::from_millis(20));
        let handle = tokio::spawn(task.run(shutdown.subscribe()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.len(), 1);

        shutdown.trigger();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_interval_returns_immediately() {
        let store = Arc::new(RecordStore::new(Arc::new(MemoryBackend::default())));
        let shutdown = Shutdown::new();

        RefreshTask::new(store, Duration::ZERO)
            .run(shutdown.subscribe())
            .await;
    }
}
