use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::info;

use crate::sync::SyncEngine;

/// Compensates for platforms that do not deliver reliable
/// online/offline events: the offline indicator is refreshed on a
/// short poll regardless of the sync cadence.
const CONNECTIVITY_POLL: Duration = Duration::from_secs(5);

/// Periodic sync driver. The first pull is triggered by the app at
/// startup; this loop handles everything after that.
pub struct SyncScheduler {
    engine: Arc<SyncEngine>,
    interval: Duration,
}

impl SyncScheduler {
    pub fn new(engine: Arc<SyncEngine>, interval_secs: u64) -> Self {
        Self {
            engine,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Runs forever. Sync failures surface on the status stream and
    /// never stop the loop.
    pub async fn start(self) {
        info!("starting sync scheduler (interval: {:?})", self.interval);

        let start = Instant::now();
        let mut sync_tick = time::interval_at(start + self.interval, self.interval);
        let mut connectivity_tick =
            time::interval_at(start + CONNECTIVITY_POLL, CONNECTIVITY_POLL);

        loop {
            tokio::select! {
                _ = sync_tick.tick() => {
                    self.engine.sync().await;
                }
                _ = connectivity_tick.tick() => {
                    self.engine.refresh_connectivity().await;
                }
            }
        }
    }
}
