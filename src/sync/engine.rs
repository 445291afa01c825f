use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::remote::{ConnectivityProbe, RemoteRow, RemoteStore};

use super::{Collection, SyncState, SyncStatus};

/// Null columns on the wire mean "absent". Dropping them lets optional
/// fields deserialize as None instead of tripping over literal nulls.
fn strip_nulls(row: RemoteRow) -> RemoteRow {
    row.into_iter().filter(|(_, value)| !value.is_null()).collect()
}

/// One-directional pull synchronizer: remote store in, local replica
/// out. Owns the sync status stream; never returns errors to callers.
pub struct SyncEngine {
    db: SqlitePool,
    remote: Arc<dyn RemoteStore>,
    connectivity: Arc<dyn ConnectivityProbe>,
    is_syncing: AtomicBool,
    status_tx: watch::Sender<SyncStatus>,
}

impl SyncEngine {
    pub async fn new(
        db: SqlitePool,
        remote: Arc<dyn RemoteStore>,
        connectivity: Arc<dyn ConnectivityProbe>,
    ) -> Result<Self, AppError> {
        let last_sync_at = repository::last_sync_at(&db).await?;
        let (status_tx, _) = watch::channel(SyncStatus {
            state: SyncState::Idle,
            last_sync_at,
            error: None,
        });

        Ok(Self {
            db,
            remote,
            connectivity,
            is_syncing: AtomicBool::new(false),
            status_tx,
        })
    }

    pub fn status(&self) -> SyncStatus {
        self.status_tx.borrow().clone()
    }

    /// Receiver that replays the current status and then every
    /// transition.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    fn publish(&self, state: SyncState, last_sync_at: Option<String>, error: Option<String>) {
        // send_replace keeps publishing even with zero subscribers.
        self.status_tx.send_replace(SyncStatus {
            state,
            last_sync_at,
            error,
        });
    }

    /// One pull cycle. Calling while a sync is in flight is a no-op;
    /// all outcomes are reported on the status stream.
    pub async fn sync(&self) {
        if self
            .is_syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("sync already running, skipping");
            return;
        }

        self.run_sync().await;
        self.is_syncing.store(false, Ordering::SeqCst);
    }

    async fn run_sync(&self) {
        if !self.connectivity.is_online().await {
            info!("no network connectivity, sync postponed");
            let last_sync_at = self.last_sync_at().await;
            self.publish(SyncState::Offline, last_sync_at, None);
            return;
        }

        let since = match repository::last_sync_at(&self.db).await {
            Ok(since) => since,
            Err(e) => {
                warn!("failed to read sync watermark: {}", e);
                self.publish(SyncState::Error, None, Some(e.to_string()));
                return;
            }
        };

        self.publish(SyncState::Syncing, since.clone(), None);

        match since.as_deref() {
            Some(since) => info!("catch-up sync since {}", since),
            None => info!("initial sync (first run)"),
        }

        // Taken before the pull: rows changing mid-sync get fetched
        // again next cycle instead of slipping past the watermark.
        let sync_timestamp = Utc::now().to_rfc3339();

        let mut failures: Vec<String> = Vec::new();
        for collection in Collection::ALL {
            if let Err(e) = self.sync_collection(collection, since.as_deref()).await {
                warn!("error syncing {}: {}", collection.local_name(), e);
                failures.push(format!("{}: {}", collection.local_name(), e));
            }
        }

        if failures.len() == Collection::ALL.len() {
            warn!("sync failed: all collections failed");
            self.publish(
                SyncState::Error,
                since,
                Some("all collections failed to sync".to_string()),
            );
            return;
        }

        // Partial failure still counts as success: one broken table
        // must not block progress on the others or force an endless
        // re-fetch of the healthy ones.
        if !failures.is_empty() {
            warn!("partial sync: {} collection(s) failed", failures.len());
        }

        if let Err(e) = repository::set_last_sync_at(&self.db, &sync_timestamp).await {
            warn!("failed to persist sync watermark: {}", e);
            self.publish(SyncState::Error, since, Some(e.to_string()));
            return;
        }

        info!("sync completed successfully");
        self.publish(SyncState::Success, Some(sync_timestamp), None);
    }

    async fn sync_collection(
        &self,
        collection: Collection,
        since: Option<&str>,
    ) -> Result<(), AppError> {
        let rows = self
            .remote
            .fetch_rows(collection.remote_table(), since, collection.has_delete_flag())
            .await?;

        if rows.is_empty() {
            debug!("{}: no changes", collection.local_name());
            return Ok(());
        }

        let mut to_upsert: Vec<RemoteRow> = Vec::new();
        let mut to_remove: Vec<String> = Vec::new();

        for row in rows {
            let deleted = collection.has_delete_flag()
                && row
                    .get("is_deleted")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);

            if deleted {
                if let Some(id) = row.get("id").and_then(Value::as_str) {
                    to_remove.push(id.to_string());
                }
            } else {
                to_upsert.push(strip_nulls(row));
            }
        }

        if !to_upsert.is_empty() {
            repository::bulk_upsert(&self.db, collection, &to_upsert).await?;
        }
        if !to_remove.is_empty() {
            repository::bulk_remove(&self.db, collection, &to_remove).await?;
        }

        info!(
            "{}: {} upserted, {} removed",
            collection.local_name(),
            to_upsert.len(),
            to_remove.len()
        );
        Ok(())
    }

    /// Forces the offline status when the network is down, even while
    /// a sync is in flight. Platforms without reliable online/offline
    /// events rely on this being polled.
    pub async fn refresh_connectivity(&self) {
        if self.connectivity.is_online().await {
            return;
        }

        let current = self.status();
        if current.state != SyncState::Offline {
            self.publish(SyncState::Offline, current.last_sync_at, None);
        }
    }

    async fn last_sync_at(&self) -> Option<String> {
        match repository::last_sync_at(&self.db).await {
            Ok(value) => value,
            Err(e) => {
                warn!("failed to read sync watermark: {}", e);
                None
            }
        }
    }
}
