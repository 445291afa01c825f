use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use student_hub::db::{self, repository};
use student_hub::error::AppError;
use student_hub::remote::{AlwaysOnline, ConnectivityProbe, RemoteRow, RemoteStore};
use student_hub::sync::{Collection, SyncEngine, SyncState};

// ------------------------------------------------------------
// Test doubles
// ------------------------------------------------------------

#[derive(Default)]
struct MockRemote {
    rows: Mutex<HashMap<String, Vec<RemoteRow>>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
    fetch_count: AtomicUsize,
    delay_ms: u64,
}

impl MockRemote {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_delay(delay_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            delay_ms,
            ..Self::default()
        })
    }

    fn set_rows(&self, table: &str, rows: Vec<RemoteRow>) {
        self.rows
            .lock()
            .expect("rows lock")
            .insert(table.to_string(), rows);
    }

    fn fail(&self, table: &str) {
        self.failing
            .lock()
            .expect("failing lock")
            .insert(table.to_string());
    }

    fn fail_all(&self) {
        for collection in Collection::ALL {
            self.fail(collection.remote_table());
        }
    }

    fn recover(&self, table: &str) {
        self.failing.lock().expect("failing lock").remove(table);
    }

    fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn fetch_rows(
        &self,
        table: &str,
        since: Option<&str>,
        _has_delete_flag: bool,
    ) -> Result<Vec<RemoteRow>, AppError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .expect("calls lock")
            .push((table.to_string(), since.map(str::to_string)));

        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        if self.failing.lock().expect("failing lock").contains(table) {
            return Err(AppError::Remote(format!("simulated failure for {}", table)));
        }

        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .get(table)
            .cloned()
            .unwrap_or_default())
    }
}

struct OfflineProbe;

#[async_trait]
impl ConnectivityProbe for OfflineProbe {
    async fn is_online(&self) -> bool {
        false
    }
}

// ------------------------------------------------------------
// Fixtures
// ------------------------------------------------------------

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    db::MIGRATOR.run(&pool).await.expect("migrations");
    pool
}

async fn engine_with(pool: &SqlitePool, remote: Arc<MockRemote>) -> SyncEngine {
    SyncEngine::new(pool.clone(), remote, Arc::new(AlwaysOnline))
        .await
        .expect("engine")
}

fn obj(value: serde_json::Value) -> RemoteRow {
    value.as_object().cloned().expect("json object")
}

fn subject_row(id: &str, name: &str) -> RemoteRow {
    obj(json!({
        "id": id,
        "name": name,
        "short_name": null,
        "sdo_url": null,
        "notes": null,
        "created_at": "2026-02-01T00:00:00+00:00",
        "updated_at": "2026-02-01T00:00:00+00:00",
        "is_deleted": false
    }))
}

fn deleted_subject_row(id: &str) -> RemoteRow {
    obj(json!({
        "id": id,
        "name": "gone",
        "created_at": "2026-02-01T00:00:00+00:00",
        "updated_at": "2026-02-03T00:00:00+00:00",
        "is_deleted": true
    }))
}

fn teacher_row(id: &str, full_name: &str) -> RemoteRow {
    obj(json!({
        "id": id,
        "full_name": full_name,
        "position": null,
        "email": null,
        "created_at": "2026-02-01T00:00:00+00:00",
        "updated_at": "2026-02-01T00:00:00+00:00",
        "is_deleted": false
    }))
}

fn event_row(id: &str) -> RemoteRow {
    obj(json!({
        "id": id,
        "title": "Midterm",
        "description": null,
        "event_type": "exam",
        "subject_id": null,
        "teacher_id": null,
        "date": "2026-02-10",
        "pair_number": null,
        "event_time": null,
        "room": null,
        "target_language": "all",
        "target_eng_subgroup": "all",
        "target_oit_subgroup": "all",
        "created_at": "2026-02-01T00:00:00+00:00",
        "updated_at": "2026-02-01T00:00:00+00:00",
        "is_deleted": false
    }))
}

// ------------------------------------------------------------
// Tests
// ------------------------------------------------------------

#[tokio::test]
async fn initial_sync_pulls_every_collection() {
    let pool = test_pool().await;
    let remote = MockRemote::new();
    remote.set_rows("subjects", vec![subject_row("S1", "Algebra")]);
    remote.set_rows("teachers", vec![teacher_row("T1", "J. Smith")]);

    let engine = engine_with(&pool, remote.clone()).await;
    engine.sync().await;

    let status = engine.status();
    assert_eq!(status.state, SyncState::Success);
    assert!(status.last_sync_at.is_some());
    assert!(status.error.is_none());

    // Every configured collection is queried, each without a watermark.
    assert_eq!(remote.fetch_count.load(Ordering::SeqCst), Collection::ALL.len());
    assert!(remote.calls().iter().all(|(_, since)| since.is_none()));

    let subjects = repository::fetch_subjects(&pool).await.expect("subjects");
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0].name, "Algebra");
    // Null columns were stripped, not stored as literal nulls.
    assert!(subjects[0].short_name.is_none());

    let teachers = repository::fetch_teachers(&pool).await.expect("teachers");
    assert_eq!(teachers.len(), 1);
}

#[tokio::test]
async fn null_columns_deserialize_as_absent_fields() {
    let pool = test_pool().await;
    let remote = MockRemote::new();
    remote.set_rows("events", vec![event_row("EV1")]);

    let engine = engine_with(&pool, remote).await;
    engine.sync().await;

    let events = repository::fetch_events(&pool).await.expect("events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Midterm");
    assert!(events[0].pair_number.is_none());
    assert!(events[0].event_time.is_none());
    assert!(events[0].room.is_none());
}

#[tokio::test]
async fn repeated_sync_is_idempotent() {
    let pool = test_pool().await;
    let remote = MockRemote::new();
    remote.set_rows("subjects", vec![subject_row("S1", "Algebra")]);

    let engine = engine_with(&pool, remote.clone()).await;
    engine.sync().await;
    let first = repository::fetch_subjects(&pool).await.expect("subjects");

    // The remote hands back the same change set again.
    engine.sync().await;
    let second = repository::fetch_subjects(&pool).await.expect("subjects");

    assert_eq!(engine.status().state, SyncState::Success);
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].id, second[0].id);
    assert_eq!(first[0].name, second[0].name);
}

#[tokio::test]
async fn second_sync_uses_the_watermark() {
    let pool = test_pool().await;
    let remote = MockRemote::new();

    let engine = engine_with(&pool, remote.clone()).await;
    engine.sync().await;
    let watermark = repository::last_sync_at(&pool)
        .await
        .expect("watermark")
        .expect("set after success");

    engine.sync().await;

    let calls = remote.calls();
    let second_round = &calls[Collection::ALL.len()..];
    assert_eq!(second_round.len(), Collection::ALL.len());
    assert!(
        second_round
            .iter()
            .all(|(_, since)| since.as_deref() == Some(watermark.as_str()))
    );
}

#[tokio::test]
async fn partial_failure_still_counts_as_success() {
    let pool = test_pool().await;
    let remote = MockRemote::new();
    remote.set_rows("subjects", vec![subject_row("S1", "Algebra")]);
    remote.set_rows("teachers", vec![teacher_row("T1", "J. Smith")]);

    let engine = engine_with(&pool, remote.clone()).await;
    engine.sync().await;
    let watermark_before = repository::last_sync_at(&pool)
        .await
        .expect("watermark")
        .expect("set after success");

    // subjects starts failing; teachers keeps changing.
    remote.fail("subjects");
    remote.set_rows("subjects", vec![subject_row("S1", "Renamed")]);
    remote.set_rows("teachers", vec![teacher_row("T1", "K. Brown")]);
    engine.sync().await;

    let status = engine.status();
    assert_eq!(status.state, SyncState::Success);

    let watermark_after = repository::last_sync_at(&pool)
        .await
        .expect("watermark")
        .expect("still set");
    assert_ne!(watermark_before, watermark_after);

    // The healthy collection progressed, the failed one kept its
    // pre-call contents.
    let teachers = repository::fetch_teachers(&pool).await.expect("teachers");
    assert_eq!(teachers[0].full_name, "K. Brown");
    let subjects = repository::fetch_subjects(&pool).await.expect("subjects");
    assert_eq!(subjects[0].name, "Algebra");
}

#[tokio::test]
async fn total_failure_preserves_the_watermark() {
    let pool = test_pool().await;
    let remote = MockRemote::new();

    let engine = engine_with(&pool, remote.clone()).await;
    engine.sync().await;
    let watermark = repository::last_sync_at(&pool)
        .await
        .expect("watermark")
        .expect("set after success");

    remote.fail_all();
    engine.sync().await;

    let status = engine.status();
    assert_eq!(status.state, SyncState::Error);
    assert!(status.error.is_some());
    assert_eq!(status.last_sync_at.as_deref(), Some(watermark.as_str()));

    let preserved = repository::last_sync_at(&pool).await.expect("watermark");
    assert_eq!(preserved.as_deref(), Some(watermark.as_str()));

    // Recovery on the next attempt retries the same window.
    for collection in Collection::ALL {
        remote.recover(collection.remote_table());
    }
    engine.sync().await;
    assert_eq!(engine.status().state, SyncState::Success);
}

#[tokio::test]
async fn total_failure_on_first_run_leaves_no_watermark() {
    let pool = test_pool().await;
    let remote = MockRemote::new();
    remote.fail_all();

    let engine = engine_with(&pool, remote).await;
    engine.sync().await;

    assert_eq!(engine.status().state, SyncState::Error);
    let watermark = repository::last_sync_at(&pool).await.expect("watermark");
    assert!(watermark.is_none());
}

#[tokio::test]
async fn concurrent_sync_is_a_noop() {
    let pool = test_pool().await;
    let remote = MockRemote::with_delay(20);

    let engine = Arc::new(engine_with(&pool, remote.clone()).await);
    tokio::join!(engine.sync(), engine.sync());

    // The second call must not have issued any remote queries.
    assert_eq!(remote.fetch_count.load(Ordering::SeqCst), Collection::ALL.len());
    assert_eq!(engine.status().state, SyncState::Success);
}

#[tokio::test]
async fn soft_deleted_rows_are_removed_locally() {
    let pool = test_pool().await;
    let remote = MockRemote::new();
    remote.set_rows(
        "subjects",
        vec![subject_row("S1", "Algebra"), subject_row("S2", "Physics")],
    );

    let engine = engine_with(&pool, remote.clone()).await;
    engine.sync().await;
    assert_eq!(
        repository::fetch_subjects(&pool).await.expect("subjects").len(),
        2
    );

    // S1 gets soft-deleted upstream; S9 never existed locally and its
    // removal must be tolerated.
    remote.set_rows(
        "subjects",
        vec![deleted_subject_row("S1"), deleted_subject_row("S9")],
    );
    engine.sync().await;

    assert_eq!(engine.status().state, SyncState::Success);
    let subjects = repository::fetch_subjects(&pool).await.expect("subjects");
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0].id, "S2");
}

#[tokio::test]
async fn offline_probe_short_circuits_the_sync() {
    let pool = test_pool().await;
    repository::set_last_sync_at(&pool, "2026-02-01T08:00:00+00:00")
        .await
        .expect("seed watermark");

    let remote = MockRemote::new();
    let engine = SyncEngine::new(pool.clone(), remote.clone(), Arc::new(OfflineProbe))
        .await
        .expect("engine");
    engine.sync().await;

    let status = engine.status();
    assert_eq!(status.state, SyncState::Offline);
    assert_eq!(
        status.last_sync_at.as_deref(),
        Some("2026-02-01T08:00:00+00:00")
    );
    // No remote traffic at all while offline.
    assert_eq!(remote.fetch_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn refresh_connectivity_forces_offline_status() {
    let pool = test_pool().await;
    let remote = MockRemote::new();
    let engine = SyncEngine::new(pool.clone(), remote, Arc::new(OfflineProbe))
        .await
        .expect("engine");

    assert_eq!(engine.status().state, SyncState::Idle);
    engine.refresh_connectivity().await;
    assert_eq!(engine.status().state, SyncState::Offline);
}

#[tokio::test]
async fn status_stream_replays_the_last_value() {
    let pool = test_pool().await;
    let remote = MockRemote::new();
    let engine = engine_with(&pool, remote).await;

    let early = engine.subscribe();
    assert_eq!(early.borrow().state, SyncState::Idle);

    engine.sync().await;

    assert_eq!(early.borrow().state, SyncState::Success);
    // A late subscriber sees the current value immediately.
    let late = engine.subscribe();
    assert_eq!(late.borrow().state, SyncState::Success);
}
