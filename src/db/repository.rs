use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sqlx::{Row, SqlitePool};
use tracing::warn;

use crate::error::AppError;
use crate::models::{
    Event, ScheduleEntry, ScheduleOverride, SemesterConfig, Student, StudentSettings, Subject,
    Teacher,
};
use crate::sync::Collection;

const LAST_SYNC_KEY: &str = "last_sync_at";
const SETTINGS_ID: &str = "default";

/// Upserts sanitized remote rows into a collection table. Rows without
/// an id are skipped; the remote schema requires one, so this only
/// happens with a misbehaving remote.
pub async fn bulk_upsert(
    db: &SqlitePool,
    collection: Collection,
    docs: &[Map<String, Value>],
) -> Result<(), AppError> {
    let sql = format!(
        "INSERT INTO {} (id, doc) VALUES (?1, ?2) ON CONFLICT(id) DO UPDATE SET doc = excluded.doc",
        collection.local_name()
    );

    for doc in docs {
        let Some(id) = doc.get("id").and_then(Value::as_str) else {
            warn!("{}: skipping remote row without id", collection.local_name());
            continue;
        };
        let body = serde_json::to_string(doc)?;
        sqlx::query(&sql).bind(id).bind(body).execute(db).await?;
    }

    Ok(())
}

/// Removes rows by id. Ids absent locally are not an error; the row
/// may never have been pulled or was removed by an earlier sync.
pub async fn bulk_remove(
    db: &SqlitePool,
    collection: Collection,
    ids: &[String],
) -> Result<(), AppError> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", collection.local_name());

    for id in ids {
        sqlx::query(&sql).bind(id).execute(db).await?;
    }

    Ok(())
}

async fn fetch_docs<T: DeserializeOwned>(
    db: &SqlitePool,
    collection: Collection,
) -> Result<Vec<T>, AppError> {
    let sql = format!("SELECT doc FROM {} ORDER BY id", collection.local_name());
    let rows = sqlx::query(&sql).fetch_all(db).await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let doc: String = row.get("doc");
        match serde_json::from_str(&doc) {
            Ok(parsed) => out.push(parsed),
            Err(e) => {
                warn!(
                    "{}: skipping document that failed to parse: {}",
                    collection.local_name(),
                    e
                );
            }
        }
    }

    Ok(out)
}

pub async fn fetch_entries(db: &SqlitePool) -> Result<Vec<ScheduleEntry>, AppError> {
    fetch_docs(db, Collection::Schedule).await
}

pub async fn fetch_overrides(db: &SqlitePool) -> Result<Vec<ScheduleOverride>, AppError> {
    fetch_docs(db, Collection::Overrides).await
}

pub async fn fetch_events(db: &SqlitePool) -> Result<Vec<Event>, AppError> {
    fetch_docs(db, Collection::Events).await
}

pub async fn fetch_subjects(db: &SqlitePool) -> Result<Vec<Subject>, AppError> {
    fetch_docs(db, Collection::Subjects).await
}

pub async fn fetch_teachers(db: &SqlitePool) -> Result<Vec<Teacher>, AppError> {
    fetch_docs(db, Collection::Teachers).await
}

pub async fn fetch_students(db: &SqlitePool) -> Result<Vec<Student>, AppError> {
    fetch_docs(db, Collection::Students).await
}

/// The semester table holds a singleton; the first row wins if the
/// remote ever carries more than one.
pub async fn fetch_semester(db: &SqlitePool) -> Result<Option<SemesterConfig>, AppError> {
    Ok(fetch_docs(db, Collection::Semester)
        .await?
        .into_iter()
        .next())
}

pub async fn last_sync_at(db: &SqlitePool) -> Result<Option<String>, AppError> {
    let row = sqlx::query("SELECT value FROM sync_meta WHERE key = ?1")
        .bind(LAST_SYNC_KEY)
        .fetch_optional(db)
        .await?;
    Ok(row.map(|r| r.get("value")))
}

pub async fn set_last_sync_at(db: &SqlitePool, timestamp: &str) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO sync_meta (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(LAST_SYNC_KEY)
    .bind(timestamp)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn student_settings(db: &SqlitePool) -> Result<Option<StudentSettings>, AppError> {
    let row = sqlx::query("SELECT doc FROM student_settings WHERE id = ?1")
        .bind(SETTINGS_ID)
        .fetch_optional(db)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let doc: String = row.get("doc");
    match serde_json::from_str(&doc) {
        Ok(settings) => Ok(Some(settings)),
        Err(e) => {
            warn!("stored student settings failed to parse: {}", e);
            Ok(None)
        }
    }
}

pub async fn save_student_settings(
    db: &SqlitePool,
    settings: &StudentSettings,
) -> Result<(), AppError> {
    let body = serde_json::to_string(settings)?;
    sqlx::query(
        "INSERT INTO student_settings (id, doc) VALUES (?1, ?2) ON CONFLICT(id) DO UPDATE SET doc = excluded.doc",
    )
    .bind(SETTINGS_ID)
    .bind(body)
    .execute(db)
    .await?;
    Ok(())
}
