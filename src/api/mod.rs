use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{EventType, Student, StudentSettings, Subject, Teacher};
use crate::schedule::{
    DaySchedule, ScheduleSources, SemesterProgress, UpcomingEvent, build_day_schedule,
    semester_progress, upcoming_events,
};
use crate::state::AppState;
use crate::sync::SyncStatus;

#[derive(Deserialize)]
struct DayQueryParams {
    /// Comma-separated event types left out of the day grid
    /// (deadlines live in their own view).
    #[serde(default)]
    exclude: Option<String>,
}

#[derive(Deserialize)]
struct UpcomingQueryParams {
    #[serde(default = "default_days_ahead")]
    days: u64,
}

fn default_days_ahead() -> u64 {
    7
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sync", post(sync_now))
        .route("/sync/status", get(sync_status))
        .route("/schedule/{date}", get(day_schedule))
        .route("/events/upcoming", get(list_upcoming_events))
        .route("/semester", get(semester_overview))
        .route("/subjects", get(list_subjects))
        .route("/teachers", get(list_teachers))
        .route("/students", get(list_students))
        .route("/settings", get(get_settings).put(put_settings))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

/// Manual sync trigger. Sync failures are not HTTP failures; the
/// resulting status carries the outcome either way.
async fn sync_now(State(state): State<AppState>) -> Json<SyncStatus> {
    state.engine.sync().await;
    Json(state.engine.status())
}

async fn sync_status(State(state): State<AppState>) -> Json<SyncStatus> {
    Json(state.engine.status())
}

async fn day_schedule(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
    Query(params): Query<DayQueryParams>,
) -> Result<Json<DaySchedule>, AppError> {
    let settings = require_settings(&state).await?;

    let exclude = match params.exclude.as_deref() {
        Some(raw) => parse_event_types(raw)?,
        None => Vec::new(),
    };

    let entries = repository::fetch_entries(&state.db).await?;
    let overrides = repository::fetch_overrides(&state.db).await?;
    let events = repository::fetch_events(&state.db).await?;
    let subjects = repository::fetch_subjects(&state.db).await?;
    let teachers = repository::fetch_teachers(&state.db).await?;
    let semester = repository::fetch_semester(&state.db).await?;

    let sources = ScheduleSources {
        entries: &entries,
        overrides: &overrides,
        events: &events,
        subjects: &subjects,
        teachers: &teachers,
        semester: semester.as_ref(),
    };

    Ok(Json(build_day_schedule(date, &settings, &sources, &exclude)))
}

async fn list_upcoming_events(
    State(state): State<AppState>,
    Query(params): Query<UpcomingQueryParams>,
) -> Result<Json<Vec<UpcomingEvent>>, AppError> {
    let settings = require_settings(&state).await?;

    let events = repository::fetch_events(&state.db).await?;
    let subjects = repository::fetch_subjects(&state.db).await?;

    let today = Local::now().date_naive();
    Ok(Json(upcoming_events(
        &events,
        &subjects,
        &settings,
        today,
        params.days,
    )))
}

async fn semester_overview(
    State(state): State<AppState>,
) -> Result<Json<SemesterProgress>, AppError> {
    let config = repository::fetch_semester(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    let today = Local::now().date_naive();
    Ok(Json(semester_progress(&config, today)))
}

async fn list_subjects(State(state): State<AppState>) -> Result<Json<Vec<Subject>>, AppError> {
    let subjects = repository::fetch_subjects(&state.db).await?;
    Ok(Json(subjects))
}

async fn list_teachers(State(state): State<AppState>) -> Result<Json<Vec<Teacher>>, AppError> {
    let teachers = repository::fetch_teachers(&state.db).await?;
    Ok(Json(teachers))
}

async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, AppError> {
    let students = repository::fetch_students(&state.db).await?;
    Ok(Json(students))
}

async fn get_settings(State(state): State<AppState>) -> Result<Json<StudentSettings>, AppError> {
    let settings = repository::student_settings(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(settings))
}

async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<StudentSettings>,
) -> Result<Json<StudentSettings>, AppError> {
    repository::save_student_settings(&state.db, &settings).await?;
    Ok(Json(settings))
}

async fn require_settings(state: &AppState) -> Result<StudentSettings, AppError> {
    repository::student_settings(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest("student settings are not configured".to_string()))
}

fn parse_event_types(raw: &str) -> Result<Vec<EventType>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            serde_json::from_value(Value::String(s.to_string()))
                .map_err(|_| AppError::BadRequest(format!("unknown event type: {}", s)))
        })
        .collect()
}
