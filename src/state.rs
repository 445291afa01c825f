use std::sync::Arc;

use sqlx::SqlitePool;

use crate::sync::SyncEngine;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub engine: Arc<SyncEngine>,
}
