use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use student_hub::api::router;
use student_hub::db;
use student_hub::remote::{ConnectivityProbe, HttpProbe, RemoteConfig, RemoteStore, SupabaseClient};
use student_hub::services::SyncScheduler;
use student_hub::state::AppState;
use student_hub::sync::SyncEngine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "student_hub=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://student-hub.db?mode=rwc".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    db::MIGRATOR.run(&pool).await?;

    let config = RemoteConfig::new_from_env()?;
    let remote: Arc<dyn RemoteStore> = Arc::new(SupabaseClient::new(config.clone())?);
    let connectivity: Arc<dyn ConnectivityProbe> = Arc::new(HttpProbe::new(&config)?);

    let engine = Arc::new(SyncEngine::new(pool.clone(), remote, connectivity).await?);

    // First pull at startup; the scheduler covers everything after.
    let startup_engine = engine.clone();
    tokio::spawn(async move {
        startup_engine.sync().await;
    });

    let interval_secs = std::env::var("SYNC_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300);
    tokio::spawn(SyncScheduler::new(engine.clone(), interval_secs).start());

    let state = AppState {
        db: pool.clone(),
        engine,
    };

    let app = router(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
