//! # Campus-Board Binary
//!
//! The entry point that assembles the application: SQLite store, local
//! image processor, the forum service, and the axum router.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use cb_api::AppState;
use cb_media_local::LocalImageProcessor;
use cb_services::ForumService;
use cb_store_sqlite::SqliteStore;

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = AppConfig::load()?;

    // 1. Entity store
    let store = Arc::new(SqliteStore::connect(&cfg.database_url).await?);

    // 2. Services wired through trait objects
    let service = ForumService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(LocalImageProcessor),
    );

    // 3. Router
    let app = cb_api::router(Arc::new(AppState { service }));

    tracing::info!("campus-board listening on http://{}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
