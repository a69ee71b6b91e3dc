use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::api::{self, AppState};
use super::db::{DbHandle, ReviewDb};
use super::query::QueryService;
use crate::config::ServerSettings;

/// Build the full application router around an open database.
pub fn build_router(db: DbHandle) -> Router {
    let query = QueryService::new(Arc::new(db.clone()), Arc::new(db));
    let state = Arc::new(AppState { query });

    api::api_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the reviews server and block until Ctrl+C.
pub async fn start_server(settings: &ServerSettings) -> Result<()> {
    if let Some(parent) = settings.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }
    }

    let db = ReviewDb::new(&settings.db_path).context("Failed to initialize reviews database")?;
    let mut app = build_router(DbHandle::new(db));

    if settings.cors_permissive {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    tracing::info!(
        addr = %local_addr,
        db_path = %settings.db_path.display(),
        "reviews server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
