use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use crate::tracker::TrackerStatus;

/// Liveness routes. They only read the published status snapshot.
pub fn router(status: watch::Receiver<TrackerStatus>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .with_state(status)
}

async fn health(State(status): State<watch::Receiver<TrackerStatus>>) -> Json<TrackerStatus> {
    Json(status.borrow().clone())
}

pub async fn serve(bind: &str, status: watch::Receiver<TrackerStatus>) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind liveness endpoint on {}", bind))?;
    info!("Liveness endpoint listening on {}", bind);

    axum::serve(listener, router(status))
        .await
        .context("Liveness endpoint stopped")
}
