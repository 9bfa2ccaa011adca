// File: livebot-server/src/http.rs

//! Trigger and keep-alive HTTP surface: a health route and an
//! on-demand poll cycle for deployments without a long-running timer.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use livebot_core::tasks::stream_monitor::StreamMonitor;

#[derive(Clone)]
struct AppState {
    monitor: Arc<StreamMonitor>,
    cron_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CronQuery {
    key: Option<String>,
}

pub async fn serve(
    bind_addr: &str,
    monitor: Arc<StreamMonitor>,
    cron_secret: Option<String>,
) -> std::io::Result<()> {
    let state = AppState {
        monitor,
        cron_secret,
    };
    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/cron", get(run_cron))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("HTTP server listening on {bind_addr}");
    axum::serve(listener, app).await
}

async fn healthz() -> &'static str {
    "livebot is alive"
}

async fn run_cron(
    State(state): State<AppState>,
    Query(query): Query<CronQuery>,
) -> (StatusCode, Json<Value>) {
    if let Some(secret) = state.cron_secret.as_deref() {
        if query.key.as_deref() != Some(secret) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            );
        }
    }

    info!("Cron trigger received");
    if state.monitor.tick().await {
        (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Stream check completed." })),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "A poll cycle is already running; skipped." })),
        )
    }
}
