//! Defines the Axum routes: the Prometheus scrape endpoint plus the push API
//! the printer host delivers its callbacks through.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::events::{PrinterEvent, ProgressSnapshot, TemperatureReading};
use crate::lifecycle::LifecycleController;
use crate::metrics::PrinterMetrics;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<LifecycleController>,
    pub metrics: Arc<PrinterMetrics>,
    /// Latest job status pushed by the host; pulled on every sent line.
    pub status: Arc<RwLock<ProgressSnapshot>>,
    /// Visibility toggle for the scrape endpoint.
    pub exposed: bool,
}

/// Creates the Axum router with the scrape endpoint and host push API.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/api/v1/gcode", post(gcode_sent))
        .route("/api/v1/event", post(lifecycle_event))
        .route("/api/v1/temperatures", post(temperatures))
        .route("/api/v1/progress", post(progress))
        .with_state(state)
}

/// Handler for Prometheus scrapes. Answers 404 while unexposed.
async fn metrics(State(state): State<AppState>) -> Result<String, StatusCode> {
    if !state.exposed {
        tracing::debug!("metrics scrape rejected: endpoint not exposed");
        return Err(StatusCode::NOT_FOUND);
    }
    state.metrics.encode().map_err(|e| {
        tracing::error!("metrics encoding failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

#[derive(Debug, Deserialize)]
pub struct GcodeLineRequest {
    /// One line that was actually dispatched to the printer.
    pub line: String,
}

/// Handler for a sent G-code line.
async fn gcode_sent(State(state): State<AppState>, Json(request): Json<GcodeLineRequest>) -> StatusCode {
    let status = *state.status.read().await;
    state.controller.handle_line(&request.line, status).await;
    StatusCode::OK
}

/// Handler for a lifecycle event.
async fn lifecycle_event(State(state): State<AppState>, Json(event): Json<PrinterEvent>) -> StatusCode {
    state.controller.handle_event(event).await;
    StatusCode::OK
}

/// Handler for a parsed temperature report.
async fn temperatures(
    State(state): State<AppState>,
    Json(report): Json<HashMap<String, TemperatureReading>>,
) -> StatusCode {
    state.controller.handle_temperatures(&report);
    StatusCode::OK
}

/// Handler for the host's progress/status update.
async fn progress(State(state): State<AppState>, Json(snapshot): Json<ProgressSnapshot>) -> StatusCode {
    *state.status.write().await = snapshot;
    if let Some(completion) = snapshot.completion {
        state.controller.handle_progress(completion);
    }
    StatusCode::OK
}
