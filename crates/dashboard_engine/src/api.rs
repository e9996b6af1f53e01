//! Read-only HTTP surface over the latest published dashboard model.

use std::collections::HashMap;
use std::sync::Arc;

use axum::debug_handler;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};

use crate::compact::{parse_section_list, select_sections};
use crate::error::EngineError;
use crate::model::DashboardModel;
use crate::scheduler::{DashboardHandle, DashboardScheduler};

pub struct AppState {
    pub scheduler: Arc<DashboardScheduler>,
    pub handle: DashboardHandle,
    /// Absent when no Prometheus recorder was installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(scheduler: Arc<DashboardScheduler>, metrics: Option<PrometheusHandle>) -> Self {
        let handle = scheduler.handle();
        Self {
            scheduler,
            handle,
            metrics,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/dashboard/refresh", post(refresh_dashboard))
        .route("/api/dashboard/schema", get(get_schema))
        .with_state(state)
}

#[debug_handler]
async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[debug_handler]
async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::NOT_FOUND,
            [("content-type", "text/plain")],
            "metrics recorder not installed".to_string(),
        ),
    }
}

#[debug_handler]
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let model = state.handle.current().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "dashboard not loaded yet".to_string(),
        )
    })?;
    let value = serde_json::to_value(model.as_ref())
        .map_err(EngineError::from)
        .map_err(internal)?;

    let sections = params
        .get("sections")
        .map(|raw| parse_section_list(raw))
        .unwrap_or_default();
    if sections.is_empty() {
        return Ok(Json(value));
    }
    select_sections(&value, &sections)
        .map(Json)
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))
}

#[debug_handler]
async fn refresh_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let model = state.scheduler.refresh().await;
    let published = state
        .handle
        .current()
        .is_some_and(|current| current.generation == model.generation);
    Json(json!({
        "generation": model.generation,
        "published": published,
        "unavailableSources": model.unavailable_sources,
    }))
}

#[debug_handler]
async fn get_schema() -> impl IntoResponse {
    Json(schemars::schema_for!(DashboardModel))
}

fn internal(e: EngineError) -> (StatusCode, String) {
    tracing::error!(error = %e, "failed to serialize dashboard model");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
