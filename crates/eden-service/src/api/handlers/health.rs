//! Health handler

use crate::api::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime: String,
    pub data_dir: String,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let data_dir = state.registry.lock().await.data_dir().display().to_string();
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        service: "eden-service".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
        data_dir,
    })
}
