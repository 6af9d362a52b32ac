//! Represents the `/status` endpoint handler and response structure.
//! Provides application status and metrics.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;

use super::ApiState;

/// Represents the response from the `/status` endpoint.
#[derive(Debug, Serialize, Clone)]
pub struct StatusResponse {
    /// The version of the application.
    pub version: String,
    /// The uptime of the application in seconds.
    pub uptime_secs: u64,
    /// Total number of submissions processed.
    pub submissions_total: u64,
    /// Number of submissions that resulted in a failure envelope.
    pub failures_total: u64,
}

/// Retrieves application status and metrics.
pub async fn status(State(state): State<ApiState>) -> impl IntoResponse {
    let metrics = state.app_metrics.metrics.read().await;
    let response = StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: metrics.start_time.elapsed().as_secs(),
        submissions_total: metrics.submissions_total,
        failures_total: metrics.failures_total,
    };
    (StatusCode::OK, Json(response))
}
