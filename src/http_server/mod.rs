//! HTTP server module.
//!
//! The transport boundary in front of the pipeline. Both successful and
//! failed submissions answer with status 200; the envelope's key set carries
//! the distinction.

mod scripts;
mod status;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;

use crate::{config::AppConfig, context::AppMetrics, pipeline::SubmissionPipeline};

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct ApiState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The submission pipeline.
    pub pipeline: Arc<SubmissionPipeline>,
    /// Shared application metrics.
    pub app_metrics: AppMetrics,
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Builds the application router over the given state.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status::status))
        .route("/scripts", post(scripts::submit_script))
        .with_state(state)
}

/// Runs the HTTP server based on the provided application configuration.
pub async fn run_server_from_config(
    config: Arc<AppConfig>,
    pipeline: Arc<SubmissionPipeline>,
    app_metrics: AppMetrics,
) {
    let addr: SocketAddr =
        config.server.listen_address.parse().expect("Invalid server.listen_address format");

    let app = router(ApiState { config, pipeline, app_metrics });

    let listener = tokio::net::TcpListener::bind(addr).await.expect("Failed to bind address");

    tracing::info!(listen_address = %addr, "HTTP server listening");
    axum::serve(listener, app.into_make_service()).await.expect("Server failed");
}
