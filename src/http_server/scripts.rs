//! Handler for the script submission endpoint.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use super::ApiState;
use crate::pipeline::ResponseEnvelope;

/// Request body for `POST /scripts`.
#[derive(Debug, Deserialize)]
pub struct SubmitScriptRequest {
    /// The script source text to execute.
    pub script: String,
}

/// Submits a script through the pipeline and returns its response envelope.
///
/// Success and failure both answer 200; the envelope's keys distinguish the
/// cases. The pipeline runs on its own task, so a caller disconnecting does
/// not abort an in-flight compile or execution.
pub async fn submit_script(
    State(state): State<ApiState>,
    Json(payload): Json<SubmitScriptRequest>,
) -> impl IntoResponse {
    let pipeline = Arc::clone(&state.pipeline);
    let submission = tokio::spawn(async move { pipeline.submit(&payload.script).await });

    let envelope = match submission.await {
        Ok(envelope) => envelope,
        Err(join_error) => {
            tracing::error!(%join_error, "submission task ended abnormally");
            ResponseEnvelope::failure(format!("submission task ended abnormally: {join_error}"))
        }
    };

    {
        let mut metrics = state.app_metrics.metrics.write().await;
        metrics.submissions_total += 1;
        if envelope.is_failure() {
            metrics.failures_total += 1;
        }
    }

    (StatusCode::OK, Json(envelope))
}
