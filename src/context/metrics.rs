use std::sync::Arc;

use tokio::sync::RwLock;

/// A struct to hold application metrics.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// The time the application started.
    pub start_time: tokio::time::Instant,
    /// Total number of submissions processed.
    pub submissions_total: u64,
    /// Number of submissions that resulted in a failure envelope.
    pub failures_total: u64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self { start_time: tokio::time::Instant::now(), submissions_total: 0, failures_total: 0 }
    }
}

/// Shared application metrics for the HTTP server.
#[derive(Clone, Default)]
pub struct AppMetrics {
    /// Shared metrics.
    pub metrics: Arc<RwLock<Metrics>>,
}
