//! Shared application context.

mod metrics;

pub use metrics::{AppMetrics, Metrics};
