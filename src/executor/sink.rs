//! Execution-scoped capture of a script's console output.
//!
//! Each execution owns its own sink, wired into that execution's engine print
//! hooks. There is no process-wide channel redirection, so concurrent
//! executions cannot observe each other's output.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use thiserror::Error;

/// Accumulates the discrete values a script prints during one execution.
///
/// Captured values form an unordered, duplicate-eliminating collection: a
/// value printed twice is recorded once, and no ordering is retained.
#[derive(Debug, Clone, Default)]
pub struct OutputSink {
    lines: Arc<Mutex<HashSet<String>>>,
}

impl OutputSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one printed value.
    pub fn record(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.insert(line.to_string());
        }
    }

    /// Returns a copy of everything captured so far.
    pub fn captured(&self) -> Result<HashSet<String>, SinkPoisoned> {
        self.lines.lock().map(|lines| lines.clone()).map_err(|_| SinkPoisoned)
    }
}

/// The sink's lock was poisoned and the captured output is unrecoverable.
#[derive(Debug, Error)]
#[error("output sink lock poisoned; captured output is unrecoverable")]
pub struct SinkPoisoned;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sink() {
        let sink = OutputSink::new();
        assert!(sink.captured().unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_are_recorded_once() {
        let sink = OutputSink::new();
        sink.record("hi");
        sink.record("hi");
        sink.record("there");

        let captured = sink.captured().unwrap();
        assert_eq!(captured.len(), 2);
        assert!(captured.contains("hi"));
        assert!(captured.contains("there"));
    }

    #[test]
    fn test_clones_share_the_sink() {
        let sink = OutputSink::new();
        let clone = sink.clone();
        clone.record("from clone");

        assert!(sink.captured().unwrap().contains("from clone"));
    }
}
