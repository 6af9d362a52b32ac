//! The submission error taxonomy.

use thiserror::Error;

use crate::{
    cluster::DistributionError,
    compiler::CompilationError,
    executor::{ExecutionError, SinkPoisoned},
    packager::PackagingError,
};

/// A terminal failure at one stage of the submission pipeline.
///
/// Failure at any stage is terminal for that submission and reported to the
/// caller; nothing is retried.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The source text failed to compile.
    #[error("compilation failed")]
    Compilation(#[from] CompilationError),

    /// The compiled units could not be packaged onto shared storage.
    #[error("packaging failed")]
    Packaging(#[from] PackagingError),

    /// The cluster runtime could not register the archive.
    #[error("distribution failed")]
    Distribution(#[from] DistributionError),

    /// The script failed while loading, binding, or running.
    #[error("execution failed")]
    Execution(#[from] ExecutionError),

    /// The response could not be assembled from the execution's results.
    #[error("response assembly failed")]
    Assembly(#[from] SinkPoisoned),
}

/// Renders an error and its full cause chain as a single diagnostic string.
pub fn diagnostic_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut diagnostic = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        diagnostic.push_str("\ncaused by: ");
        diagnostic.push_str(&cause.to_string());
        source = cause.source();
    }
    diagnostic
}
