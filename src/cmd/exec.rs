//! One-shot local execution of a script file through the full pipeline.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::{config::AppConfig, initialization, pipeline::PipelineBuildError};

/// Errors raised by the `exec` subcommand.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reading the script file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// The pipeline could not be assembled.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineBuildError),

    /// The response envelope could not be rendered.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Arguments for the `exec` subcommand.
#[derive(Parser, Debug)]
pub struct ExecArgs {
    /// Path to the script file to execute.
    #[arg(short, long)]
    script: PathBuf,

    /// Path to the configuration file. If not provided, uses the default
    /// lookup.
    #[arg(short, long)]
    config: Option<String>,
}

/// Runs one script through the full pipeline and prints its envelope.
pub async fn execute(args: ExecArgs) -> Result<(), Error> {
    let config = AppConfig::new(args.config.as_deref())?;
    let source = tokio::fs::read_to_string(&args.script).await?;

    let (pipeline, _cluster) = initialization::build_pipeline(&config)?;

    tracing::debug!(script = %args.script.display(), "executing script file");
    let envelope = pipeline.submit(&source).await;

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
