use std::sync::Arc;

use catapult::{
    cmd::{ExecArgs, exec},
    config::AppConfig,
    context::AppMetrics,
    http_server, initialization,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the script execution gateway.
    Run,
    /// Executes a single script file through the pipeline and prints the
    /// response envelope.
    Exec(ExecArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_gateway().await?,
        Commands::Exec(args) => exec::execute(args).await?,
    }

    Ok(())
}

async fn run_gateway() -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!("Loading application configuration...");
    let config = Arc::new(AppConfig::new(None)?);
    tracing::debug!(
        listen_address = %config.server.listen_address,
        shared_root = %config.storage.shared_root.display(),
        "Configuration loaded."
    );

    let (pipeline, cluster) = initialization::build_pipeline(&config)?;
    tracing::info!(archives = cluster.archive_count(), "Cluster session initialized.");

    let metrics = AppMetrics::default();

    tracing::info!("Gateway initialized, starting HTTP server...");
    http_server::run_server_from_config(config, pipeline, metrics).await;

    Ok(())
}
