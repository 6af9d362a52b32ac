use std::{net::SocketAddr, sync::Arc};

use catapult::{
    config::{AppConfig, ServerConfig, StorageConfig},
    context::AppMetrics,
    http_server, initialization,
};
use reqwest::Client;
use tempfile::TempDir;
use tokio::task;

pub struct TestServer {
    pub address: SocketAddr,
    pub server_handle: task::JoinHandle<()>,
    pub client: Client,
    _shared_root: TempDir,
}

impl TestServer {
    pub async fn new() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get address");
        drop(listener); // Release port for the app to use

        let shared_root = tempfile::tempdir().expect("Failed to create shared root");

        let config = Arc::new(AppConfig {
            server: ServerConfig { listen_address: addr.to_string() },
            storage: StorageConfig { shared_root: shared_root.path().to_path_buf() },
            ..Default::default()
        });

        let (pipeline, _cluster) =
            initialization::build_pipeline(&config).expect("Failed to build pipeline");
        let metrics = AppMetrics::default();

        // Spawn the actual app server
        let server_handle = task::spawn(async move {
            http_server::run_server_from_config(config, pipeline, metrics).await;
        });

        // Wait for server to start
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;

        Self { address: addr, server_handle, client: Client::new(), _shared_root: shared_root }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        let url = format!("http://{}{}", self.address, path);
        self.client.get(&url).send().await.expect("Request failed")
    }

    pub async fn submit(&self, script: &str) -> reqwest::Response {
        let url = format!("http://{}/scripts", self.address);
        self.client
            .post(&url)
            .json(&serde_json::json!({ "script": script }))
            .send()
            .await
            .expect("Request failed")
    }

    pub fn cleanup(self) {
        self.server_handle.abort();
    }
}
