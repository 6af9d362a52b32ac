use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use super::{ScriptConfig, ServerConfig, StorageConfig};

/// Application configuration for Catapult.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Cluster-shared artifact storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Script compilation and execution configuration.
    #[serde(default)]
    pub script: ScriptConfig,
}

impl AppConfig {
    /// Loads the application configuration from an optional file path layered
    /// with `CATAPULT__`-prefixed environment variables.
    ///
    /// When no path is given, a `catapult.yaml` file in the working directory
    /// is used if present; environment variables always take precedence.
    pub fn new(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        builder = match config_path {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("catapult").required(false)),
        };

        builder = builder.add_source(Environment::with_prefix("CATAPULT").separator("__"));

        builder.build()?.try_deserialize()
    }
}
