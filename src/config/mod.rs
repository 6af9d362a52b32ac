//! Configuration module for Catapult.

mod app_config;
mod helpers;
mod script;
mod server;
mod storage;

pub use app_config::AppConfig;
pub use helpers::deserialize_duration_from_millis;
pub use script::ScriptConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;
